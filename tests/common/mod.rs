#![allow(dead_code)]

use std::sync::{Mutex, MutexGuard, OnceLock};

/// Sets or clears environment variables and restores them on drop.
pub struct EnvGuard {
    entries: Vec<(&'static str, Option<String>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvGuard {
    pub fn set<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Option<&'static str>)>,
    {
        let lock = env_lock()
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());
        let entries = vars
            .into_iter()
            .map(|(key, value)| {
                let previous = std::env::var(key).ok();
                match value {
                    Some(value) => std::env::set_var(key, value),
                    None => std::env::remove_var(key),
                }
                (key, previous)
            })
            .collect();
        Self {
            entries,
            _lock: lock,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, previous) in self.entries.drain(..) {
            if let Some(value) = previous {
                std::env::set_var(key, value);
            } else {
                std::env::remove_var(key);
            }
        }
    }
}

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

/// Proxy variables cleared so tests see a proxy-free shell.
pub fn without_proxy_env() -> EnvGuard {
    EnvGuard::set([
        ("http_proxy", None),
        ("https_proxy", None),
        ("HTTP_PROXY", None),
        ("HTTPS_PROXY", None),
        ("NO_PROXY", None),
        ("no_proxy", None),
    ])
}
