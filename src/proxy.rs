use serde::Serialize;
use std::env;
use std::fmt;
use tracing::debug;

use crate::config::{ConfigStore, ProxyConfig};

/// Variables whose presence means the proxy is active in this shell.
pub const ENABLED_MARKER_VARS: [&str; 2] = ["http_proxy", "HTTP_PROXY"];

/// Every proxy variable `pvm` reads or emits, in display order.
pub const PROXY_ENV_VARS: [&str; 6] = [
    "http_proxy",
    "https_proxy",
    "HTTP_PROXY",
    "HTTPS_PROXY",
    "NO_PROXY",
    "no_proxy",
];

/// Snapshot of the proxy variables. `None` means unset, which is distinct
/// from set-but-empty.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ProxyEnv {
    pub http_proxy: Option<String>,
    pub https_proxy: Option<String>,
    #[serde(rename = "HTTP_PROXY")]
    pub http_proxy_upper: Option<String>,
    #[serde(rename = "HTTPS_PROXY")]
    pub https_proxy_upper: Option<String>,
    #[serde(rename = "NO_PROXY")]
    pub no_proxy_upper: Option<String>,
    pub no_proxy: Option<String>,
}

impl ProxyEnv {
    pub fn capture() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            http_proxy: lookup("http_proxy"),
            https_proxy: lookup("https_proxy"),
            http_proxy_upper: lookup("HTTP_PROXY"),
            https_proxy_upper: lookup("HTTPS_PROXY"),
            no_proxy_upper: lookup("NO_PROXY"),
            no_proxy: lookup("no_proxy"),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        let value = match name {
            "http_proxy" => &self.http_proxy,
            "https_proxy" => &self.https_proxy,
            "HTTP_PROXY" => &self.http_proxy_upper,
            "HTTPS_PROXY" => &self.https_proxy_upper,
            "NO_PROXY" => &self.no_proxy_upper,
            "no_proxy" => &self.no_proxy,
            _ => return None,
        };
        value.as_deref()
    }

    /// The active HTTP proxy, preferring the lower-case variable.
    pub fn active_http(&self) -> Option<&str> {
        ENABLED_MARKER_VARS
            .iter()
            .filter_map(|name| self.get(name))
            .find(|value| !value.is_empty())
    }

    pub fn is_enabled(&self) -> bool {
        self.active_http().is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProxyStatus {
    pub is_enabled: bool,
    pub config: ProxyConfig,
    pub env: ProxyEnv,
}

pub fn is_proxy_enabled() -> bool {
    ProxyEnv::capture().is_enabled()
}

pub fn get_status(store: &ConfigStore) -> ProxyStatus {
    let env = ProxyEnv::capture();
    ProxyStatus {
        is_enabled: env.is_enabled(),
        config: store.get_config(),
        env,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    PowerShell,
    Bash,
    Unknown,
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PowerShell => "powershell",
            Self::Bash => "bash",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Best-effort guess at the calling shell. Never fails.
pub fn detect_shell() -> Shell {
    detect_shell_from(cfg!(windows), |key| env::var(key).ok())
}

pub fn detect_shell_from<F>(is_windows: bool, lookup: F) -> Shell
where
    F: Fn(&str) -> Option<String>,
{
    let shell_var = lookup("SHELL");

    if is_windows {
        let hint = shell_var
            .clone()
            .filter(|value| !value.is_empty())
            .or_else(|| lookup("ComSpec"))
            .unwrap_or_default();
        let has_module_path = lookup("PSModulePath").is_some_and(|path| !path.is_empty());
        if hint.to_lowercase().contains("powershell") || has_module_path {
            debug!(hint = %hint, "detected PowerShell");
            return Shell::PowerShell;
        }
    }

    let shell_var = shell_var.unwrap_or_default();
    let detected = if ["bash", "zsh", "sh"]
        .iter()
        .any(|name| shell_var.contains(name))
    {
        Shell::Bash
    } else {
        Shell::Unknown
    };
    debug!(shell = %shell_var, detected = %detected, "detected shell");
    detected
}
