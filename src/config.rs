use config::{Config as ConfigLoader, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use crate::defaults;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Could not find home directory")]
    NoHomeDir,
    #[error("failed to load configuration from {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: config::ConfigError,
    },
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unknown config key: {0}")]
    UnknownKey(String),
}

/// Persisted proxy settings.
///
/// Serialized as `{"http": .., "https": .., "noProxy": ..}`. Unknown keys are
/// ignored on read and missing ones fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub http: String,
    pub https: String,
    // config-rs may hand keys back lowercased
    #[serde(rename = "noProxy", alias = "noproxy")]
    pub no_proxy: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            http: defaults::default_proxy_url(),
            https: defaults::default_proxy_url(),
            no_proxy: defaults::default_no_proxy(),
        }
    }
}

/// User-facing names accepted by `config set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    Http,
    Https,
    Both,
    NoProxy,
}

impl ConfigKey {
    pub fn is_no_proxy(name: &str) -> bool {
        matches!(name, "no-proxy" | "no_proxy")
    }
}

impl FromStr for ConfigKey {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            "both" => Ok(Self::Both),
            name if Self::is_no_proxy(name) => Ok(Self::NoProxy),
            other => Err(StoreError::UnknownKey(other.to_string())),
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Http => "http",
            Self::Https => "https",
            Self::Both => "both",
            Self::NoProxy => "no-proxy",
        };
        f.write_str(name)
    }
}

pub fn get_config_dir() -> Result<PathBuf, StoreError> {
    let home = dirs::home_dir().ok_or(StoreError::NoHomeDir)?;
    Ok(home.join(defaults::CONFIG_DIR_NAME))
}

pub fn get_config_path() -> Result<PathBuf, StoreError> {
    Ok(get_config_dir()?.join(defaults::CONFIG_FILE_NAME))
}

/// Handle on the config file, loaded once and written on every mutation.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    config: ProxyConfig,
}

impl ConfigStore {
    /// Opens the store at `~/.pvm/config.json`.
    pub fn open() -> Result<Self, StoreError> {
        Self::open_at(get_config_path()?)
    }

    /// Opens the store at `path`. A missing file yields the defaults and is
    /// not created until the first write.
    pub fn open_at(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let config = load_config(&path)?;
        debug!(path = %path.display(), "loaded proxy configuration");
        Ok(Self { path, config })
    }

    pub fn get_config(&self) -> ProxyConfig {
        self.config.clone()
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    pub fn get_config_path(&self) -> &Path {
        &self.path
    }

    pub fn set_http(&mut self, url: &str) -> Result<(), StoreError> {
        self.update(|config| config.http = url.to_string())
    }

    pub fn set_https(&mut self, url: &str) -> Result<(), StoreError> {
        self.update(|config| config.https = url.to_string())
    }

    pub fn set_both(&mut self, url: &str) -> Result<(), StoreError> {
        self.update(|config| {
            config.http = url.to_string();
            config.https = url.to_string();
        })
    }

    pub fn set_no_proxy(&mut self, list: &str) -> Result<(), StoreError> {
        self.update(|config| config.no_proxy = list.to_string())
    }

    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.update(|config| *config = ProxyConfig::default())
    }

    pub fn set(&mut self, key: ConfigKey, value: &str) -> Result<(), StoreError> {
        match key {
            ConfigKey::Http => self.set_http(value),
            ConfigKey::Https => self.set_https(value),
            ConfigKey::Both => self.set_both(value),
            ConfigKey::NoProxy => self.set_no_proxy(value),
        }
    }

    fn update<F>(&mut self, apply: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut ProxyConfig),
    {
        let mut next = self.config.clone();
        apply(&mut next);
        save_config(&self.path, &next)?;
        self.config = next;
        Ok(())
    }
}

fn load_config(path: &Path) -> Result<ProxyConfig, StoreError> {
    let load_err = |source| StoreError::Load {
        path: path.to_path_buf(),
        source,
    };
    let defaults = ProxyConfig::default();

    let loader = ConfigLoader::builder()
        .set_default("http", defaults.http)
        .and_then(|b| b.set_default("https", defaults.https))
        .and_then(|b| b.set_default("noProxy", defaults.no_proxy))
        .map_err(load_err)?
        .add_source(
            File::from(path.to_path_buf())
                .format(FileFormat::Json)
                .required(false),
        )
        .build()
        .map_err(load_err)?;

    loader.try_deserialize().map_err(load_err)
}

fn save_config(path: &Path, config: &ProxyConfig) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json).map_err(io_err)?;
    debug!(path = %path.display(), "saved proxy configuration");
    Ok(())
}
