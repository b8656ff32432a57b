//! INI configuration file.
//!
//! Layout of `~/.luadepot/config.ini`:
//!
//! ```ini
//! [host]
//! plugin_dir = /home/user/.steam/steam/config/stplug-in
//! restart_command = steam -shutdown && steam
//!
//! [sources]
//! repositories = owner/first, owner/second
//!
//! [network]
//! timeout = 30
//! api_url = https://api.github.com
//! raw_url = https://raw.githubusercontent.com
//! token =
//!
//! [logging]
//! directory = /home/user/.luadepot/logs
//! level = info
//! ```
//!
//! Missing keys fall back to defaults; a missing file is all defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use crate::endpoints::StaticEndpoints;
use crate::paths::StaticPaths;
use crate::source::{GithubConfig, DEFAULT_API_URL, DEFAULT_RAW_URL, DEFAULT_TIMEOUT_SECS};

/// Name of the per-user configuration directory under the home directory.
pub const CONFIG_DIR_NAME: &str = ".luadepot";

/// Name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Errors from loading, saving or editing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),

    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("plugin directory not configured and none detected (set host.plugin_dir)")]
    PluginDirNotSet,
}

/// Path of the configuration file.
pub fn config_file_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

/// Per-user configuration directory.
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// `[host]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostSettings {
    /// Directory scripts are installed into.
    pub plugin_dir: Option<PathBuf>,
    /// Shell command that restarts the host.
    pub restart_command: Option<String>,
}

/// `[sources]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSettings {
    /// Repositories in priority order.
    pub repositories: Vec<String>,
}

/// `[network]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkSettings {
    pub timeout_secs: u64,
    pub api_url: String,
    pub raw_url: String,
    pub token: Option<String>,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_url: DEFAULT_API_URL.to_string(),
            raw_url: DEFAULT_RAW_URL.to_string(),
            token: None,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub directory: PathBuf,
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: config_dir().join("logs"),
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub host: HostSettings,
    pub sources: SourceSettings,
    pub network: NetworkSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Load from the default location; a missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let ini = Ini::load_from_file(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ini(&ini)
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Save to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        self.to_ini().write_to_file(path).map_err(write_err)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for key in super::ConfigKey::all() {
            if let Some(value) = ini
                .section(Some(key.section()))
                .and_then(|section| section.get(key.key_name()))
            {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in super::ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }
        ini
    }

    /// Plugin directory: configured, else detected.
    pub fn resolve_plugin_dir(&self) -> Result<PathBuf, ConfigError> {
        self.host
            .plugin_dir
            .clone()
            .or_else(detect_plugin_dir)
            .ok_or(ConfigError::PluginDirNotSet)
    }

    /// Path provider for the resolved plugin directory.
    pub fn paths(&self) -> Result<StaticPaths, ConfigError> {
        self.resolve_plugin_dir().map(StaticPaths::new)
    }

    /// Endpoint provider for the configured repositories.
    pub fn endpoints(&self) -> StaticEndpoints {
        StaticEndpoints::new(self.sources.repositories.iter().cloned())
    }

    /// Connection settings for the source client.
    pub fn github(&self) -> GithubConfig {
        GithubConfig::default()
            .with_api_url(self.network.api_url.clone())
            .with_raw_url(self.network.raw_url.clone())
            .with_token(self.network.token.clone())
            .with_timeout(Duration::from_secs(self.network.timeout_secs))
    }
}

/// Well-known plugin directory locations, most likely first.
pub fn plugin_dir_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if cfg!(windows) {
        candidates.push(PathBuf::from(r"C:\Program Files (x86)\Steam\config\stplug-in"));
        candidates.push(PathBuf::from(r"C:\Program Files\Steam\config\stplug-in"));
    } else if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".steam/steam/config/stplug-in"));
        candidates.push(home.join(".local/share/Steam/config/stplug-in"));
        candidates.push(home.join("Library/Application Support/Steam/config/stplug-in"));
    }
    candidates
}

/// First candidate plugin directory that exists.
pub fn detect_plugin_dir() -> Option<PathBuf> {
    plugin_dir_candidates().into_iter().find(|p| p.is_dir())
}
