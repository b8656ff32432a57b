//! Settable configuration keys.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::file::{ConfigError, ConfigFile, LoggingSettings};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A `section.key` setting in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    HostPluginDir,
    HostRestartCommand,
    SourcesRepositories,
    NetworkTimeout,
    NetworkApiUrl,
    NetworkRawUrl,
    NetworkToken,
    LoggingDirectory,
    LoggingLevel,
}

impl ConfigKey {
    /// Every key, grouped by section in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::HostPluginDir,
            ConfigKey::HostRestartCommand,
            ConfigKey::SourcesRepositories,
            ConfigKey::NetworkTimeout,
            ConfigKey::NetworkApiUrl,
            ConfigKey::NetworkRawUrl,
            ConfigKey::NetworkToken,
            ConfigKey::LoggingDirectory,
            ConfigKey::LoggingLevel,
        ]
    }

    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::HostPluginDir | ConfigKey::HostRestartCommand => "host",
            ConfigKey::SourcesRepositories => "sources",
            ConfigKey::NetworkTimeout
            | ConfigKey::NetworkApiUrl
            | ConfigKey::NetworkRawUrl
            | ConfigKey::NetworkToken => "network",
            ConfigKey::LoggingDirectory | ConfigKey::LoggingLevel => "logging",
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::HostPluginDir => "plugin_dir",
            ConfigKey::HostRestartCommand => "restart_command",
            ConfigKey::SourcesRepositories => "repositories",
            ConfigKey::NetworkTimeout => "timeout",
            ConfigKey::NetworkApiUrl => "api_url",
            ConfigKey::NetworkRawUrl => "raw_url",
            ConfigKey::NetworkToken => "token",
            ConfigKey::LoggingDirectory => "directory",
            ConfigKey::LoggingLevel => "level",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as written to the file; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::HostPluginDir => config
                .host
                .plugin_dir
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            ConfigKey::HostRestartCommand => {
                config.host.restart_command.clone().unwrap_or_default()
            }
            ConfigKey::SourcesRepositories => config.sources.repositories.join(", "),
            ConfigKey::NetworkTimeout => config.network.timeout_secs.to_string(),
            ConfigKey::NetworkApiUrl => config.network.api_url.clone(),
            ConfigKey::NetworkRawUrl => config.network.raw_url.clone(),
            ConfigKey::NetworkToken => config.network.token.clone().unwrap_or_default(),
            ConfigKey::LoggingDirectory => config.logging.directory.display().to_string(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
        }
    }

    /// Validate and store `value`. An empty value clears optional settings
    /// and restores the default for the rest.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match self {
            ConfigKey::HostPluginDir => {
                config.host.plugin_dir = non_empty(value).map(PathBuf::from);
            }
            ConfigKey::HostRestartCommand => {
                config.host.restart_command = non_empty(value).map(str::to_string);
            }
            ConfigKey::SourcesRepositories => {
                config.sources.repositories = parse_repositories(value)
                    .map_err(|reason| self.invalid(value, reason))?;
            }
            ConfigKey::NetworkTimeout => {
                config.network.timeout_secs = match value.parse::<u64>() {
                    Ok(secs) if secs > 0 => secs,
                    _ => return Err(self.invalid(value, "expected a positive number of seconds")),
                };
            }
            ConfigKey::NetworkApiUrl => {
                config.network.api_url = self.parse_url(value)?;
            }
            ConfigKey::NetworkRawUrl => {
                config.network.raw_url = self.parse_url(value)?;
            }
            ConfigKey::NetworkToken => {
                config.network.token = non_empty(value).map(str::to_string);
            }
            ConfigKey::LoggingDirectory => {
                config.logging.directory = match non_empty(value) {
                    Some(dir) => PathBuf::from(dir),
                    None => LoggingSettings::default().directory,
                };
            }
            ConfigKey::LoggingLevel => {
                let level = value.to_ascii_lowercase();
                if !LOG_LEVELS.contains(&level.as_str()) {
                    return Err(self.invalid(value, "expected trace, debug, info, warn or error"));
                }
                config.logging.level = level;
            }
        }
        Ok(())
    }

    fn parse_url(&self, value: &str) -> Result<String, ConfigError> {
        if value.starts_with("http://") || value.starts_with("https://") {
            Ok(value.trim_end_matches('/').to_string())
        } else {
            Err(self.invalid(value, "expected an http:// or https:// URL"))
        }
    }

    fn invalid(&self, value: &str, reason: impl Into<String>) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section(), self.key_name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Parse a comma-separated `owner/name` list.
fn parse_repositories(value: &str) -> Result<Vec<String>, String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(|r| {
            let mut parts = r.split('/');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => {
                    Ok(r.to_string())
                }
                _ => Err(format!("'{}' is not in owner/name form", r)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_names() {
        for key in ConfigKey::all() {
            assert_eq!(key.name().parse::<ConfigKey>().unwrap(), *key);
        }
        assert_eq!(
            "Network.Timeout".parse::<ConfigKey>().unwrap(),
            ConfigKey::NetworkTimeout
        );
        assert!(matches!(
            "network.proxy".parse::<ConfigKey>(),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_set_and_get_repositories() {
        let mut config = ConfigFile::default();
        ConfigKey::SourcesRepositories
            .set(&mut config, "a/one,  b/two ,")
            .unwrap();
        assert_eq!(config.sources.repositories, vec!["a/one", "b/two"]);
        assert_eq!(ConfigKey::SourcesRepositories.get(&config), "a/one, b/two");
    }

    #[test]
    fn test_repositories_must_be_owner_name() {
        let mut config = ConfigFile::default();
        for bad in ["justname", "a/b/c", "/name", "owner/"] {
            assert!(
                ConfigKey::SourcesRepositories.set(&mut config, bad).is_err(),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_empty_clears_optional_values() {
        let mut config = ConfigFile::default();
        ConfigKey::NetworkToken.set(&mut config, "abc").unwrap();
        assert_eq!(config.network.token.as_deref(), Some("abc"));
        ConfigKey::NetworkToken.set(&mut config, "  ").unwrap();
        assert!(config.network.token.is_none());
        assert_eq!(ConfigKey::NetworkToken.get(&config), "");
    }

    #[test]
    fn test_timeout_validation() {
        let mut config = ConfigFile::default();
        ConfigKey::NetworkTimeout.set(&mut config, "45").unwrap();
        assert_eq!(config.network.timeout_secs, 45);
        assert!(ConfigKey::NetworkTimeout.set(&mut config, "0").is_err());
        assert!(ConfigKey::NetworkTimeout.set(&mut config, "-3").is_err());
    }

    #[test]
    fn test_url_validation() {
        let mut config = ConfigFile::default();
        ConfigKey::NetworkApiUrl
            .set(&mut config, "https://ghe.example.com/api/v3/")
            .unwrap();
        assert_eq!(config.network.api_url, "https://ghe.example.com/api/v3");
        assert!(ConfigKey::NetworkRawUrl.set(&mut config, "ftp://x").is_err());
    }

    #[test]
    fn test_log_level_validation() {
        let mut config = ConfigFile::default();
        ConfigKey::LoggingLevel.set(&mut config, "DEBUG").unwrap();
        assert_eq!(config.logging.level, "debug");
        assert!(ConfigKey::LoggingLevel.set(&mut config, "loud").is_err());
    }

    #[test]
    fn test_sections_are_contiguous() {
        let sections: Vec<&str> = ConfigKey::all().iter().map(|k| k.section()).collect();
        let mut seen: Vec<&str> = Vec::new();
        for section in sections {
            if seen.last() != Some(&section) {
                assert!(!seen.contains(&section), "{} split across the list", section);
                seen.push(section);
            }
        }
        assert_eq!(seen, vec!["host", "sources", "network", "logging"]);
    }
}
