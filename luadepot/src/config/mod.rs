//! User configuration.

mod file;
mod keys;

pub use file::{
    config_dir, config_file_path, detect_plugin_dir, plugin_dir_candidates, ConfigError,
    ConfigFile, HostSettings, LoggingSettings, NetworkSettings, SourceSettings,
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_LOG_LEVEL,
};
pub use keys::ConfigKey;
