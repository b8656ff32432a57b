//! Shared command setup: configuration, logging, backend.

use luadepot::api::Backend;
use luadepot::config::{config_file_path, ConfigFile};
use luadepot::logging::{init_logging, LogComponent, WorkerGuard};
use tracing::info;

use crate::error::CliError;

/// Loaded configuration plus the logging guard for one command run.
pub struct CliRunner {
    config: ConfigFile,
    _log_guard: WorkerGuard,
}

impl CliRunner {
    /// Load configuration and start logging for `component`.
    pub fn new(component: LogComponent) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;
        let guard = init_logging(component, &config.logging.directory, &config.logging.level);
        Ok(Self {
            config,
            _log_guard: guard,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log the command being run.
    pub fn log_startup(&self, command: &str) {
        info!(
            version = luadepot::VERSION,
            command,
            config = %config_file_path().display(),
            "luadepot starting"
        );
    }

    /// Build the backend from the loaded configuration.
    pub fn backend(&self) -> Result<Backend, CliError> {
        Ok(Backend::from_config(&self.config)?)
    }
}
