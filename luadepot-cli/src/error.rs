//! CLI error type.

use std::fmt;
use std::io;

use luadepot::api::BackendError;
use luadepot::config::ConfigError;
use luadepot::InvalidAppId;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be loaded, saved or applied.
    Config(String),
    /// The install pipeline could not be set up.
    Backend(BackendError),
    /// An app id argument was rejected.
    InvalidAppId(InvalidAppId),
    /// An install finished in the failed state.
    InstallFailed(String),
    /// Removal returned an error.
    RemoveFailed(String),
    /// Restarting the host failed.
    RestartFailed(String),
    /// Listing the plugin directory failed.
    ListFailed(String),
    /// Terminal or stdio failure.
    Io(io::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::InvalidAppId(_) => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Backend(e) => write!(f, "Failed to start: {}", e),
            CliError::InvalidAppId(e) => write!(f, "{}", e),
            CliError::InstallFailed(msg) => write!(f, "Install failed: {}", msg),
            CliError::RemoveFailed(msg) => write!(f, "Remove failed: {}", msg),
            CliError::RestartFailed(msg) => write!(f, "Restart failed: {}", msg),
            CliError::ListFailed(msg) => write!(f, "Failed to list installed apps: {}", msg),
            CliError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Backend(e) => Some(e),
            CliError::InvalidAppId(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<BackendError> for CliError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::Config(e) => CliError::Config(e.to_string()),
            other => CliError::Backend(other),
        }
    }
}

impl From<InvalidAppId> for CliError {
    fn from(e: InvalidAppId) -> Self {
        CliError::InvalidAppId(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Config("x".into()).exit_code(), 2);
        assert_eq!(CliError::InstallFailed("x".into()).exit_code(), 1);
    }

    #[test]
    fn test_invalid_app_id_message() {
        let err: CliError = "abc".parse::<luadepot::AppId>().unwrap_err().into();
        assert_eq!(err.to_string(), "Invalid appid: \"abc\"");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_backend_config_error_maps_to_config() {
        let err: CliError = BackendError::Config(ConfigError::PluginDirNotSet).into();
        assert!(matches!(err, CliError::Config(_)));
    }
}
