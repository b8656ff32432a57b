//! Host application restart.
//!
//! Newly installed scripts only take effect after the host restarts. How to
//! restart it is platform and installation specific, so the command comes
//! from configuration and is run through the platform shell.

use std::io;
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::info;

/// Errors from restarting the host.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("no restart command configured (set host.restart_command)")]
    NotConfigured,

    #[error("failed to run restart command {command:?}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
}

/// Restarts the host application.
pub trait HostRestarter: Send + Sync {
    /// Trigger a restart. Returns once the restart has been started.
    fn restart(&self) -> Result<(), HostError>;
}

/// Runs a configured shell command to restart the host.
#[derive(Debug, Clone, Default)]
pub struct CommandRestarter {
    command: Option<String>,
}

impl CommandRestarter {
    /// Create a restarter; a blank command counts as not configured.
    pub fn new(command: Option<String>) -> Self {
        Self {
            command: command.filter(|c| !c.trim().is_empty()),
        }
    }

    /// Get the configured command.
    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }
}

impl HostRestarter for CommandRestarter {
    fn restart(&self) -> Result<(), HostError> {
        let command = self.command.as_deref().ok_or(HostError::NotConfigured)?;

        let mut process = shell_command(command);
        process
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // Detached: the host may take this process down with it
        process.spawn().map_err(|source| HostError::Spawn {
            command: command.to_string(),
            source,
        })?;

        info!(command, "Host restart started");
        Ok(())
    }
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut process = Command::new("cmd");
    process.args(["/C", command]);
    process
}

#[cfg(not(windows))]
fn shell_command(command: &str) -> Command {
    let mut process = Command::new("sh");
    process.args(["-c", command]);
    process
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_restart_fails() {
        let restarter = CommandRestarter::new(None);
        assert!(matches!(restarter.restart(), Err(HostError::NotConfigured)));

        let blank = CommandRestarter::new(Some("   ".to_string()));
        assert!(blank.command().is_none());
        assert!(matches!(blank.restart(), Err(HostError::NotConfigured)));
    }

    #[cfg(unix)]
    #[test]
    fn test_restart_runs_command() {
        let temp = tempfile::TempDir::new().unwrap();
        let marker = temp.path().join("restarted");
        let restarter =
            CommandRestarter::new(Some(format!("touch '{}'", marker.display())));

        restarter.restart().unwrap();

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while !marker.exists() && std::time::Instant::now() < deadline {
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert!(marker.exists());
    }
}
