//! Progress record types for install requests.
//!
//! A [`ProgressRecord`] is the live snapshot callers poll. Writers never
//! replace it wholesale while an install is running; they apply a
//! [`ProgressUpdate`] whose set fields overlay the existing ones.

use serde::{Deserialize, Serialize};

/// Lifecycle of one install request.
///
/// ```text
/// queued → checking ⇄ (next source) → downloading → installing → done
///                                                             ↘ failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallStatus {
    /// Accepted, background task not yet running.
    Queued,
    /// Probing a source for the identifier.
    Checking,
    /// Fetching files from the source that has the identifier.
    Downloading,
    /// Moving staged files into place and updating the ledger.
    Installing,
    /// Terminal: files installed.
    Done,
    /// Terminal: nothing installed, see `error`.
    Failed,
}

impl InstallStatus {
    /// Whether this status ends a request.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Human-readable name for the status.
    pub fn name(self) -> &'static str {
        match self {
            Self::Queued => "Queued",
            Self::Checking => "Checking sources",
            Self::Downloading => "Downloading",
            Self::Installing => "Installing",
            Self::Done => "Done",
            Self::Failed => "Failed",
        }
    }
}

/// Snapshot of an install request's progress.
///
/// The default record (no status, zeroed counters) is what callers see for
/// an identifier that was never requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<InstallStatus>,
    /// Source currently being probed or fetched from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_repository: Option<String>,
    pub total_files: usize,
    pub downloaded_files: usize,
    pub bytes_read: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProgressRecord {
    /// Initial record written when a request is accepted.
    pub fn queued() -> Self {
        Self {
            status: Some(InstallStatus::Queued),
            ..Default::default()
        }
    }

    /// Whether the request has finished (successfully or not).
    pub fn is_terminal(&self) -> bool {
        self.status.is_some_and(InstallStatus::is_terminal)
    }

    /// Progress as a ratio (0.0 to 1.0) based on downloaded files.
    pub fn progress_ratio(&self) -> f64 {
        if self.total_files == 0 {
            return if self.status == Some(InstallStatus::Done) {
                1.0
            } else {
                0.0
            };
        }
        self.downloaded_files as f64 / self.total_files as f64
    }

    /// Overlay the set fields of `update` onto this record.
    pub fn apply(&mut self, update: ProgressUpdate) {
        if let Some(status) = update.status {
            self.status = Some(status);
        }
        if let Some(repository) = update.current_repository {
            self.current_repository = Some(repository);
        }
        if let Some(total) = update.total_files {
            self.total_files = total;
        }
        if let Some(downloaded) = update.downloaded_files {
            self.downloaded_files = downloaded;
        }
        if let Some(bytes) = update.bytes_read {
            self.bytes_read = bytes;
        }
        if update.clear_error {
            self.error = None;
        }
        if let Some(error) = update.error {
            self.error = Some(error);
        }
    }
}

/// Partial update to a [`ProgressRecord`]. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub status: Option<InstallStatus>,
    pub current_repository: Option<String>,
    pub total_files: Option<usize>,
    pub downloaded_files: Option<usize>,
    pub bytes_read: Option<u64>,
    pub error: Option<String>,
    pub clear_error: bool,
}

impl ProgressUpdate {
    /// Start an update that sets the status.
    pub fn status(status: InstallStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Start a `failed` update carrying an error message.
    pub fn failed(error: impl Into<String>) -> Self {
        Self::status(InstallStatus::Failed).with_error(error)
    }

    /// Set the current repository.
    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.current_repository = Some(repository.into());
        self
    }

    /// Set both file counters.
    pub fn with_files(mut self, downloaded: usize, total: usize) -> Self {
        self.downloaded_files = Some(downloaded);
        self.total_files = Some(total);
        self
    }

    /// Set the downloaded file counter only.
    pub fn with_downloaded(mut self, downloaded: usize) -> Self {
        self.downloaded_files = Some(downloaded);
        self
    }

    /// Set the byte counter.
    pub fn with_bytes(mut self, bytes: u64) -> Self {
        self.bytes_read = Some(bytes);
        self
    }

    /// Set the error message.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Drop any error left over from an earlier step.
    pub fn clearing_error(mut self) -> Self {
        self.clear_error = true;
        self
    }
}
