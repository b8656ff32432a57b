//! Error types for the install pipeline.

use std::io;
use std::path::PathBuf;

/// Result type for install operations.
pub type InstallResult<T> = Result<T, InstallError>;

/// Errors that can occur while fetching, placing or removing files.
///
/// A source that simply lacks an identifier is not an error; that is
/// reported as [`FetchOutcome::NotFound`](crate::source::FetchOutcome).
#[derive(Debug)]
pub enum InstallError {
    /// Failed to build the HTTP client.
    ClientBuild(String),

    /// HTTP request failed before a response arrived.
    Http { url: String, reason: String },

    /// Request timed out.
    Timeout { url: String, timeout_secs: u64 },

    /// Server answered with an unexpected status.
    UnexpectedStatus { url: String, status: u16 },

    /// Response body could not be read or parsed.
    MalformedResponse { url: String, reason: String },

    /// Failed to create a directory.
    CreateDirFailed { path: PathBuf, source: io::Error },

    /// Failed to write a file.
    WriteFailed { path: PathBuf, source: io::Error },

    /// Failed to delete a file.
    RemoveFailed { path: PathBuf, source: io::Error },

    /// A removal hit an error after deleting some files.
    RemovalIncomplete {
        removed: Vec<String>,
        first: Box<InstallError>,
    },

    /// Failed to create the staging area for a fetch.
    StagingFailed { source: io::Error },

    /// Every source was tried and the last one failed.
    AllSourcesFailed {
        tried: Vec<String>,
        last: Box<InstallError>,
    },

    /// The background install task panicked.
    TaskPanicked(String),
}

impl InstallError {
    /// Wrap a `reqwest` transport error with its URL.
    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
                timeout_secs,
            }
        } else {
            Self::Http {
                url: url.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

impl std::fmt::Display for InstallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ClientBuild(reason) => write!(f, "failed to create HTTP client: {}", reason),
            Self::Http { url, reason } => write!(f, "request to {} failed: {}", url, reason),
            Self::Timeout { url, timeout_secs } => {
                write!(f, "request to {} timed out after {}s", url, timeout_secs)
            }
            Self::UnexpectedStatus { url, status } => {
                write!(f, "request to {} returned HTTP {}", url, status)
            }
            Self::MalformedResponse { url, reason } => {
                write!(f, "malformed response from {}: {}", url, reason)
            }
            Self::CreateDirFailed { path, source } => {
                write!(
                    f,
                    "failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::WriteFailed { path, source } => {
                write!(f, "failed to write {}: {}", path.display(), source)
            }
            Self::RemoveFailed { path, source } => {
                write!(f, "failed to remove {}: {}", path.display(), source)
            }
            Self::RemovalIncomplete { removed, first } => {
                write!(f, "{} ({} files removed)", first, removed.len())
            }
            Self::StagingFailed { source } => {
                write!(f, "failed to create staging directory: {}", source)
            }
            Self::AllSourcesFailed { tried, last } => {
                write!(
                    f,
                    "all repositories failed ({} tried: {}): {}",
                    tried.len(),
                    tried.join(", "),
                    last
                )
            }
            Self::TaskPanicked(msg) => write!(f, "install task panicked: {}", msg),
        }
    }
}

impl std::error::Error for InstallError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::CreateDirFailed { source, .. } => Some(source),
            Self::WriteFailed { source, .. } => Some(source),
            Self::RemoveFailed { source, .. } => Some(source),
            Self::StagingFailed { source } => Some(source),
            Self::RemovalIncomplete { first, .. } => Some(first.as_ref()),
            Self::AllSourcesFailed { last, .. } => Some(last.as_ref()),
            _ => None,
        }
    }
}
