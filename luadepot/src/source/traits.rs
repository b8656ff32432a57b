//! Trait seams for source access.
//!
//! [`SourceRepository`] is the raw remote API (one call per HTTP round trip);
//! [`SourceClient`] is the probe-and-fetch contract the fallback sequencer
//! drives. Splitting them lets the fetch logic run against an in-memory
//! repository in tests.

use crate::app_id::AppId;
use crate::install::InstallResult;

/// Remote repository access.
pub trait SourceRepository: Send + Sync {
    /// Resolve the branch named after `app_id` to a commit reference.
    ///
    /// Returns `Ok(None)` if the source has no such branch.
    fn resolve_branch(&self, source: &str, app_id: AppId) -> InstallResult<Option<String>>;

    /// List every file path reachable from `commit`.
    ///
    /// Returns `Ok(None)` if the commit is unknown to the source.
    fn list_files(&self, source: &str, commit: &str) -> InstallResult<Option<Vec<String>>>;

    /// Fetch the raw content of one file at `commit`.
    fn fetch_file(&self, source: &str, commit: &str, path: &str) -> InstallResult<Vec<u8>>;
}

/// Filenames placed by a successful fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledAssets {
    /// Script files placed in the plugin directory.
    pub scripts: Vec<String>,
    /// Manifest files placed in the depot cache.
    pub manifests: Vec<String>,
}

impl InstalledAssets {
    /// Total number of files placed.
    pub fn len(&self) -> usize {
        self.scripts.len() + self.manifests.len()
    }

    /// Whether nothing was placed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of probing one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The source does not carry this identifier.
    NotFound,
    /// Files were fetched and placed.
    Installed(InstalledAssets),
}

/// Probe one source for an identifier and install its files if present.
pub trait SourceClient: Send + Sync {
    /// Errors are reserved for transport or structural failures; a source
    /// that lacks the identifier yields [`FetchOutcome::NotFound`].
    fn probe_and_fetch(&self, app_id: AppId, source: &str) -> InstallResult<FetchOutcome>;
}
