//! Removal of installed files.
//!
//! Three independent steps, each run even if an earlier one failed:
//! 1. the script and its disabled variant in the plugin directory
//! 2. every manifest the ledger lists, in the depot cache, then the entry
//! 3. legacy `<id>_*.manifest` files in the plugin directory
//!
//! A missing file is never an error. Other I/O failures are collected and
//! the first one is returned after all steps ran, together with the files
//! that were deleted.

use std::fs;
use std::io;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::error::{InstallError, InstallResult};
use super::placement::remove_if_present;
use crate::app_id::AppId;
use crate::ledger::LedgerStore;
use crate::paths::InstallTargets;

/// Result of a removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// Filenames that were deleted.
    Removed(Vec<String>),
    /// Nothing belonging to the identifier existed.
    NothingFound,
}

impl RemovalOutcome {
    /// Deleted filenames; empty for [`RemovalOutcome::NothingFound`].
    pub fn removed_files(&self) -> &[String] {
        match self {
            Self::Removed(files) => files,
            Self::NothingFound => &[],
        }
    }
}

/// Deletes everything installed for an identifier.
pub struct RemovalEngine {
    targets: InstallTargets,
    ledger: Arc<LedgerStore>,
}

impl RemovalEngine {
    pub fn new(targets: InstallTargets, ledger: Arc<LedgerStore>) -> Self {
        Self { targets, ledger }
    }

    /// Remove every file belonging to `app_id`.
    pub fn remove(&self, app_id: AppId) -> InstallResult<RemovalOutcome> {
        let mut removed = Vec::new();
        let mut failures = Vec::new();

        self.remove_scripts(app_id, &mut removed, &mut failures);
        self.remove_tracked_manifests(app_id, &mut removed, &mut failures);
        self.remove_legacy_manifests(app_id, &mut removed, &mut failures);

        if let Some(first) = failures.into_iter().next() {
            warn!(%app_id, files = removed.len(), error = %first, "Removal incomplete");
            return Err(InstallError::RemovalIncomplete {
                removed,
                first: Box::new(first),
            });
        }

        if removed.is_empty() {
            debug!(%app_id, "Nothing to remove");
            return Ok(RemovalOutcome::NothingFound);
        }

        info!(%app_id, files = removed.len(), "Removed app files");
        Ok(RemovalOutcome::Removed(removed))
    }

    fn remove_scripts(
        &self,
        app_id: AppId,
        removed: &mut Vec<String>,
        failures: &mut Vec<InstallError>,
    ) {
        for filename in [app_id.script_filename(), app_id.disabled_script_filename()] {
            let path = self.targets.plugin_dir.join(&filename);
            match remove_if_present(&path) {
                Ok(true) => {
                    debug!(path = %path.display(), "Removed script");
                    removed.push(filename);
                }
                Ok(false) => {}
                Err(e) => failures.push(e),
            }
        }
    }

    fn remove_tracked_manifests(
        &self,
        app_id: AppId,
        removed: &mut Vec<String>,
        failures: &mut Vec<InstallError>,
    ) {
        let Some(entry) = self.ledger.get(app_id) else {
            return;
        };

        let mut clean = true;
        for filename in entry.manifests {
            let path = self.targets.depot_cache_dir.join(&filename);
            match remove_if_present(&path) {
                Ok(true) => {
                    debug!(path = %path.display(), "Removed manifest");
                    removed.push(filename);
                }
                Ok(false) => {}
                Err(e) => {
                    clean = false;
                    failures.push(e);
                }
            }
        }

        // Keep the entry if anything it lists could not be deleted
        if clean {
            if let Err(e) = self.ledger.remove(app_id) {
                warn!(%app_id, error = %e, "Failed to drop ledger entry");
            }
        }
    }

    fn remove_legacy_manifests(
        &self,
        app_id: AppId,
        removed: &mut Vec<String>,
        failures: &mut Vec<InstallError>,
    ) {
        let dir = &self.targets.plugin_dir;
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return,
            Err(e) => {
                failures.push(InstallError::RemoveFailed {
                    path: dir.clone(),
                    source: e,
                });
                return;
            }
        };

        let prefix = format!("{}_", app_id);
        for entry in entries.flatten() {
            let filename = entry.file_name().to_string_lossy().into_owned();
            if !(filename.starts_with(&prefix) && filename.ends_with(".manifest")) {
                continue;
            }
            match remove_if_present(&entry.path()) {
                Ok(true) => {
                    debug!(path = %entry.path().display(), "Removed legacy manifest");
                    removed.push(filename);
                }
                Ok(false) => {}
                Err(e) => failures.push(e),
            }
        }
    }
}
