//! Tree-mode fetch: probe one source and install its files.
//!
//! Workflow for one `(app_id, source)` pair:
//! 1. Resolve the branch named after the id (absent ⇒ not found)
//! 2. List the commit's files and keep `.lua` / `.manifest` (none ⇒ not found)
//! 3. Download each file into a scoped staging directory
//! 4. Move staged files into the plugin directory / depot cache
//! 5. Record the manifest filenames in the ledger
//!
//! The record is left in `installing`; the sequencer marks it done or
//! failed. Errors only set the record's error text.
//!
//! Nothing touches the destination directories until every file has been
//! downloaded. If a placement fails, the files already placed are deleted
//! again. The staging directory is removed on every exit path.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use tracing::{debug, info, warn};

use super::asset::{select_assets, AssetItem, AssetKind};
use super::traits::{FetchOutcome, InstalledAssets, SourceClient, SourceRepository};
use crate::app_id::AppId;
use crate::install::placement::{place_file, remove_if_present};
use crate::install::{InstallError, InstallResult};
use crate::ledger::{LedgerEntry, LedgerStore};
use crate::paths::InstallTargets;
use crate::progress::{InstallStatus, ProgressStore, ProgressUpdate};

/// [`SourceClient`] that fetches individual files from a branch tree.
pub struct TreeFetcher<R: SourceRepository> {
    repository: R,
    targets: InstallTargets,
    progress: Arc<ProgressStore>,
    ledger: Arc<LedgerStore>,
    /// Parent directory for staging areas; system temp dir if unset.
    staging_root: Option<PathBuf>,
}

impl<R: SourceRepository> TreeFetcher<R> {
    /// Create a fetcher.
    ///
    /// # Arguments
    ///
    /// * `repository` - Remote access for all sources
    /// * `targets` - Destination directories
    /// * `progress` - Store receiving live progress updates
    /// * `ledger` - Ledger updated after a successful install
    pub fn new(
        repository: R,
        targets: InstallTargets,
        progress: Arc<ProgressStore>,
        ledger: Arc<LedgerStore>,
    ) -> Self {
        Self {
            repository,
            targets,
            progress,
            ledger,
            staging_root: None,
        }
    }

    /// Stage downloads under `root` instead of the system temp directory.
    pub fn with_staging_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.staging_root = Some(root.into());
        self
    }

    /// Get the destination directories.
    pub fn targets(&self) -> &InstallTargets {
        &self.targets
    }

    fn create_staging(&self, app_id: AppId) -> InstallResult<TempDir> {
        let prefix = format!("luadepot-{}-", app_id);
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);
        let result = match &self.staging_root {
            Some(root) => {
                fs::create_dir_all(root).map_err(|e| InstallError::CreateDirFailed {
                    path: root.clone(),
                    source: e,
                })?;
                builder.tempdir_in(root)
            }
            None => builder.tempdir(),
        };
        result.map_err(|source| InstallError::StagingFailed { source })
    }

    fn fetch(&self, app_id: AppId, source: &str) -> InstallResult<FetchOutcome> {
        self.progress.update(
            app_id,
            ProgressUpdate::default()
                .with_repository(source)
                .with_files(0, 0)
                .with_bytes(0),
        );

        let Some(commit) = self.repository.resolve_branch(source, app_id)? else {
            debug!(%app_id, source, "No branch for app");
            return Ok(FetchOutcome::NotFound);
        };

        let Some(paths) = self.repository.list_files(source, &commit)? else {
            debug!(%app_id, source, commit, "Branch commit has no tree");
            return Ok(FetchOutcome::NotFound);
        };

        let assets = select_assets(paths);
        if assets.is_empty() {
            debug!(%app_id, source, commit, "Branch has no installable files");
            return Ok(FetchOutcome::NotFound);
        }

        let total = assets.len();
        self.progress.update(
            app_id,
            ProgressUpdate::status(InstallStatus::Downloading)
                .with_repository(source)
                .with_files(0, total),
        );

        let staging = self.create_staging(app_id)?;
        let staged = self.download_all(app_id, source, &commit, &assets, staging.path())?;

        self.progress
            .update(app_id, ProgressUpdate::status(InstallStatus::Installing));
        let installed = self.install_staged(&staged)?;
        drop(staging);

        let entry = LedgerEntry::new(installed.manifests.clone(), source);
        if let Err(e) = self.ledger.record(app_id, entry) {
            warn!(%app_id, error = %e, "Failed to update ledger, removal will fall back to filename matching");
        }

        info!(
            %app_id,
            source,
            scripts = installed.scripts.len(),
            manifests = installed.manifests.len(),
            "Installed app files"
        );

        Ok(FetchOutcome::Installed(installed))
    }

    /// Download every asset into `staging_dir`, reporting per-file progress.
    fn download_all<'a>(
        &self,
        app_id: AppId,
        source: &str,
        commit: &str,
        assets: &'a [AssetItem],
        staging_dir: &Path,
    ) -> InstallResult<Vec<(&'a AssetItem, PathBuf)>> {
        let mut staged = Vec::with_capacity(assets.len());
        let mut bytes_read = 0u64;

        for (index, asset) in assets.iter().enumerate() {
            let data = self.repository.fetch_file(source, commit, &asset.path)?;
            let staged_path = staging_dir.join(asset.filename());
            fs::write(&staged_path, &data).map_err(|e| InstallError::WriteFailed {
                path: staged_path.clone(),
                source: e,
            })?;

            bytes_read += data.len() as u64;
            staged.push((asset, staged_path));

            self.progress.update(
                app_id,
                ProgressUpdate::status(InstallStatus::Downloading)
                    .with_downloaded(index + 1)
                    .with_bytes(bytes_read),
            );
        }

        Ok(staged)
    }

    /// Move staged files into their destination directories.
    ///
    /// All or nothing: on a failed placement every file placed so far is
    /// deleted before the error is returned.
    fn install_staged(&self, staged: &[(&AssetItem, PathBuf)]) -> InstallResult<InstalledAssets> {
        self.targets.ensure_exists()?;

        let mut installed = InstalledAssets::default();
        let mut placed: Vec<PathBuf> = Vec::with_capacity(staged.len());
        for (asset, staged_path) in staged {
            let filename = asset.filename();
            let dest = self.targets.dir_for(asset.kind).join(filename);
            if let Err(e) = place_file(staged_path, &dest) {
                warn!(path = %dest.display(), error = %e, placed = placed.len(), "Placement failed, undoing install");
                Self::undo_placement(&placed);
                return Err(e);
            }
            placed.push(dest);

            match asset.kind {
                AssetKind::Script => installed.scripts.push(filename.to_string()),
                AssetKind::DataManifest => installed.manifests.push(filename.to_string()),
            }
        }

        Ok(installed)
    }

    fn undo_placement(placed: &[PathBuf]) {
        for path in placed {
            if let Err(e) = remove_if_present(path) {
                warn!(path = %path.display(), error = %e, "Could not undo placed file");
            }
        }
    }
}

impl<R: SourceRepository> SourceClient for TreeFetcher<R> {
    fn probe_and_fetch(&self, app_id: AppId, source: &str) -> InstallResult<FetchOutcome> {
        self.fetch(app_id, source).inspect_err(|e| {
            self.progress.update(
                app_id,
                ProgressUpdate::default()
                    .with_error(e.to_string())
                    .with_repository(source),
            );
        })
    }
}
