//! Host directory layout.
//!
//! The host owns two directories this crate writes into: the plugin
//! directory (scripts, plus the ledger) and the depot cache (manifests).
//! The depot cache always sits beside the plugin directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::install::{InstallError, InstallResult};
use crate::source::AssetKind;

/// Name of the depot cache directory, a sibling of the plugin directory.
pub const DEPOT_CACHE_DIR_NAME: &str = "depotcache";

/// Locates the host's plugin directory.
pub trait PathProvider: Send + Sync {
    /// Directory scripts are installed into.
    fn plugin_dir(&self) -> PathBuf;

    /// Directory manifests are installed into.
    fn depot_cache_dir(&self) -> PathBuf {
        depot_cache_for(&self.plugin_dir())
    }
}

/// Derive the depot cache directory for a plugin directory.
pub fn depot_cache_for(plugin_dir: &Path) -> PathBuf {
    match plugin_dir.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(DEPOT_CACHE_DIR_NAME),
        _ => plugin_dir.join(DEPOT_CACHE_DIR_NAME),
    }
}

/// Fixed plugin directory, typically taken from configuration.
#[derive(Debug, Clone)]
pub struct StaticPaths {
    plugin_dir: PathBuf,
}

impl StaticPaths {
    pub fn new(plugin_dir: impl Into<PathBuf>) -> Self {
        Self {
            plugin_dir: plugin_dir.into(),
        }
    }
}

impl PathProvider for StaticPaths {
    fn plugin_dir(&self) -> PathBuf {
        self.plugin_dir.clone()
    }
}

/// Resolved destination directories for one install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTargets {
    pub plugin_dir: PathBuf,
    pub depot_cache_dir: PathBuf,
}

impl InstallTargets {
    /// Resolve both directories from a provider.
    pub fn from_provider(provider: &dyn PathProvider) -> Self {
        Self {
            plugin_dir: provider.plugin_dir(),
            depot_cache_dir: provider.depot_cache_dir(),
        }
    }

    /// Targets for a plugin directory with the standard depot cache sibling.
    pub fn for_plugin_dir(plugin_dir: impl Into<PathBuf>) -> Self {
        let plugin_dir = plugin_dir.into();
        let depot_cache_dir = depot_cache_for(&plugin_dir);
        Self {
            plugin_dir,
            depot_cache_dir,
        }
    }

    /// Destination directory for an asset kind.
    pub fn dir_for(&self, kind: AssetKind) -> &Path {
        match kind {
            AssetKind::Script => &self.plugin_dir,
            AssetKind::DataManifest => &self.depot_cache_dir,
        }
    }

    /// Create both directories if they don't exist.
    pub fn ensure_exists(&self) -> InstallResult<()> {
        for dir in [&self.plugin_dir, &self.depot_cache_dir] {
            fs::create_dir_all(dir).map_err(|e| InstallError::CreateDirFailed {
                path: dir.clone(),
                source: e,
            })?;
        }
        Ok(())
    }
}
