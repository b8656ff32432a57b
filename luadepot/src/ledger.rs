//! Persisted ledger of installed manifest files.
//!
//! The ledger maps each identifier to the manifest filenames an install
//! placed in the depot cache, which is what lets removal delete exactly those
//! files instead of guessing from filenames.
//!
//! # File Format
//!
//! A single UTF-8 JSON object in the plugin directory:
//!
//! ```text
//! {
//!   "730": {
//!     "manifests": ["731_123.manifest", "732_456.manifest"],
//!     "repository": "owner/name",
//!     "installedAt": "2025-01-01T12:00:00+00:00"
//!   }
//! }
//! ```
//!
//! The file is rewritten wholesale on every change. A missing or malformed
//! file reads as an empty ledger.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::app_id::AppId;

/// File name of the ledger inside the plugin directory.
pub const LEDGER_FILENAME: &str = "luadepot_ledger.json";

/// Errors raised while persisting the ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Reading or writing the ledger file failed.
    #[error("ledger I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The ledger could not be serialized.
    #[error("failed to serialize ledger: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// What one install placed on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    /// Manifest filenames placed in the depot cache, in install order.
    pub manifests: Vec<String>,
    /// Source the files came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    /// RFC 3339 timestamp of the install.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed_at: Option<String>,
}

impl LedgerEntry {
    /// Create an entry stamped with the current time.
    pub fn new(manifests: Vec<String>, repository: impl Into<String>) -> Self {
        Self {
            manifests,
            repository: Some(repository.into()),
            installed_at: Some(chrono::Local::now().to_rfc3339()),
        }
    }
}

type LedgerMap = BTreeMap<String, LedgerEntry>;

/// Ledger backed by a JSON file.
///
/// Read-modify-write cycles are serialized by an internal lock so that
/// concurrent installs of different identifiers don't lose each other's
/// entries.
#[derive(Debug)]
pub struct LedgerStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl LedgerStore {
    /// Create a store for the ledger file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Create a store at the standard location inside `plugin_dir`.
    pub fn in_plugin_dir(plugin_dir: &Path) -> Self {
        Self::new(plugin_dir.join(LEDGER_FILENAME))
    }

    /// Path of the ledger file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up the entry for `app_id`.
    pub fn get(&self, app_id: AppId) -> Option<LedgerEntry> {
        let _guard = self.lock.lock();
        self.read().remove(&app_id.to_string())
    }

    /// Identifiers that currently have an entry, ascending.
    pub fn tracked(&self) -> Vec<AppId> {
        let _guard = self.lock.lock();
        let mut ids: Vec<AppId> = self
            .read()
            .keys()
            .filter_map(|key| key.parse().ok())
            .collect();
        ids.sort();
        ids
    }

    /// Create or overwrite the entry for `app_id`.
    pub fn record(&self, app_id: AppId, entry: LedgerEntry) -> Result<(), LedgerError> {
        let _guard = self.lock.lock();
        let mut map = self.read();
        map.insert(app_id.to_string(), entry);
        self.write(&map)
    }

    /// Delete the entry for `app_id`, returning it if it existed.
    pub fn remove(&self, app_id: AppId) -> Result<Option<LedgerEntry>, LedgerError> {
        let _guard = self.lock.lock();
        let mut map = self.read();
        let removed = map.remove(&app_id.to_string());
        if removed.is_some() {
            self.write(&map)?;
        }
        Ok(removed)
    }

    fn read(&self) -> LedgerMap {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return LedgerMap::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read ledger, treating as empty");
                return LedgerMap::new();
            }
        };

        if content.trim().is_empty() {
            return LedgerMap::new();
        }

        match serde_json::from_str(&content) {
            Ok(map) => map,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Malformed ledger, treating as empty");
                LedgerMap::new()
            }
        }
    }

    fn write(&self, map: &LedgerMap) -> Result<(), LedgerError> {
        let json = serde_json::to_string_pretty(map)?;
        let io_err = |source| LedgerError::Io {
            path: self.path.clone(),
            source,
        };

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(io_err)?;

        // Write beside the ledger and rename so readers never see a torn file
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(json.as_bytes()).map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;

        debug!(path = %self.path.display(), entries = map.len(), "Ledger written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manifests(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = LedgerStore::in_plugin_dir(temp.path());
        assert!(store.get(AppId::new(1)).is_none());
        assert!(store.tracked().is_empty());
    }

    #[test]
    fn test_record_and_get() {
        let temp = TempDir::new().unwrap();
        let store = LedgerStore::in_plugin_dir(temp.path());
        let entry = LedgerEntry::new(manifests(&["1_a.manifest", "2_b.manifest"]), "o/r");

        store.record(AppId::new(10), entry.clone()).unwrap();

        assert_eq!(store.get(AppId::new(10)), Some(entry));
        assert_eq!(store.tracked(), vec![AppId::new(10)]);
    }

    #[test]
    fn test_record_keeps_other_entries() {
        let temp = TempDir::new().unwrap();
        let store = LedgerStore::in_plugin_dir(temp.path());

        store
            .record(AppId::new(1), LedgerEntry::new(manifests(&["a.manifest"]), "o/r"))
            .unwrap();
        store
            .record(AppId::new(2), LedgerEntry::new(manifests(&["b.manifest"]), "o/r"))
            .unwrap();

        assert_eq!(store.tracked(), vec![AppId::new(1), AppId::new(2)]);
    }

    #[test]
    fn test_remove_deletes_entry() {
        let temp = TempDir::new().unwrap();
        let store = LedgerStore::in_plugin_dir(temp.path());
        store
            .record(AppId::new(5), LedgerEntry::new(manifests(&["x.manifest"]), "o/r"))
            .unwrap();

        let removed = store.remove(AppId::new(5)).unwrap();
        assert_eq!(removed.unwrap().manifests, manifests(&["x.manifest"]));
        assert!(store.get(AppId::new(5)).is_none());
        assert!(store.remove(AppId::new(5)).unwrap().is_none());
    }

    #[test]
    fn test_malformed_file_reads_empty() {
        let temp = TempDir::new().unwrap();
        let store = LedgerStore::in_plugin_dir(temp.path());
        fs::write(store.path(), "{ not json").unwrap();

        assert!(store.get(AppId::new(1)).is_none());

        // Recording over a malformed ledger replaces it with a valid one
        store
            .record(AppId::new(1), LedgerEntry::new(manifests(&["m.manifest"]), "o/r"))
            .unwrap();
        assert!(store.get(AppId::new(1)).is_some());
    }

    #[test]
    fn test_reads_minimal_entry_shape() {
        let temp = TempDir::new().unwrap();
        let store = LedgerStore::in_plugin_dir(temp.path());
        fs::write(store.path(), r#"{"99": {"manifests": ["99_1.manifest"]}}"#).unwrap();

        let entry = store.get(AppId::new(99)).unwrap();
        assert_eq!(entry.manifests, manifests(&["99_1.manifest"]));
        assert!(entry.repository.is_none());
    }

    #[test]
    fn test_written_file_is_keyed_by_string_id() {
        let temp = TempDir::new().unwrap();
        let store = LedgerStore::in_plugin_dir(temp.path());
        store
            .record(AppId::new(440), LedgerEntry::new(manifests(&["a.manifest"]), "o/r"))
            .unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["440"]["manifests"][0], "a.manifest");
        assert_eq!(raw["440"]["repository"], "o/r");
    }
}
