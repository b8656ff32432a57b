//! Asset classification.
//!
//! A source snapshot may contain anything; only two kinds of file are
//! installed, and each kind has its own destination directory.

use std::collections::HashSet;

/// The two installable file kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// `.lua` script, routed to the plugin directory.
    Script,
    /// `.manifest` data file, routed to the depot cache.
    DataManifest,
}

impl AssetKind {
    /// Classify a path by extension. Other extensions are ignored.
    pub fn classify(path: &str) -> Option<Self> {
        if path.ends_with(".lua") {
            Some(Self::Script)
        } else if path.ends_with(".manifest") {
            Some(Self::DataManifest)
        } else {
            None
        }
    }
}

/// A remote file selected for installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetItem {
    /// Path inside the source snapshot.
    pub path: String,
    pub kind: AssetKind,
}

impl AssetItem {
    /// Build an item from a snapshot path, or `None` if it is not installable.
    pub fn from_path(path: impl Into<String>) -> Option<Self> {
        let path = path.into();
        let kind = AssetKind::classify(&path)?;
        let item = Self { path, kind };
        (!item.filename().is_empty()).then_some(item)
    }

    /// Base filename; source directory nesting is not preserved.
    pub fn filename(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// Select installable items from snapshot paths.
///
/// Items that share a base filename would land on the same destination, so
/// only the last one in listing order is kept.
pub fn select_assets<I, S>(paths: I) -> Vec<AssetItem>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let items: Vec<AssetItem> = paths.into_iter().filter_map(AssetItem::from_path).collect();

    let mut seen = HashSet::new();
    let mut kept: Vec<AssetItem> = items
        .into_iter()
        .rev()
        .filter(|item| seen.insert(item.filename().to_string()))
        .collect();
    kept.reverse();
    kept
}
