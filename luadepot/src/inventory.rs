//! Local inventory of installed scripts.
//!
//! Installed apps are discovered from the plugin directory itself rather than
//! the ledger, so scripts placed by hand or by older installs are included.
//! Script filenames follow `{appid}.lua`; a disabled script is
//! `{appid}.lua.disabled` and counts for [`LocalInventory::has_installed`]
//! but not for [`LocalInventory::list_installed`].

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;

use crate::app_id::AppId;

fn script_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d+)\.lua$").expect("valid script regex"))
}

/// Parse an app id from an enabled script filename.
pub fn parse_script_filename(filename: &str) -> Option<AppId> {
    let captures = script_pattern().captures(filename)?;
    captures[1].parse().ok()
}

/// Read-only view of the scripts in the plugin directory.
#[derive(Debug, Clone)]
pub struct LocalInventory {
    plugin_dir: PathBuf,
}

impl LocalInventory {
    pub fn new(plugin_dir: impl Into<PathBuf>) -> Self {
        Self {
            plugin_dir: plugin_dir.into(),
        }
    }

    /// Ids of every enabled script, ascending.
    ///
    /// A missing plugin directory yields an empty list.
    pub fn list_installed(&self) -> io::Result<Vec<AppId>> {
        let entries = match fs::read_dir(&self.plugin_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut ids: Vec<AppId> = entries
            .flatten()
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| parse_script_filename(&entry.file_name().to_string_lossy()))
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    /// Whether a script (enabled or disabled) exists for `app_id`.
    pub fn has_installed(&self, app_id: AppId) -> bool {
        [app_id.script_filename(), app_id.disabled_script_filename()]
            .iter()
            .any(|name| self.plugin_dir.join(name).is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_script_filename() {
        assert_eq!(parse_script_filename("730.lua"), Some(AppId::new(730)));
        assert_eq!(parse_script_filename("730.lua.disabled"), None);
        assert_eq!(parse_script_filename("abc.lua"), None);
        assert_eq!(parse_script_filename("730_1.lua"), None);
        assert_eq!(parse_script_filename("99999999999.lua"), None);
    }

    #[test]
    fn test_list_installed_sorted() {
        let temp = TempDir::new().unwrap();
        for name in ["900.lua", "12.lua", "50.lua.disabled", "notes.lua", "12_3.manifest"] {
            fs::write(temp.path().join(name), "").unwrap();
        }
        fs::create_dir(temp.path().join("77.lua")).unwrap();

        let inventory = LocalInventory::new(temp.path());
        assert_eq!(
            inventory.list_installed().unwrap(),
            vec![AppId::new(12), AppId::new(900)]
        );
    }

    #[test]
    fn test_list_installed_missing_dir() {
        let temp = TempDir::new().unwrap();
        let inventory = LocalInventory::new(temp.path().join("nope"));
        assert!(inventory.list_installed().unwrap().is_empty());
    }

    #[test]
    fn test_has_installed_counts_disabled() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("10.lua"), "").unwrap();
        fs::write(temp.path().join("20.lua.disabled"), "").unwrap();

        let inventory = LocalInventory::new(temp.path());
        assert!(inventory.has_installed(AppId::new(10)));
        assert!(inventory.has_installed(AppId::new(20)));
        assert!(!inventory.has_installed(AppId::new(30)));
    }
}
