//! Moving staged files into their destinations.

use std::fs;
use std::io;
use std::path::Path;

use super::error::{InstallError, InstallResult};

/// Move a staged file to `dest`, replacing any existing file.
///
/// Tries a rename first (fast path on the same filesystem) and falls back to
/// copy + delete when the staging area lives on another filesystem.
pub fn place_file(staged: &Path, dest: &Path) -> InstallResult<u64> {
    if fs::rename(staged, dest).is_ok() {
        return fs::metadata(dest)
            .map(|m| m.len())
            .map_err(|e| InstallError::WriteFailed {
                path: dest.to_path_buf(),
                source: e,
            });
    }

    let bytes = fs::copy(staged, dest).map_err(|e| InstallError::WriteFailed {
        path: dest.to_path_buf(),
        source: e,
    })?;
    // Staging is dropped as a whole afterwards
    fs::remove_file(staged).ok();
    Ok(bytes)
}

/// Delete a file if it exists.
///
/// Returns `Ok(false)` when there was nothing to delete.
pub fn remove_if_present(path: &Path) -> InstallResult<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(InstallError::RemoveFailed {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
