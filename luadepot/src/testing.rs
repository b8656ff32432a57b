//! In-memory fakes shared by unit tests.

use std::collections::{HashMap, HashSet};

use crate::app_id::AppId;
use crate::install::{InstallError, InstallResult};
use crate::source::SourceRepository;

/// [`SourceRepository`] backed by maps.
///
/// Branch commits are named `<source>@<id>`.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    branches: HashMap<(String, AppId), String>,
    trees: HashMap<String, Vec<(String, Vec<u8>)>>,
    failing_sources: HashSet<String>,
    failing_files: HashSet<String>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_branch(mut self, source: &str, app_id: AppId, files: &[(&str, &[u8])]) -> Self {
        let commit = format!("{}@{}", source, app_id);
        self.branches
            .insert((source.to_string(), app_id), commit.clone());
        self.trees.insert(
            commit,
            files
                .iter()
                .map(|(path, data)| (path.to_string(), data.to_vec()))
                .collect(),
        );
        self
    }

    /// Every lookup against `source` fails with a server error.
    pub fn failing_source(mut self, source: &str) -> Self {
        self.failing_sources.insert(source.to_string());
        self
    }

    /// Downloads of any path ending in `suffix` fail with a server error.
    pub fn failing_file(mut self, suffix: &str) -> Self {
        self.failing_files.insert(suffix.to_string());
        self
    }

    fn server_error(url: String) -> InstallError {
        InstallError::UnexpectedStatus { url, status: 500 }
    }
}

impl SourceRepository for MemoryRepository {
    fn resolve_branch(&self, source: &str, app_id: AppId) -> InstallResult<Option<String>> {
        if self.failing_sources.contains(source) {
            return Err(Self::server_error(format!("{}/branches/{}", source, app_id)));
        }
        Ok(self.branches.get(&(source.to_string(), app_id)).cloned())
    }

    fn list_files(&self, source: &str, commit: &str) -> InstallResult<Option<Vec<String>>> {
        if self.failing_sources.contains(source) {
            return Err(Self::server_error(format!("{}/trees/{}", source, commit)));
        }
        Ok(self
            .trees
            .get(commit)
            .map(|files| files.iter().map(|(path, _)| path.clone()).collect()))
    }

    fn fetch_file(&self, source: &str, commit: &str, path: &str) -> InstallResult<Vec<u8>> {
        let url = format!("{}/{}/{}", source, commit, path);
        if self.failing_files.iter().any(|s| path.ends_with(s.as_str())) {
            return Err(Self::server_error(url));
        }
        self.trees
            .get(commit)
            .and_then(|files| files.iter().find(|(p, _)| p == path))
            .map(|(_, data)| data.clone())
            .ok_or(InstallError::UnexpectedStatus { url, status: 404 })
    }
}
