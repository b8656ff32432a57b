//! GitHub-backed source repository.
//!
//! Each source is a GitHub repository in `owner/name` form that keeps one
//! branch per application id. Retrieval is three kinds of request:
//! - branch lookup to resolve the id to a commit
//! - recursive tree listing of that commit
//! - raw-content download of each selected file

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use super::traits::SourceRepository;
use crate::app_id::AppId;
use crate::install::{InstallError, InstallResult};

/// Default GitHub REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default raw-content base URL.
pub const DEFAULT_RAW_URL: &str = "https://raw.githubusercontent.com";

/// Default timeout for HTTP requests in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for [`GithubRepository`].
#[derive(Debug, Clone)]
pub struct GithubConfig {
    pub api_url: String,
    pub raw_url: String,
    /// Optional token, sent as a bearer credential to raise rate limits.
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            raw_url: DEFAULT_RAW_URL.to_string(),
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl GithubConfig {
    /// Set the API base URL.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set the raw-content base URL.
    pub fn with_raw_url(mut self, url: impl Into<String>) -> Self {
        self.raw_url = url.into();
        self
    }

    /// Set the access token.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    /// Set the HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Blocking GitHub client implementing [`SourceRepository`].
#[derive(Debug)]
pub struct GithubRepository {
    client: Client,
    config: GithubConfig,
}

impl GithubRepository {
    /// Create a client with the given settings.
    pub fn new(config: GithubConfig) -> InstallResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("luadepot/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        if let Some(token) = &config.token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
                .map_err(|e| InstallError::ClientBuild(format!("invalid token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| InstallError::ClientBuild(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Get the active settings.
    pub fn config(&self) -> &GithubConfig {
        &self.config
    }

    /// URL of the branch named after `app_id`.
    pub fn branch_url(&self, source: &str, app_id: AppId) -> String {
        format!(
            "{}/repos/{}/branches/{}",
            self.config.api_url.trim_end_matches('/'),
            source,
            app_id
        )
    }

    /// URL of the recursive tree listing for `commit`.
    pub fn tree_url(&self, source: &str, commit: &str) -> String {
        format!(
            "{}/repos/{}/git/trees/{}?recursive=1",
            self.config.api_url.trim_end_matches('/'),
            source,
            commit
        )
    }

    /// URL of the raw content of `path` at `commit`.
    pub fn raw_url(&self, source: &str, commit: &str, path: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.config.raw_url.trim_end_matches('/'),
            source,
            commit,
            path.trim_start_matches('/')
        )
    }

    fn send(&self, url: &str) -> InstallResult<Response> {
        debug!(url, "GET");
        self.client
            .get(url)
            .send()
            .map_err(|e| InstallError::from_reqwest(url, e, self.config.timeout.as_secs()))
    }

    /// GET a JSON document; a 404 maps to `Ok(None)`.
    fn get_json<T: DeserializeOwned>(&self, url: &str) -> InstallResult<Option<T>> {
        let response = self.send(url)?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(InstallError::UnexpectedStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .map_err(|e| InstallError::MalformedResponse {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|e| InstallError::MalformedResponse {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }
}

impl SourceRepository for GithubRepository {
    fn resolve_branch(&self, source: &str, app_id: AppId) -> InstallResult<Option<String>> {
        let url = self.branch_url(source, app_id);
        Ok(self
            .get_json::<BranchResponse>(&url)?
            .map(|branch| branch.commit.sha))
    }

    fn list_files(&self, source: &str, commit: &str) -> InstallResult<Option<Vec<String>>> {
        let url = self.tree_url(source, commit);
        let Some(tree) = self.get_json::<TreeResponse>(&url)? else {
            return Ok(None);
        };
        if tree.truncated {
            warn!(source, commit, "Tree listing truncated by the API, some files may be missing");
        }
        Ok(Some(tree.blob_paths()))
    }

    fn fetch_file(&self, source: &str, commit: &str, path: &str) -> InstallResult<Vec<u8>> {
        let url = self.raw_url(source, commit, path);
        let response = self.send(&url)?;

        let status = response.status();
        if !status.is_success() {
            return Err(InstallError::UnexpectedStatus {
                url,
                status: status.as_u16(),
            });
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| InstallError::MalformedResponse {
                url,
                reason: e.to_string(),
            })
    }
}

#[derive(Debug, Deserialize)]
struct BranchResponse {
    commit: CommitRef,
}

#[derive(Debug, Deserialize)]
struct CommitRef {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type", default)]
    kind: String,
}

impl TreeResponse {
    /// Paths of file entries (directories and submodules are skipped).
    fn blob_paths(self) -> Vec<String> {
        self.tree
            .into_iter()
            .filter(|entry| entry.kind == "blob")
            .map(|entry| entry.path)
            .collect()
    }
}
