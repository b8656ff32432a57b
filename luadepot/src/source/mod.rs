//! Source repositories and the per-source fetch.
//!
//! A source is a remote repository that publishes one branch per
//! application id. [`GithubRepository`] talks to the remote API and
//! [`TreeFetcher`] turns a branch into installed files.

mod asset;
mod fetcher;
mod github;
mod traits;

pub use asset::{select_assets, AssetItem, AssetKind};
pub use fetcher::TreeFetcher;
pub use github::{
    GithubConfig, GithubRepository, DEFAULT_API_URL, DEFAULT_RAW_URL, DEFAULT_TIMEOUT_SECS,
};
pub use traits::{FetchOutcome, InstalledAssets, SourceClient, SourceRepository};
