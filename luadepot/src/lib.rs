//! luadepot - per-application script and manifest installer
//!
//! Fetches script (`.lua`) and depot manifest (`.manifest`) files for an
//! application id from an ordered list of source repositories, installs them
//! into the host's plugin directory and depot cache, and removes them again.
//!
//! # Modules
//!
//! - [`install`] - background install coordination, source fallback, removal
//! - [`source`] - remote repository access and per-source fetch
//! - [`progress`] - pollable per-id install progress
//! - [`ledger`] - persisted record of installed manifests
//! - [`api`] - boundary operations and the JSON-lines dispatcher
//! - [`config`] - INI configuration file

pub mod api;
pub mod app_id;
pub mod config;
pub mod endpoints;
pub mod host;
pub mod install;
pub mod inventory;
pub mod ledger;
pub mod logging;
pub mod paths;
pub mod progress;
pub mod source;

#[cfg(test)]
mod testing;

pub use app_id::{AppId, InvalidAppId};
pub use endpoints::{EndpointProvider, StaticEndpoints};
pub use paths::{InstallTargets, PathProvider, StaticPaths};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
