//! Boundary operations exposed to the host runtime.
//!
//! [`Backend`] is built once at start-up and passed by reference to every
//! handler. Each operation returns a [`Reply`], serialized as
//! `{"success": true, ...payload}` or `{"success": false, "error": "..."}`.

pub mod rpc;

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::app_id::AppId;
use crate::config::{ConfigError, ConfigFile};
use crate::endpoints::EndpointProvider;
use crate::host::{CommandRestarter, HostRestarter};
use crate::install::{
    FallbackSequencer, InstallCoordinator, InstallError, RemovalEngine, RemovalOutcome,
};
use crate::inventory::LocalInventory;
use crate::ledger::LedgerStore;
use crate::paths::InstallTargets;
use crate::progress::{ProgressRecord, ProgressStore};
use crate::source::{GithubRepository, SourceRepository, TreeFetcher};

/// Errors building a [`Backend`] from configuration.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Client(#[from] InstallError),
}

/// Response envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply<T> {
    pub success: bool,
    #[serde(flatten)]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Reply<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: impl ToString) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
        }
    }

    /// Error reply that still carries a payload.
    pub fn err_with(data: T, error: impl ToString) -> Self {
        Self {
            success: false,
            data: Some(data),
            error: Some(error.to_string()),
        }
    }
}

/// `install` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallAck {
    pub accepted: bool,
    pub appid: AppId,
}

/// `status` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusPayload {
    pub state: ProgressRecord,
}

/// `remove` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovePayload {
    pub message: String,
    pub removed_files: Vec<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub not_found: bool,
}

/// `list_installed` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppsPayload {
    pub apps: Vec<AppId>,
}

/// `has_installed` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExistsPayload {
    pub exists: bool,
}

/// Payload carrying only a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessagePayload {
    pub message: String,
}

/// Everything the boundary operations need, owned in one place.
pub struct Backend {
    coordinator: InstallCoordinator,
    removal: RemovalEngine,
    inventory: LocalInventory,
    restarter: Arc<dyn HostRestarter>,
}

impl Backend {
    /// Wire the pipeline over `repository`.
    pub fn new<R>(
        repository: R,
        targets: InstallTargets,
        endpoints: Arc<dyn EndpointProvider>,
        restarter: Arc<dyn HostRestarter>,
    ) -> Self
    where
        R: SourceRepository + 'static,
    {
        let progress = Arc::new(ProgressStore::new());
        let ledger = Arc::new(LedgerStore::in_plugin_dir(&targets.plugin_dir));

        let fetcher = TreeFetcher::new(
            repository,
            targets.clone(),
            Arc::clone(&progress),
            Arc::clone(&ledger),
        );
        let sequencer = FallbackSequencer::new(Arc::new(fetcher), Arc::clone(&progress));
        let coordinator = InstallCoordinator::new(progress, sequencer, endpoints);

        Self {
            coordinator,
            removal: RemovalEngine::new(targets.clone(), ledger),
            inventory: LocalInventory::new(targets.plugin_dir),
            restarter,
        }
    }

    /// Build the production backend from the configuration file.
    pub fn from_config(config: &ConfigFile) -> Result<Self, BackendError> {
        let paths = config.paths()?;
        let targets = InstallTargets::from_provider(&paths);
        let repository = GithubRepository::new(config.github())?;
        let restarter = CommandRestarter::new(config.host.restart_command.clone());

        info!(
            plugin_dir = %targets.plugin_dir.display(),
            depot_cache = %targets.depot_cache_dir.display(),
            repositories = config.sources.repositories.len(),
            "Backend ready"
        );

        Ok(Self::new(
            repository,
            targets,
            Arc::new(config.endpoints()),
            Arc::new(restarter),
        ))
    }

    /// Get the install coordinator.
    pub fn coordinator(&self) -> &InstallCoordinator {
        &self.coordinator
    }

    /// Start a background install.
    pub fn install(&self, app_id: AppId) -> Reply<InstallAck> {
        self.coordinator.request_install(app_id);
        Reply::ok(InstallAck {
            accepted: true,
            appid: app_id,
        })
    }

    /// Current progress for `app_id`.
    pub fn status(&self, app_id: AppId) -> Reply<StatusPayload> {
        Reply::ok(StatusPayload {
            state: self.coordinator.query_status(app_id),
        })
    }

    /// Delete everything installed for `app_id`.
    pub fn remove(&self, app_id: AppId) -> Reply<RemovePayload> {
        match self.removal.remove(app_id) {
            Ok(RemovalOutcome::Removed(files)) => Reply::ok(RemovePayload {
                message: format!("Removed {} files", files.len()),
                removed_files: files,
                not_found: false,
            }),
            Ok(RemovalOutcome::NothingFound) => Reply::ok(RemovePayload {
                message: format!("No files found for app {}", app_id),
                removed_files: Vec::new(),
                not_found: true,
            }),
            Err(InstallError::RemovalIncomplete { removed, first }) => {
                error!(%app_id, removed = removed.len(), error = %first, "Removal incomplete");
                Reply::err_with(
                    RemovePayload {
                        message: format!("Removed {} files before failing", removed.len()),
                        removed_files: removed,
                        not_found: false,
                    },
                    first,
                )
            }
            Err(e) => {
                error!(%app_id, error = %e, "Removal failed");
                Reply::err(e)
            }
        }
    }

    /// Ids with an enabled script in the plugin directory.
    pub fn list_installed(&self) -> Reply<AppsPayload> {
        match self.inventory.list_installed() {
            Ok(apps) => Reply::ok(AppsPayload { apps }),
            Err(e) => {
                error!(error = %e, "Failed to list installed apps");
                Reply::err(e)
            }
        }
    }

    /// Whether a script exists for `app_id`.
    pub fn has_installed(&self, app_id: AppId) -> Reply<ExistsPayload> {
        Reply::ok(ExistsPayload {
            exists: self.inventory.has_installed(app_id),
        })
    }

    /// Restart the host application.
    pub fn restart_host(&self) -> Reply<MessagePayload> {
        match self.restarter.restart() {
            Ok(()) => Reply::ok(MessagePayload {
                message: "Host restart started".to_string(),
            }),
            Err(e) => {
                error!(error = %e, "Host restart failed");
                Reply::err(e)
            }
        }
    }

    /// Record a message from the front end.
    pub fn log(&self, message: &str) -> Reply<MessagePayload> {
        info!(target: "frontend", "{}", message);
        Reply::ok(MessagePayload {
            message: "logged".to_string(),
        })
    }
}
