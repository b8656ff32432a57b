//! Installation coordinator.
//!
//! Accepts install requests, records the initial `queued` state and runs the
//! fallback sequencer on a dedicated background thread. Callers observe the
//! outcome only by polling [`InstallCoordinator::query_status`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use tracing::{error, info, warn};

use super::error::InstallError;
use super::sequencer::{FallbackSequencer, SequenceOutcome};
use crate::app_id::{AppId, InvalidAppId};
use crate::endpoints::EndpointProvider;
use crate::progress::{ProgressRecord, ProgressStore, ProgressUpdate};

/// Front door for install requests.
pub struct InstallCoordinator {
    progress: Arc<ProgressStore>,
    sequencer: Arc<FallbackSequencer>,
    endpoints: Arc<dyn EndpointProvider>,
}

impl InstallCoordinator {
    /// Create a coordinator.
    ///
    /// `progress` must be the same store the sequencer's client reports into.
    pub fn new(
        progress: Arc<ProgressStore>,
        sequencer: FallbackSequencer,
        endpoints: Arc<dyn EndpointProvider>,
    ) -> Self {
        Self {
            progress,
            sequencer: Arc::new(sequencer),
            endpoints,
        }
    }

    /// Get the shared progress store.
    pub fn progress(&self) -> &Arc<ProgressStore> {
        &self.progress
    }

    /// Validate raw input and request an install.
    ///
    /// Invalid input is rejected before any progress record is touched.
    pub fn request_install_str(&self, input: &str) -> Result<AppId, InvalidAppId> {
        let app_id: AppId = input.parse()?;
        self.request_install(app_id);
        Ok(app_id)
    }

    /// Request an install and return immediately.
    ///
    /// The record reads `queued` by the time this returns. A request for an
    /// id that is already installing starts a second, independent run.
    pub fn request_install(&self, app_id: AppId) {
        self.progress.reset(app_id, ProgressRecord::queued());
        info!(%app_id, "Install queued");

        let progress = Arc::clone(&self.progress);
        let sequencer = Arc::clone(&self.sequencer);
        let endpoints = Arc::clone(&self.endpoints);

        let spawned = thread::Builder::new()
            .name(format!("install-{}", app_id))
            .spawn(move || run_install(app_id, &progress, &sequencer, endpoints.as_ref()));

        if let Err(e) = spawned {
            error!(%app_id, error = %e, "Failed to start install task");
            self.progress.update(
                app_id,
                ProgressUpdate::failed(format!("failed to start install task: {}", e)),
            );
        }
    }

    /// Snapshot of the current record; a default record if none exists.
    pub fn query_status(&self, app_id: AppId) -> ProgressRecord {
        self.progress.snapshot(app_id)
    }
}

/// Body of the background task. Never lets a fault escape unrecorded.
fn run_install(
    app_id: AppId,
    progress: &ProgressStore,
    sequencer: &FallbackSequencer,
    endpoints: &dyn EndpointProvider,
) {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let sources = endpoints.download_endpoints();
        sequencer.run(app_id, &sources)
    }));

    match result {
        Ok(Ok(SequenceOutcome::Installed { repository, assets })) => {
            info!(%app_id, repository, files = assets.len(), "Install finished");
        }
        Ok(Ok(SequenceOutcome::Exhausted)) => {
            warn!(%app_id, "Install finished without a matching repository");
        }
        Ok(Err(e)) => {
            error!(%app_id, error = %e, "Install failed");
            progress.update(
                app_id,
                ProgressUpdate::failed(format!("install task failed: {}", e)),
            );
        }
        Err(payload) => {
            let fault = InstallError::TaskPanicked(panic_message(payload.as_ref()));
            error!(%app_id, error = %fault, "Install task crashed");
            progress.update(app_id, ProgressUpdate::failed(fault.to_string()));
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::install::InstallResult;
    use crate::progress::InstallStatus;
    use crate::source::{FetchOutcome, InstalledAssets, SourceClient};
    use crate::StaticEndpoints;
    use std::time::{Duration, Instant};

    struct FixedClient(fn(&str) -> InstallResult<FetchOutcome>);

    impl SourceClient for FixedClient {
        fn probe_and_fetch(&self, _app_id: AppId, source: &str) -> InstallResult<FetchOutcome> {
            (self.0)(source)
        }
    }

    fn coordinator(
        client: fn(&str) -> InstallResult<FetchOutcome>,
        sources: &[&str],
    ) -> InstallCoordinator {
        let progress = Arc::new(ProgressStore::new());
        let sequencer =
            FallbackSequencer::new(Arc::new(FixedClient(client)), Arc::clone(&progress));
        let endpoints = Arc::new(StaticEndpoints::new(sources.iter().copied()));
        InstallCoordinator::new(progress, sequencer, endpoints)
    }

    fn wait_terminal(coordinator: &InstallCoordinator, app_id: AppId) -> ProgressRecord {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let record = coordinator.query_status(app_id);
            if record.is_terminal() {
                return record;
            }
            assert!(Instant::now() < deadline, "install did not finish: {:?}", record);
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_invalid_input_is_rejected_without_record() {
        let coordinator = coordinator(|_| Ok(FetchOutcome::NotFound), &["a"]);

        assert!(coordinator.request_install_str("12x").is_err());
        assert!(coordinator.request_install_str("").is_err());
        assert!(coordinator.progress().is_empty());
    }

    #[test]
    fn test_unknown_id_has_default_record() {
        let coordinator = coordinator(|_| Ok(FetchOutcome::NotFound), &[]);
        let record = coordinator.query_status(AppId::new(42));
        assert_eq!(record, ProgressRecord::default());
    }

    #[test]
    fn test_successful_install_reaches_done() {
        let coordinator = coordinator(
            |source| {
                if source == "c" {
                    Ok(FetchOutcome::Installed(InstalledAssets::default()))
                } else {
                    Ok(FetchOutcome::NotFound)
                }
            },
            &["a", "b", "c"],
        );
        let id = coordinator.request_install_str(" 70 ").unwrap();
        assert_eq!(id, AppId::new(70));

        let record = wait_terminal(&coordinator, id);
        assert_eq!(record.status, Some(InstallStatus::Done));
        assert_eq!(record.current_repository.as_deref(), Some("c"));
    }

    #[test]
    fn test_escalated_error_is_recorded() {
        let coordinator = coordinator(
            |source| {
                Err(InstallError::UnexpectedStatus {
                    url: source.to_string(),
                    status: 500,
                })
            },
            &["a", "b"],
        );
        coordinator.request_install(AppId::new(3));

        let record = wait_terminal(&coordinator, AppId::new(3));
        assert_eq!(record.status, Some(InstallStatus::Failed));
        assert!(record.error.unwrap().contains("all repositories failed"));
    }

    #[test]
    fn test_panic_is_caught_and_recorded() {
        let coordinator = coordinator(|_| panic!("boom"), &["a"]);
        coordinator.request_install(AppId::new(4));

        let record = wait_terminal(&coordinator, AppId::new(4));
        assert_eq!(record.status, Some(InstallStatus::Failed));
        assert!(record.error.unwrap().contains("boom"));
    }

    #[test]
    fn test_panic_message_extraction() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42u8), "unknown panic");
    }
}
