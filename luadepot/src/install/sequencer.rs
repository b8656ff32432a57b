//! Ordered source fallback.

use std::sync::Arc;

use tracing::{error, info};

use super::error::{InstallError, InstallResult};
use crate::app_id::AppId;
use crate::progress::{InstallStatus, ProgressStore, ProgressUpdate};
use crate::source::{FetchOutcome, InstalledAssets, SourceClient};

/// Failure message recorded when no source carries the identifier.
pub const NOT_AVAILABLE_MESSAGE: &str = "Not currently available from any repository";

/// Result of running the fallback over every source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceOutcome {
    /// A source installed the identifier.
    Installed {
        repository: String,
        assets: InstalledAssets,
    },
    /// Every source reported not found (or there were no sources).
    Exhausted,
}

/// Tries sources in order until one installs the identifier.
pub struct FallbackSequencer {
    client: Arc<dyn SourceClient>,
    progress: Arc<ProgressStore>,
}

impl FallbackSequencer {
    pub fn new(client: Arc<dyn SourceClient>, progress: Arc<ProgressStore>) -> Self {
        Self { client, progress }
    }

    /// Run the fallback for `app_id` over `sources`.
    ///
    /// Not-found results and errors on non-final sources move on to the next
    /// source. An error on the final source is recorded as a combined failure
    /// and returned. Exhausting the list is a normal negative result: the
    /// record is marked failed and `Ok(Exhausted)` is returned.
    pub fn run(&self, app_id: AppId, sources: &[String]) -> InstallResult<SequenceOutcome> {
        let last_index = sources.len().saturating_sub(1);
        let mut tried = Vec::with_capacity(sources.len());

        for (index, source) in sources.iter().enumerate() {
            tried.push(source.clone());
            self.progress.update(
                app_id,
                ProgressUpdate::status(InstallStatus::Checking).with_repository(source.as_str()),
            );
            info!(%app_id, source, attempt = index + 1, of = sources.len(), "Checking repository");

            match self.client.probe_and_fetch(app_id, source) {
                Ok(FetchOutcome::Installed(assets)) => {
                    self.progress.update(
                        app_id,
                        ProgressUpdate::status(InstallStatus::Done)
                            .with_repository(source.as_str())
                            .clearing_error(),
                    );
                    return Ok(SequenceOutcome::Installed {
                        repository: source.clone(),
                        assets,
                    });
                }
                Ok(FetchOutcome::NotFound) => {
                    info!(%app_id, source, "Not found in repository");
                }
                Err(e) if index == last_index => {
                    error!(%app_id, source, error = %e, "Last repository failed");
                    let combined = InstallError::AllSourcesFailed {
                        tried,
                        last: Box::new(e),
                    };
                    self.progress
                        .update(app_id, ProgressUpdate::failed(combined.to_string()));
                    return Err(combined);
                }
                Err(e) => {
                    error!(%app_id, source, error = %e, "Repository failed, trying next");
                }
            }
        }

        info!(%app_id, sources = sources.len(), "No repository carries this app");
        self.progress
            .update(app_id, ProgressUpdate::failed(NOT_AVAILABLE_MESSAGE));
        Ok(SequenceOutcome::Exhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// Client that returns a scripted result per source and records calls.
    #[derive(Default)]
    struct ScriptedClient {
        results: HashMap<String, Result<FetchOutcome, u16>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        fn with(mut self, source: &str, result: Result<FetchOutcome, u16>) -> Self {
            self.results.insert(source.to_string(), result);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }
    }

    impl SourceClient for ScriptedClient {
        fn probe_and_fetch(&self, _app_id: AppId, source: &str) -> InstallResult<FetchOutcome> {
            self.calls.lock().push(source.to_string());
            match self.results.get(source) {
                Some(Ok(outcome)) => Ok(outcome.clone()),
                Some(Err(status)) => Err(InstallError::UnexpectedStatus {
                    url: format!("https://example.com/{}", source),
                    status: *status,
                }),
                None => Ok(FetchOutcome::NotFound),
            }
        }
    }

    fn installed() -> FetchOutcome {
        FetchOutcome::Installed(InstalledAssets {
            scripts: vec!["1.lua".to_string()],
            manifests: vec![],
        })
    }

    fn sources(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn run(
        client: Arc<ScriptedClient>,
        names: &[&str],
    ) -> (InstallResult<SequenceOutcome>, Arc<ProgressStore>) {
        let progress = Arc::new(ProgressStore::new());
        let sequencer = FallbackSequencer::new(client, Arc::clone(&progress));
        let result = sequencer.run(AppId::new(1), &sources(names));
        (result, progress)
    }

    #[test]
    fn test_stops_at_first_install() {
        let client = Arc::new(
            ScriptedClient::default()
                .with("b", Ok(installed()))
                .with("c", Ok(installed())),
        );
        let (result, progress) = run(Arc::clone(&client), &["a", "b", "c"]);

        match result.unwrap() {
            SequenceOutcome::Installed { repository, .. } => assert_eq!(repository, "b"),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(client.calls(), vec!["a", "b"]);
        let record = progress.snapshot(AppId::new(1));
        assert_eq!(record.status, Some(InstallStatus::Done));
        assert_eq!(record.current_repository.as_deref(), Some("b"));
    }

    #[test]
    fn test_error_on_non_final_source_continues() {
        let client = Arc::new(
            ScriptedClient::default()
                .with("a", Err(502))
                .with("b", Ok(installed())),
        );
        let (result, progress) = run(Arc::clone(&client), &["a", "b"]);

        assert!(matches!(result, Ok(SequenceOutcome::Installed { .. })));
        assert_eq!(client.calls(), vec!["a", "b"]);
        // Done clears the error left by the failing source
        assert!(progress.snapshot(AppId::new(1)).error.is_none());
    }

    #[test]
    fn test_error_on_last_source_escalates() {
        let client = Arc::new(ScriptedClient::default().with("c", Err(503)));
        let (result, progress) = run(client, &["a", "b", "c"]);

        let err = result.unwrap_err();
        match &err {
            InstallError::AllSourcesFailed { tried, .. } => assert_eq!(tried, &["a", "b", "c"]),
            other => panic!("unexpected error: {:?}", other),
        }

        let record = progress.snapshot(AppId::new(1));
        assert_eq!(record.status, Some(InstallStatus::Failed));
        let message = record.error.unwrap();
        assert!(message.contains("all repositories failed"));
        assert!(message.contains("503"));
    }

    #[test]
    fn test_all_not_found_is_exhausted() {
        let client = Arc::new(ScriptedClient::default());
        let (result, progress) = run(Arc::clone(&client), &["a", "b"]);

        assert_eq!(result.unwrap(), SequenceOutcome::Exhausted);
        assert_eq!(client.calls().len(), 2);
        let record = progress.snapshot(AppId::new(1));
        assert_eq!(record.status, Some(InstallStatus::Failed));
        assert_eq!(record.error.as_deref(), Some(NOT_AVAILABLE_MESSAGE));
    }

    #[test]
    fn test_empty_source_list_is_exhausted() {
        let client = Arc::new(ScriptedClient::default());
        let (result, progress) = run(Arc::clone(&client), &[]);

        assert_eq!(result.unwrap(), SequenceOutcome::Exhausted);
        assert!(client.calls().is_empty());
        assert_eq!(
            progress.snapshot(AppId::new(1)).error.as_deref(),
            Some(NOT_AVAILABLE_MESSAGE)
        );
    }

    #[test]
    fn test_error_then_not_found_is_exhausted() {
        let client = Arc::new(ScriptedClient::default().with("a", Err(500)));
        let (result, progress) = run(client, &["a", "b"]);

        assert_eq!(result.unwrap(), SequenceOutcome::Exhausted);
        assert_eq!(
            progress.snapshot(AppId::new(1)).error.as_deref(),
            Some(NOT_AVAILABLE_MESSAGE)
        );
    }
}
