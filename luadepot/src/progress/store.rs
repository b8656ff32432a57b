//! Shared progress store polled by callers.

use std::collections::HashMap;

use parking_lot::Mutex;

use super::record::{ProgressRecord, ProgressUpdate};
use crate::app_id::AppId;

/// Thread-safe map from identifier to its latest progress record.
///
/// One lock guards the whole map. Every write is a short critical section
/// (overlay a few fields), and readers get an owned clone, so a poller never
/// sees a record halfway through an update.
#[derive(Debug, Default)]
pub struct ProgressStore {
    records: Mutex<HashMap<AppId, ProgressRecord>>,
}

impl ProgressStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the record for `app_id` (used when a new request starts).
    pub fn reset(&self, app_id: AppId, record: ProgressRecord) {
        self.records.lock().insert(app_id, record);
    }

    /// Merge a partial update into the record for `app_id`.
    pub fn update(&self, app_id: AppId, update: ProgressUpdate) {
        self.records.lock().entry(app_id).or_default().apply(update);
    }

    /// Snapshot of the record, or the empty record if none exists.
    pub fn snapshot(&self, app_id: AppId) -> ProgressRecord {
        self.records
            .lock()
            .get(&app_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether a record exists for `app_id`.
    pub fn contains(&self, app_id: AppId) -> bool {
        self.records.lock().contains_key(&app_id)
    }

    /// Number of tracked identifiers.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether no identifier is tracked.
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}
