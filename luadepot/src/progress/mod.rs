//! Live install progress, polled by callers.
//!
//! - [`ProgressRecord`] - snapshot returned to callers
//! - [`ProgressUpdate`] - partial overlay applied by the install task
//! - [`ProgressStore`] - lock-guarded map from identifier to record

mod record;
mod store;

pub use record::{InstallStatus, ProgressRecord, ProgressUpdate};
pub use store::ProgressStore;
