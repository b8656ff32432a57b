//! Install pipeline: fallback over sources, background coordination and
//! removal.
//!
//! # Flow
//!
//! ```text
//! request_install(id)
//!   └─ progress: queued ─▶ background thread
//!        └─ FallbackSequencer: for each source
//!             ├─ progress: checking
//!             └─ SourceClient::probe_and_fetch
//!                  ├─ NotFound  ─▶ next source
//!                  ├─ Installed ─▶ progress: done
//!                  └─ Err       ─▶ next source, or failed if last
//! ```

mod coordinator;
mod error;
pub(crate) mod placement;
mod removal;
mod sequencer;

pub use coordinator::InstallCoordinator;
pub use error::{InstallError, InstallResult};
pub use removal::{RemovalEngine, RemovalOutcome};
pub use sequencer::{FallbackSequencer, SequenceOutcome, NOT_AVAILABLE_MESSAGE};
