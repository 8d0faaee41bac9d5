//! Ingest subsystem
//!
//! Drives messages from a [`MessageSource`](crate::broker::MessageSource)
//! through validation and batching into a
//! [`BatchUploader`](crate::store::BatchUploader).
//!
//! # Lifecycle
//!
//! 1. `Idle`: constructed with an already connected source and uploader
//! 2. `Subscribed`: topic subscription accepted
//! 3. `Running`: polling with a bounded wait, checking the stop flag after every poll
//! 4. `Draining`: a full batch is being flushed
//! 5. `Stopped`: source closed
//!
//! A failed subscription is the only error [`IngestLoop::run`] returns.

mod errors;
mod pipeline;
mod state;
mod stop;

pub use errors::{IngestError, IngestResult};
pub use pipeline::{IngestConfig, IngestLoop, IngestSummary, DEFAULT_POLL_TIMEOUT};
pub use state::IngestState;
pub use stop::StopHandle;
