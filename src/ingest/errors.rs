//! Ingest loop error types

use thiserror::Error;

use crate::broker::BrokerError;

use super::state::IngestState;

/// Result type for ingest operations
pub type IngestResult<T> = Result<T, IngestError>;

/// Errors that stop the ingest loop.
///
/// Per-message problems (decode, validation, upload) never surface here;
/// they are logged and counted instead.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Ingest loop could not subscribe: {0}")]
    Subscribe(#[source] BrokerError),

    #[error("Illegal ingest state transition {from} -> {to}")]
    InvalidTransition { from: IngestState, to: IngestState },
}
