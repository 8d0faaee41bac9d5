//! Store error types

use thiserror::Error;

/// Result type for store operations
pub type UploadResult<T> = Result<T, UploadError>;

/// Store errors
#[derive(Debug, Clone, Error)]
pub enum UploadError {
    #[error("Store connection failed: {0}")]
    Connect(String),

    #[error("Insert into {table} failed: {reason}")]
    Insert { table: String, reason: String },

    #[error("Commit on {table} failed: {reason}")]
    Commit { table: String, reason: String },
}

impl UploadError {
    /// Returns true if the store could not be reached at all.
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, UploadError::Connect(_))
    }
}
