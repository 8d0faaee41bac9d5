//! Broker error types

use thiserror::Error;

/// Result type for broker operations
pub type BrokerResult<T> = Result<T, BrokerError>;

/// Broker errors
#[derive(Debug, Clone, Error)]
pub enum BrokerError {
    #[error("Broker connection failed: {0}")]
    Connect(String),

    #[error("Subscription to '{topic}' failed: {reason}")]
    Subscribe { topic: String, reason: String },

    #[error("Poll failed: {0}")]
    Poll(String),
}

impl BrokerError {
    /// Returns true if the error stops the ingest loop from starting.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, BrokerError::Poll(_))
    }
}
