//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code.

use std::fmt;

use crate::broker::BrokerError;
use crate::config::ConfigError;
use crate::ingest::IngestError;
use crate::store::UploadError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Environment configuration missing or invalid
    ConfigError,
    /// Reject log could not be opened
    IoError,
    /// Broker or store unreachable, or runtime setup failed
    BootFailed,
    /// Ingest loop stopped with an error
    IngestFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "PIPELINE_CLI_CONFIG_ERROR",
            Self::IoError => "PIPELINE_CLI_IO_ERROR",
            Self::BootFailed => "PIPELINE_CLI_BOOT_FAILED",
            Self::IngestFailed => "PIPELINE_CLI_INGEST_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Boot failed
    pub fn boot_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::BootFailed, msg)
    }

    /// Ingest failed
    pub fn ingest_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IngestFailed, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

impl From<BrokerError> for CliError {
    fn from(e: BrokerError) -> Self {
        if e.is_fatal() {
            Self::boot_failed(e.to_string())
        } else {
            Self::ingest_failed(e.to_string())
        }
    }
}

impl From<UploadError> for CliError {
    fn from(e: UploadError) -> Self {
        if e.is_connection_failure() {
            Self::boot_failed(e.to_string())
        } else {
            Self::ingest_failed(e.to_string())
        }
    }
}

impl From<IngestError> for CliError {
    fn from(e: IngestError) -> Self {
        Self::ingest_failed(e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
