//! Observable pipeline events
//!
//! Events are explicit and typed; their string forms are the `event`
//! values in the JSON log.

use std::fmt;

/// Observable events in the ingest pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Process startup begins
    PipelineStart,
    /// Configuration loaded from the environment
    ConfigLoaded,
    /// Broker connection established
    BrokerConnected,
    /// Store connection established
    StoreConnected,
    /// Startup failed (FATAL)
    StartupFailed,
    /// Topic subscription active
    Subscribed,
    /// Polling loop entered
    Running,
    /// Stop requested
    ShutdownStart,
    /// Loop stopped, broker released
    ShutdownComplete,

    // Per-message
    /// Payload could not be decoded
    DecodeFailed,
    /// Message failed validation
    MessageRejected,
    /// Broker poll returned an error
    PollFailed,

    // Flush
    /// One destination table written
    UploadComplete,
    /// One destination table rejected its rows
    UploadFailed,
    /// Partial batch dropped at shutdown
    BatchDiscarded,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::PipelineStart => "PIPELINE_STARTUP_BEGIN",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::BrokerConnected => "BROKER_CONNECTED",
            Event::StoreConnected => "STORE_CONNECTED",
            Event::StartupFailed => "PIPELINE_STARTUP_FAILED",
            Event::Subscribed => "TOPIC_SUBSCRIBED",
            Event::Running => "PIPELINE_RUNNING",
            Event::ShutdownStart => "SHUTDOWN_START",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",
            Event::DecodeFailed => "DECODE_FAILED",
            Event::MessageRejected => "MESSAGE_REJECTED",
            Event::PollFailed => "POLL_FAILED",
            Event::UploadComplete => "UPLOAD_COMPLETE",
            Event::UploadFailed => "UPLOAD_FAILED",
            Event::BatchDiscarded => "BATCH_DISCARDED",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::StartupFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
