//! Observability subsystem for the kiosk pipeline
//!
//! - Structured logging (JSON lines)
//! - Pipeline counters
//! - Reject log for dropped messages
//!
//! Observability never fails the ingest loop: log writes are best effort and
//! reject log errors are reported, not propagated.
//!
//! # Usage
//!
//! ```ignore
//! use kiosk_pipeline::observability::{Logger, PipelineMetrics, ObservationScope};
//!
//! Logger::info("PIPELINE_RUNNING", &[("topic", "lmnh")]);
//!
//! let metrics = PipelineMetrics::new();
//! metrics.increment_received();
//!
//! let scope = ObservationScope::new("FLUSH");
//! // ... upload ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod metrics;
mod reject_log;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsSnapshot, PipelineMetrics};
pub use reject_log::{FileRejectLog, MemoryRejectLog, RejectLog, RejectRecord, DEFAULT_REJECT_LOG};
pub use scope::ObservationScope;

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_fatal() {
        Severity::Fatal
    } else {
        Severity::Info
    };
    Logger::log(severity, event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        // This just verifies no panic
        log_event(Event::PipelineStart);
        log_event(Event::ShutdownComplete);
    }

    #[test]
    fn test_log_event_with_fields() {
        log_event_with_fields(Event::Subscribed, &[("topic", "lmnh")]);
    }
}
