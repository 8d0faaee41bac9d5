//! Pipeline counters
//!
//! - Counters only, monotonic
//! - Reset only on process start
//! - Relaxed atomics; exact values are read through a snapshot

use std::sync::atomic::{AtomicU64, Ordering};

/// Operational counters for one ingest loop.
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    /// Payloads delivered by the broker
    messages_received: AtomicU64,
    /// Messages that passed validation
    messages_accepted: AtomicU64,
    /// Messages that failed validation
    messages_rejected: AtomicU64,
    /// Payloads that were not JSON objects
    decode_failures: AtomicU64,
    /// Broker poll errors
    poll_errors: AtomicU64,
    /// Flush cycles run
    flushes: AtomicU64,
    /// Rows committed to the store
    rows_uploaded: AtomicU64,
    /// Table uploads that failed
    upload_failures: AtomicU64,
    /// Rows lost to failed uploads or shutdown
    rows_dropped: AtomicU64,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_accepted(&self) {
        self.messages_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rejected(&self) {
        self.messages_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_decode_failures(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_poll_errors(&self) {
        self.poll_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_flushes(&self) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_rows_uploaded(&self, rows: u64) {
        self.rows_uploaded.fetch_add(rows, Ordering::Relaxed);
    }

    pub fn increment_upload_failures(&self) {
        self.upload_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_rows_dropped(&self, rows: u64) {
        self.rows_dropped.fetch_add(rows, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_accepted: self.messages_accepted.load(Ordering::Relaxed),
            messages_rejected: self.messages_rejected.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            poll_errors: self.poll_errors.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
            rows_uploaded: self.rows_uploaded.load(Ordering::Relaxed),
            upload_failures: self.upload_failures.load(Ordering::Relaxed),
            rows_dropped: self.rows_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Immutable copy of the counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub messages_received: u64,
    pub messages_accepted: u64,
    pub messages_rejected: u64,
    pub decode_failures: u64,
    pub poll_errors: u64,
    pub flushes: u64,
    pub rows_uploaded: u64,
    pub upload_failures: u64,
    pub rows_dropped: u64,
}

impl MetricsSnapshot {
    /// Key/value pairs for a log line.
    pub fn to_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("messages_received", self.messages_received.to_string()),
            ("messages_accepted", self.messages_accepted.to_string()),
            ("messages_rejected", self.messages_rejected.to_string()),
            ("decode_failures", self.decode_failures.to_string()),
            ("poll_errors", self.poll_errors.to_string()),
            ("flushes", self.flushes.to_string()),
            ("rows_uploaded", self.rows_uploaded.to_string()),
            ("upload_failures", self.upload_failures.to_string()),
            ("rows_dropped", self.rows_dropped.to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_zero() {
        assert_eq!(PipelineMetrics::new().snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_counters_accumulate() {
        let metrics = PipelineMetrics::new();
        metrics.increment_received();
        metrics.increment_received();
        metrics.increment_accepted();
        metrics.increment_rejected();
        metrics.increment_flushes();
        metrics.add_rows_uploaded(12);
        metrics.add_rows_uploaded(8);
        metrics.increment_upload_failures();
        metrics.add_rows_dropped(3);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.messages_received, 2);
        assert_eq!(snapshot.messages_accepted, 1);
        assert_eq!(snapshot.messages_rejected, 1);
        assert_eq!(snapshot.flushes, 1);
        assert_eq!(snapshot.rows_uploaded, 20);
        assert_eq!(snapshot.upload_failures, 1);
        assert_eq!(snapshot.rows_dropped, 3);
    }

    #[test]
    fn test_snapshot_fields() {
        let metrics = PipelineMetrics::new();
        metrics.increment_decode_failures();

        let fields = metrics.snapshot().to_fields();
        assert_eq!(fields.len(), 9);
        assert!(fields.contains(&("decode_failures", "1".to_string())));
    }
}
