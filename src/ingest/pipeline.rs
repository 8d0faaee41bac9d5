//! The ingest loop
//!
//! Poll, decode, validate, accumulate, flush. Single task, no overlap
//! between polling and flushing; the accumulator never exceeds its
//! configured size.

use std::time::Duration;

use crate::batch::{Accumulator, BatchConfig};
use crate::broker::MessageSource;
use crate::message::decode;
use crate::observability::{
    log_event_with_fields, Event, Logger, MetricsSnapshot, ObservationScope, PipelineMetrics,
    RejectLog, RejectRecord,
};
use crate::routing::classify_and_split;
use crate::store::{BatchUploader, StoreRow, TableSpec, ASSISTANCE_TABLE, VOTE_TABLE};
use crate::validation::{MessageValidator, ValidationOutcome, ValidationReport};

use super::errors::{IngestError, IngestResult};
use super::state::IngestState;
use super::stop::StopHandle;

/// Default bounded wait for one poll.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(1);

/// Ingest loop settings.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub topic: String,
    pub poll_timeout: Duration,
    pub batch: BatchConfig,
}

impl IngestConfig {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            batch: BatchConfig::default(),
        }
    }
}

/// What the loop did before it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    pub metrics: MetricsSnapshot,
    /// Accepted messages still pending at stop and not flushed
    pub discarded: usize,
}

/// Owns the broker source and the uploader for its whole lifetime.
pub struct IngestLoop<S: MessageSource, U: BatchUploader> {
    source: S,
    uploader: U,
    validator: MessageValidator,
    accumulator: Accumulator,
    reject_log: Option<Box<dyn RejectLog>>,
    metrics: PipelineMetrics,
    state: IngestState,
    stop: StopHandle,
    topic: String,
    poll_timeout: Duration,
}

impl<S: MessageSource, U: BatchUploader> IngestLoop<S, U> {
    pub fn new(source: S, uploader: U, config: IngestConfig) -> Self {
        Self {
            source,
            uploader,
            validator: MessageValidator::default(),
            accumulator: Accumulator::new(config.batch),
            reject_log: None,
            metrics: PipelineMetrics::new(),
            state: IngestState::Idle,
            stop: StopHandle::new(),
            topic: config.topic,
            poll_timeout: config.poll_timeout,
        }
    }

    /// Record rejected and undecodable messages to `log`.
    pub fn with_reject_log(mut self, log: Box<dyn RejectLog>) -> Self {
        self.reject_log = Some(log);
        self
    }

    pub fn with_validator(mut self, validator: MessageValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Use an existing stop flag instead of a fresh one.
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    /// A handle that stops this loop at its next check.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn state(&self) -> IngestState {
        self.state
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn uploader(&self) -> &U {
        &self.uploader
    }

    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Give back the source and uploader, e.g. to close the store cleanly.
    pub fn into_parts(self) -> (S, U) {
        (self.source, self.uploader)
    }

    /// Run until a stop is requested.
    ///
    /// Returns an error only if the subscription fails. The source is
    /// closed before this returns, whatever the outcome.
    pub async fn run(&mut self) -> IngestResult<IngestSummary> {
        let outcome = self.run_until_stopped().await;

        self.source.close();
        self.state = IngestState::Stopped;

        let snapshot = self.metrics.snapshot();
        let fields = snapshot.to_fields();
        let field_refs: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
        log_event_with_fields(Event::ShutdownComplete, &field_refs);

        outcome.map(|discarded| IngestSummary {
            metrics: snapshot,
            discarded,
        })
    }

    async fn run_until_stopped(&mut self) -> IngestResult<usize> {
        if let Err(e) = self.source.subscribe(&self.topic) {
            Logger::fatal(
                Event::StartupFailed.as_str(),
                &[("topic", &self.topic), ("reason", &e.to_string())],
            );
            return Err(IngestError::Subscribe(e));
        }
        self.transition(IngestState::Subscribed)?;
        log_event_with_fields(Event::Subscribed, &[("topic", &self.topic)]);

        self.transition(IngestState::Running)?;
        let batch_size = self.accumulator.config().max_records.to_string();
        log_event_with_fields(Event::Running, &[("batch_size", &batch_size)]);

        while !self.stop.is_stop_requested() {
            match self.source.poll(self.poll_timeout).await {
                Ok(None) => continue,
                Ok(Some(payload)) => {
                    if self.accept(&payload) {
                        self.transition(IngestState::Draining)?;
                        self.flush().await;
                        self.transition(IngestState::Running)?;
                    }
                }
                Err(e) => {
                    self.metrics.increment_poll_errors();
                    Logger::warn(Event::PollFailed.as_str(), &[("reason", &e.to_string())]);
                    // A failing broker may return at once; wait out the poll window.
                    tokio::time::sleep(self.poll_timeout).await;
                }
            }
        }

        log_event_with_fields(Event::ShutdownStart, &[("pending", &self.accumulator.len().to_string())]);
        self.drain_on_stop().await
    }

    /// Decode and validate one payload. Returns true when the batch is full.
    fn accept(&mut self, payload: &[u8]) -> bool {
        self.metrics.increment_received();

        let message = match decode(payload) {
            Ok(message) => message,
            Err(e) => {
                self.metrics.increment_decode_failures();
                let reason = e.to_string();
                Logger::warn(Event::DecodeFailed.as_str(), &[("reason", &reason)]);
                self.record_reject(&reason, payload);
                return false;
            }
        };

        match self.validator.check(message) {
            ValidationOutcome::Valid(valid) => {
                self.metrics.increment_accepted();
                self.accumulator.push(valid)
            }
            ValidationOutcome::Invalid { message, violations } => {
                self.metrics.increment_rejected();
                let report = ValidationReport::new(&violations).to_string();
                Logger::warn(
                    Event::MessageRejected.as_str(),
                    &[("report", &report), ("payload", &message.to_json_string())],
                );
                self.record_reject(&report, payload);
                false
            }
        }
    }

    fn record_reject(&self, report: &str, payload: &[u8]) {
        let Some(log) = &self.reject_log else {
            return;
        };
        if let Err(e) = log.append(&RejectRecord::from_bytes(report, payload)) {
            Logger::error("REJECT_LOG_WRITE_FAILED", &[("reason", &e.to_string())]);
        }
    }

    /// Route the pending batch and upload it, one call per table.
    ///
    /// The accumulator is empty afterwards whatever the upload outcome.
    async fn flush(&mut self) {
        let messages = self.accumulator.drain();
        let routed = classify_and_split(&messages);
        let votes: Vec<StoreRow> = routed.votes.iter().map(StoreRow::from).collect();
        let assistance: Vec<StoreRow> = routed.assistance.iter().map(StoreRow::from).collect();

        let scope = ObservationScope::with_fields("FLUSH", &[("rows", &messages.len().to_string())]);
        self.metrics.increment_flushes();

        let mut committed = 0;
        let mut failures = Vec::new();
        for (table, rows) in [(&VOTE_TABLE, &votes), (&ASSISTANCE_TABLE, &assistance)] {
            match self.upload(table, rows).await {
                Ok(count) => committed += count,
                Err(reason) => failures.push(reason),
            }
        }

        if failures.is_empty() {
            scope.complete_with_fields(&[("uploaded", &committed.to_string())]);
        } else {
            scope.fail(&failures.join("; "));
        }
    }

    async fn upload(&mut self, table: &TableSpec, rows: &[StoreRow]) -> Result<u64, String> {
        let count = rows.len().to_string();
        match self.uploader.upload(table, rows).await {
            Ok(uploaded) => {
                self.metrics.add_rows_uploaded(uploaded);
                Logger::info(
                    Event::UploadComplete.as_str(),
                    &[("table", table.name), ("rows", &uploaded.to_string())],
                );
                Ok(uploaded)
            }
            Err(e) => {
                let reason = e.to_string();
                self.metrics.increment_upload_failures();
                self.metrics.add_rows_dropped(rows.len() as u64);
                Logger::error(
                    Event::UploadFailed.as_str(),
                    &[("table", table.name), ("rows", &count), ("reason", &reason)],
                );
                Err(reason)
            }
        }
    }

    /// Returns the number of pending messages dropped.
    async fn drain_on_stop(&mut self) -> IngestResult<usize> {
        if self.accumulator.is_empty() {
            return Ok(0);
        }
        if self.accumulator.config().flush_on_shutdown {
            self.transition(IngestState::Draining)?;
            self.flush().await;
            return Ok(0);
        }

        let discarded = self.accumulator.drain().len();
        self.metrics.add_rows_dropped(discarded as u64);
        Logger::warn(Event::BatchDiscarded.as_str(), &[("rows", &discarded.to_string())]);
        Ok(discarded)
    }

    fn transition(&mut self, next: IngestState) -> IngestResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(IngestError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        Logger::trace("INGEST_STATE", &[("from", self.state.as_str()), ("to", next.as_str())]);
        self.state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::MemorySource;
    use crate::observability::MemoryRejectLog;
    use crate::store::MemoryUploader;
    use serde_json::json;

    const AT: &str = "2024-03-13T12:00:00.000000+00:00";

    fn config(batch_size: usize) -> IngestConfig {
        IngestConfig {
            topic: "lmnh".into(),
            poll_timeout: Duration::from_millis(1),
            batch: BatchConfig::with_size(batch_size),
        }
    }

    fn pipeline(source: MemorySource, batch_size: usize) -> IngestLoop<MemorySource, MemoryUploader> {
        let stop = StopHandle::new();
        let mut source = source;
        source.stop_when_drained(stop.clone());
        IngestLoop::new(source, MemoryUploader::new(), config(batch_size)).with_stop_handle(stop)
    }

    // ==================== Lifecycle Tests ====================

    #[tokio::test]
    async fn test_initial_state_idle() {
        let ingest = pipeline(MemorySource::new(), 20);
        assert_eq!(ingest.state(), IngestState::Idle);
        assert!(ingest.accumulator().is_empty());
    }

    #[tokio::test]
    async fn test_empty_run_stops_and_closes() {
        let mut ingest = pipeline(MemorySource::new(), 20);

        let summary = ingest.run().await.unwrap();

        assert_eq!(ingest.state(), IngestState::Stopped);
        assert!(ingest.source().is_closed());
        assert_eq!(ingest.source().subscribed_topic(), None);
        assert_eq!(ingest.source().last_subscribed_topic(), Some("lmnh"));
        assert!(ingest.source().polls() > 0);
        assert_eq!(summary.discarded, 0);
        assert!(ingest.uploader().calls().is_empty());
    }

    #[tokio::test]
    async fn test_stop_before_run_still_subscribes_and_closes() {
        let mut ingest = pipeline(MemorySource::new(), 20);
        ingest.stop_handle().request_stop();

        ingest.run().await.unwrap();

        assert_eq!(ingest.source().polls(), 0);
        assert!(ingest.source().is_closed());
    }

    // ==================== Flush Tests ====================

    #[tokio::test]
    async fn test_full_batch_flushes_both_tables() {
        let mut source = MemorySource::new();
        source
            .push_json(&json!({"at": AT, "site": "1", "val": 4}))
            .push_json(&json!({"at": AT, "site": "2", "val": -1, "type": 1}));

        let mut ingest = pipeline(source, 2);
        let summary = ingest.run().await.unwrap();

        let calls = ingest.uploader().calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].table, VOTE_TABLE.name);
        assert_eq!(calls[1].table, ASSISTANCE_TABLE.name);
        assert_eq!(calls[0].rows[0].exhibition_id, "EXH_01");
        assert_eq!(calls[1].rows[0].code, 1);
        assert_eq!(summary.metrics.flushes, 1);
        assert_eq!(summary.metrics.rows_uploaded, 2);
        assert!(ingest.accumulator().is_empty());
    }

    #[tokio::test]
    async fn test_partial_batch_discarded_by_default() {
        let mut source = MemorySource::new();
        source.push_json(&json!({"at": AT, "site": "1", "val": 4}));

        let mut ingest = pipeline(source, 20);
        let summary = ingest.run().await.unwrap();

        assert_eq!(summary.discarded, 1);
        assert_eq!(summary.metrics.rows_dropped, 1);
        assert!(ingest.uploader().calls().is_empty());
        assert!(ingest.accumulator().is_empty());
    }

    #[tokio::test]
    async fn test_partial_batch_flushed_when_enabled() {
        let mut source = MemorySource::new();
        source.push_json(&json!({"at": AT, "site": "1", "val": 4}));

        let stop = StopHandle::new();
        source.stop_when_drained(stop.clone());
        let mut cfg = config(20);
        cfg.batch.flush_on_shutdown = true;
        let mut ingest = IngestLoop::new(source, MemoryUploader::new(), cfg).with_stop_handle(stop);

        let summary = ingest.run().await.unwrap();

        assert_eq!(summary.discarded, 0);
        assert_eq!(ingest.uploader().committed_rows(&VOTE_TABLE).len(), 1);
        assert_eq!(ingest.state(), IngestState::Stopped);
    }

    // ==================== Rejection Tests ====================

    #[tokio::test]
    async fn test_invalid_message_logged_and_dropped() {
        let mut source = MemorySource::new();
        source.push_json(&json!({"site": "1", "val": 4}));

        let log = MemoryRejectLog::new();
        let stop = StopHandle::new();
        source.stop_when_drained(stop.clone());
        let mut ingest = IngestLoop::new(source, MemoryUploader::new(), config(20))
            .with_stop_handle(stop)
            .with_reject_log(Box::new(log.clone()));

        let summary = ingest.run().await.unwrap();

        assert_eq!(summary.metrics.messages_rejected, 1);
        assert_eq!(summary.discarded, 0);
        let records = log.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].report, "Invalid: No 'at' key.");
    }

    #[tokio::test]
    async fn test_undecodable_payload_counted() {
        let mut source = MemorySource::new();
        source.push_payload("not json").push_payload("[1, 2]");

        let mut ingest = pipeline(source, 20);
        let summary = ingest.run().await.unwrap();

        assert_eq!(summary.metrics.messages_received, 2);
        assert_eq!(summary.metrics.decode_failures, 2);
        assert_eq!(ingest.state(), IngestState::Stopped);
    }

    #[tokio::test]
    async fn test_poll_error_not_fatal() {
        let mut source = MemorySource::new();
        source
            .push_error("broker went away")
            .push_timeout()
            .push_json(&json!({"at": AT, "site": "3", "val": 2}));

        let mut ingest = pipeline(source, 1);
        let summary = ingest.run().await.unwrap();

        assert_eq!(summary.metrics.poll_errors, 1);
        assert_eq!(summary.metrics.rows_uploaded, 1);
    }

    #[tokio::test]
    async fn test_subscribe_failure_is_fatal() {
        let mut source = MemorySource::new();
        source.fail_subscribe();

        let mut ingest = pipeline(source, 20);
        let err = ingest.run().await.unwrap_err();

        assert!(matches!(err, IngestError::Subscribe(_)));
        assert_eq!(ingest.source().polls(), 0);
        assert_eq!(ingest.source().last_subscribed_topic(), None);
        assert!(ingest.source().is_closed());
        assert_eq!(ingest.state(), IngestState::Stopped);
    }
}
