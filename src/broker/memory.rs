//! Scripted in-memory message source

use std::collections::VecDeque;
use std::time::Duration;

use serde_json::Value;

use crate::ingest::StopHandle;

use super::errors::{BrokerError, BrokerResult};
use super::MessageSource;

/// One scripted poll result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Payload(Vec<u8>),
    Timeout,
    Error(String),
}

/// In-memory message source for testing.
///
/// Replays a script of deliveries, one per poll. Once the script is
/// exhausted every poll times out, and the attached [`StopHandle`] (if
/// any) is asked to stop the loop.
#[derive(Debug, Default)]
pub struct MemorySource {
    script: VecDeque<Delivery>,
    subscribed: Option<String>,
    last_subscribed: Option<String>,
    fail_subscribe: bool,
    closed: bool,
    polls: usize,
    stop_when_drained: Option<StopHandle>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw payload.
    pub fn push_payload(&mut self, payload: impl Into<Vec<u8>>) -> &mut Self {
        self.script.push_back(Delivery::Payload(payload.into()));
        self
    }

    /// Queue a JSON message.
    pub fn push_json(&mut self, value: &Value) -> &mut Self {
        self.push_payload(value.to_string())
    }

    /// Queue an empty poll.
    pub fn push_timeout(&mut self) -> &mut Self {
        self.script.push_back(Delivery::Timeout);
        self
    }

    /// Queue a poll error.
    pub fn push_error(&mut self, reason: impl Into<String>) -> &mut Self {
        self.script.push_back(Delivery::Error(reason.into()));
        self
    }

    /// Refuse subscriptions.
    pub fn fail_subscribe(&mut self) -> &mut Self {
        self.fail_subscribe = true;
        self
    }

    /// Request a stop once the script runs out.
    pub fn stop_when_drained(&mut self, stop: StopHandle) -> &mut Self {
        self.stop_when_drained = Some(stop);
        self
    }

    /// Topic of the active subscription, `None` once closed.
    pub fn subscribed_topic(&self) -> Option<&str> {
        self.subscribed.as_deref()
    }

    /// Topic of the most recent successful subscription, kept after close.
    pub fn last_subscribed_topic(&self) -> Option<&str> {
        self.last_subscribed.as_deref()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of polls served so far.
    pub fn polls(&self) -> usize {
        self.polls
    }

    /// Deliveries not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl MessageSource for MemorySource {
    fn subscribe(&mut self, topic: &str) -> BrokerResult<()> {
        if self.fail_subscribe {
            return Err(BrokerError::Subscribe {
                topic: topic.to_string(),
                reason: "subscription refused".into(),
            });
        }
        self.subscribed = Some(topic.to_string());
        self.last_subscribed = Some(topic.to_string());
        Ok(())
    }

    async fn poll(&mut self, _timeout: Duration) -> BrokerResult<Option<Vec<u8>>> {
        if self.closed {
            return Err(BrokerError::Poll("source is closed".into()));
        }
        self.polls += 1;

        match self.script.pop_front() {
            Some(Delivery::Payload(payload)) => Ok(Some(payload)),
            Some(Delivery::Timeout) => Ok(None),
            Some(Delivery::Error(reason)) => Err(BrokerError::Poll(reason)),
            None => {
                if let Some(stop) = &self.stop_when_drained {
                    stop.request_stop();
                }
                Ok(None)
            }
        }
    }

    fn close(&mut self) {
        self.closed = true;
        self.subscribed = None;
    }
}
