//! Message broker boundary
//!
//! The ingest loop consumes raw payloads through a [`MessageSource`]. A
//! source is connected before the loop starts; the loop subscribes it,
//! polls it with a bounded wait and closes it on every exit path.
//!
//! # Feature Flags
//!
//! - `kafka` - Enables [`KafkaSource`] (requires `rdkafka`).

mod errors;
mod memory;

#[cfg(feature = "kafka")]
mod kafka;

use std::future::Future;
use std::time::Duration;

pub use errors::{BrokerError, BrokerResult};
pub use memory::{Delivery, MemorySource};

#[cfg(feature = "kafka")]
pub use kafka::KafkaSource;

/// A subscribable stream of raw message payloads.
pub trait MessageSource {
    /// Subscribe to a topic. Failure is fatal to the ingest loop.
    fn subscribe(&mut self, topic: &str) -> BrokerResult<()>;

    /// Wait up to `timeout` for one payload.
    ///
    /// `Ok(None)` means the wait elapsed with nothing to deliver.
    fn poll(&mut self, timeout: Duration) -> impl Future<Output = BrokerResult<Option<Vec<u8>>>>;

    /// Release the subscription. Called once when the loop stops.
    fn close(&mut self);
}
