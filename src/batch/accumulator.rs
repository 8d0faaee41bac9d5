//! Accumulator of validated messages

use crate::validation::ValidMessage;

/// Messages per flush unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// Configuration for batch accumulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Number of valid messages that triggers a flush.
    pub max_records: usize,
    /// Flush a partial batch when the ingest loop stops.
    /// When false, messages accumulated since the last flush are lost on shutdown.
    pub flush_on_shutdown: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_records: DEFAULT_BATCH_SIZE,
            flush_on_shutdown: false,
        }
    }
}

impl BatchConfig {
    /// Create config with the given batch size and no shutdown flush.
    pub fn with_size(max_records: usize) -> Self {
        Self {
            max_records,
            ..Self::default()
        }
    }
}

/// Ordered buffer of valid messages awaiting a flush.
///
/// The length never exceeds `max_records`: the push that reaches it
/// reports that the batch is full, and the owner drains it before the
/// next push.
#[derive(Debug)]
pub struct Accumulator {
    config: BatchConfig,
    pending: Vec<ValidMessage>,
}

impl Accumulator {
    /// Create an empty accumulator.
    ///
    /// A `max_records` of zero is treated as one.
    pub fn new(mut config: BatchConfig) -> Self {
        config.max_records = config.max_records.max(1);
        Self {
            pending: Vec::with_capacity(config.max_records),
            config,
        }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Number of messages waiting.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Returns true once the threshold is reached.
    pub fn is_full(&self) -> bool {
        self.pending.len() >= self.config.max_records
    }

    /// Append a message.
    ///
    /// Returns true if the batch must be flushed now.
    pub fn push(&mut self, msg: ValidMessage) -> bool {
        debug_assert!(!self.is_full(), "accumulator pushed past its threshold");
        self.pending.push(msg);
        self.is_full()
    }

    /// Borrow the pending messages in arrival order.
    pub fn pending(&self) -> &[ValidMessage] {
        &self.pending
    }

    /// Take every pending message, leaving the accumulator empty.
    pub fn drain(&mut self) -> Vec<ValidMessage> {
        std::mem::replace(&mut self.pending, Vec::with_capacity(self.config.max_records))
    }
}
