//! Batch accumulation
//!
//! Valid messages are held until a fixed count is reached, then handed to
//! the flush path in one piece.
//!
//! # Batch Formation Rules
//!
//! - Batches form purely by arrival order of valid messages
//! - No timers or dynamic resizing
//! - Batch size is explicitly bounded and configuration-defined
//! - A partial batch is only flushed on shutdown when configured to be

mod accumulator;

pub use accumulator::{Accumulator, BatchConfig, DEFAULT_BATCH_SIZE};
