//! CLI argument definitions using clap
//!
//! - kiosk-pipeline [--log | --no-log] [--reject-log <path>]
//!   [--batch-size <n>] [--poll-timeout-ms <ms>] [--flush-on-shutdown]
//!
//! Connection settings come from the environment, not from flags.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::batch::{BatchConfig, DEFAULT_BATCH_SIZE};
use crate::ingest::IngestConfig;
use crate::observability::DEFAULT_REJECT_LOG;

/// Kiosk pipeline - validates kiosk interactions from the broker and stores them
#[derive(Parser, Debug)]
#[command(name = "kiosk-pipeline")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Write rejected messages to the reject log (default)
    #[arg(long = "log", overrides_with = "no_log")]
    pub log: bool,

    /// Do not write rejected messages to the reject log
    #[arg(long = "no-log", overrides_with = "log")]
    pub no_log: bool,

    /// Path of the reject log
    #[arg(long, default_value = DEFAULT_REJECT_LOG)]
    pub reject_log: PathBuf,

    /// Accepted messages per flush
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE, value_parser = parse_batch_size)]
    pub batch_size: usize,

    /// Bounded wait for one broker poll, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub poll_timeout_ms: u64,

    /// Flush a partial batch when stopping instead of discarding it
    #[arg(long)]
    pub flush_on_shutdown: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Whether rejected messages go to the reject log.
    pub fn log_rejects(&self) -> bool {
        !self.no_log
    }

    /// Ingest settings for `topic`.
    pub fn ingest_config(&self, topic: &str) -> IngestConfig {
        IngestConfig {
            topic: topic.to_string(),
            poll_timeout: Duration::from_millis(self.poll_timeout_ms),
            batch: BatchConfig {
                max_records: self.batch_size,
                flush_on_shutdown: self.flush_on_shutdown,
            },
        }
    }
}

fn parse_batch_size(s: &str) -> Result<usize, String> {
    let size: usize = s
        .parse()
        .map_err(|e| format!("'{}' is not a batch size: {}", s, e))?;
    if size == 0 {
        return Err("batch size must be > 0".into());
    }
    Ok(size)
}
