//! CLI module for the kiosk pipeline
//!
//! Parses flags, loads configuration from the environment, connects the
//! broker and the store, then runs the ingest loop until interrupted.

mod args;
mod commands;
mod errors;

pub use args::Cli;
pub use commands::{open_reject_log, run, run_with};
pub use errors::{CliError, CliErrorCode, CliResult};
