//! kiosk-pipeline entry point
//!
//! Minimal entrypoint that:
//! 1. Delegates argument parsing and startup to `cli::run`
//! 2. Prints errors to stderr
//! 3. Exits with non-zero on failure
//!
//! All logic lives in the CLI module.

use kiosk_pipeline::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
