//! CLI command implementation
//!
//! Startup sequence:
//! 1. Configuration load from the environment
//! 2. Reject log open (unless `--no-log`)
//! 3. Broker connect
//! 4. Store connect
//! 5. Ingest loop until Ctrl-C
//!
//! Any failure before step 5 is fatal: nothing is polled.

use std::path::Path;

use crate::config::PipelineConfig;
use crate::ingest::IngestConfig;
use crate::observability::{
    log_event, log_event_with_fields, Event, FileRejectLog, Logger, RejectLog,
};

use super::args::Cli;
use super::errors::{CliError, CliResult};

/// Main CLI entry point
///
/// Parses arguments and runs the pipeline.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_with(&cli)
}

/// Run the pipeline with already parsed arguments.
pub fn run_with(cli: &Cli) -> CliResult<()> {
    log_event(Event::PipelineStart);

    let config = PipelineConfig::from_env().map_err(|e| startup_failed(e.into()))?;
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("topic", &config.broker.topic),
            ("store_host", &config.store.host),
            ("log_rejects", if cli.log_rejects() { "true" } else { "false" }),
        ],
    );

    let reject_log = if cli.log_rejects() {
        Some(open_reject_log(&cli.reject_log).map_err(startup_failed)?)
    } else {
        None
    };
    let ingest = cli.ingest_config(&config.broker.topic);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| startup_failed(CliError::boot_failed(format!("Failed to create tokio runtime: {}", e))))?;

    runtime.block_on(serve(config, ingest, reject_log))
}

/// Open the reject log for appending.
pub fn open_reject_log(path: &Path) -> CliResult<Box<dyn RejectLog>> {
    let log = FileRejectLog::open(path).map_err(|e| {
        CliError::io_error(format!("Failed to open reject log {:?}: {}", path, e))
    })?;
    Ok(Box::new(log))
}

fn startup_failed(err: CliError) -> CliError {
    Logger::fatal(
        Event::StartupFailed.as_str(),
        &[("code", err.code_str()), ("reason", err.message())],
    );
    err
}

/// Connect both collaborators and run the ingest loop until Ctrl-C.
#[cfg(all(feature = "kafka", feature = "postgres"))]
async fn serve(
    config: PipelineConfig,
    ingest: IngestConfig,
    reject_log: Option<Box<dyn RejectLog>>,
) -> CliResult<()> {
    use crate::broker::KafkaSource;
    use crate::ingest::IngestLoop;
    use crate::store::PgUploader;

    let source = KafkaSource::connect(&config.broker).map_err(|e| startup_failed(e.into()))?;
    log_event_with_fields(
        Event::BrokerConnected,
        &[("bootstrap_servers", &config.broker.bootstrap_servers)],
    );

    let uploader = PgUploader::connect(&config.store)
        .await
        .map_err(|e| startup_failed(e.into()))?;
    log_event_with_fields(Event::StoreConnected, &[("database", &config.store.database)]);

    let mut pipeline = IngestLoop::new(source, uploader, ingest);
    if let Some(log) = reject_log {
        pipeline = pipeline.with_reject_log(log);
    }

    let stop = pipeline.stop_handle();
    let signal = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.request_stop();
        }
    });

    let outcome = pipeline.run().await;
    signal.abort();

    let (_source, uploader) = pipeline.into_parts();
    if let Err(e) = uploader.close().await {
        Logger::warn("STORE_CLOSE_FAILED", &[("reason", &e.to_string())]);
    }

    outcome.map(|_| ()).map_err(CliError::from)
}

#[cfg(not(all(feature = "kafka", feature = "postgres")))]
async fn serve(
    _config: PipelineConfig,
    _ingest: IngestConfig,
    _reject_log: Option<Box<dyn RejectLog>>,
) -> CliResult<()> {
    Err(startup_failed(CliError::boot_failed(
        "built without broker and store support; enable the `kafka` and `postgres` features",
    )))
}

#[cfg(test)]
mod tests {
    use super::super::errors::CliErrorCode;
    use super::*;
    use crate::observability::RejectRecord;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_open_reject_log_creates_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("msg_error_logs.txt");

        let log = open_reject_log(&path).unwrap();
        log.append(&RejectRecord::new("Invalid: No 'at' key.", "{}")).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("No 'at' key."));
    }

    #[test]
    fn test_open_reject_log_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("rejects.txt");

        let err = open_reject_log(&path).err().unwrap();
        assert_eq!(err.code(), &CliErrorCode::IoError);
    }
}
