//! Reject log for messages dropped by the ingest loop
//!
//! - Append-only, one JSON record per line
//! - Each record carries the rendered report and the raw payload
//! - Writes are flushed before `append` returns

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default reject log location, relative to the working directory.
pub const DEFAULT_REJECT_LOG: &str = "msg_error_logs.txt";

/// One rejected message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectRecord {
    /// Unique record ID.
    pub id: Uuid,

    /// When the message was rejected.
    pub timestamp: DateTime<Utc>,

    /// Human-readable reason, e.g. `Invalid: No 'at' key.`
    pub report: String,

    /// The payload as received.
    pub payload: String,
}

impl RejectRecord {
    pub fn new(report: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            report: report.into(),
            payload: payload.into(),
        }
    }

    /// Build a record from raw bytes that may not be UTF-8.
    pub fn from_bytes(report: impl Into<String>, payload: &[u8]) -> Self {
        Self::new(report, String::from_utf8_lossy(payload))
    }

    /// Serialize to one JSON line, newline excluded.
    pub fn to_json(&self) -> io::Result<String> {
        serde_json::to_string(self).map_err(io::Error::from)
    }
}

/// Reject log sink.
pub trait RejectLog: Send + Sync {
    /// Append a record. The record is visible once this returns.
    fn append(&self, record: &RejectRecord) -> io::Result<()>;
}

/// File-backed reject log.
pub struct FileRejectLog {
    path: PathBuf,
    writer: Arc<Mutex<BufWriter<File>>>,
}

impl FileRejectLog {
    /// Open or create a reject log file in append mode.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            writer: Arc::new(Mutex::new(BufWriter::new(file))),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RejectLog for FileRejectLog {
    fn append(&self, record: &RejectRecord) -> io::Result<()> {
        let json = record.to_json()?;
        let mut writer = lock(&self.writer)?;
        writeln!(writer, "{}", json)?;
        writer.flush()
    }
}

/// In-memory reject log for testing.
#[derive(Debug, Default, Clone)]
pub struct MemoryRejectLog {
    records: Arc<Mutex<Vec<RejectRecord>>>,
}

impl MemoryRejectLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every record appended so far.
    pub fn records(&self) -> Vec<RejectRecord> {
        lock(&self.records).map(|r| r.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        lock(&self.records).map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RejectLog for MemoryRejectLog {
    fn append(&self, record: &RejectRecord) -> io::Result<()> {
        lock(&self.records)?.push(record.clone());
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> io::Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| io::Error::new(io::ErrorKind::Other, "reject log lock poisoned"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_record_json() {
        let record = RejectRecord::new("Invalid: No 'at' key.", r#"{"site":"1","val":2}"#);

        let json = record.to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["report"], "Invalid: No 'at' key.");
        assert_eq!(parsed["payload"], r#"{"site":"1","val":2}"#);
        assert_eq!(parsed["id"], record.id.to_string());
    }

    #[test]
    fn test_record_from_non_utf8_bytes() {
        let record = RejectRecord::from_bytes("bad payload", &[0x7b, 0xff, 0x7d]);
        assert!(record.payload.starts_with('{'));
        assert!(record.payload.ends_with('}'));
    }

    #[test]
    fn test_memory_reject_log() {
        let log = MemoryRejectLog::new();
        assert!(log.is_empty());

        log.append(&RejectRecord::new("first", "{}")).unwrap();
        log.append(&RejectRecord::new("second", "{}")).unwrap();

        assert_eq!(log.len(), 2);
        let records = log.records();
        assert_eq!(records[0].report, "first");
        assert_eq!(records[1].report, "second");
    }

    #[test]
    fn test_memory_reject_log_clones_share_records() {
        let log = MemoryRejectLog::new();
        let view = log.clone();

        log.append(&RejectRecord::new("shared", "{}")).unwrap();
        assert_eq!(view.len(), 1);
    }

    #[test]
    fn test_file_reject_log_appends_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DEFAULT_REJECT_LOG);

        let log = FileRejectLog::open(&path).unwrap();
        log.append(&RejectRecord::new("Invalid: 'val' not an integer.", r#"{"val":"x"}"#))
            .unwrap();
        log.append(&RejectRecord::new("Invalid: No 'site' key.", r#"{"val":1}"#))
            .unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: RejectRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.report, "Invalid: 'val' not an integer.");
        assert_eq!(first.payload, r#"{"val":"x"}"#);
    }

    #[test]
    fn test_file_reject_log_reopen_keeps_existing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rejects.log");

        FileRejectLog::open(&path)
            .unwrap()
            .append(&RejectRecord::new("one", "{}"))
            .unwrap();
        FileRejectLog::open(&path)
            .unwrap()
            .append(&RejectRecord::new("two", "{}"))
            .unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}
