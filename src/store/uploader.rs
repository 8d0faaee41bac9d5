//! Batch uploader trait and in-memory implementation

use std::collections::HashSet;
use std::future::Future;

use super::errors::{UploadError, UploadResult};
use super::table::{StoreRow, TableSpec};

/// Persists rows to a destination table.
///
/// Each call is one transaction holding one multi-row insert. On success
/// the rows are committed and the affected row count returned; on failure
/// nothing is committed and the error is returned to the caller.
/// An empty `rows` slice returns `Ok(0)` without touching the store.
pub trait BatchUploader {
    fn upload(
        &mut self,
        table: &TableSpec,
        rows: &[StoreRow],
    ) -> impl Future<Output = UploadResult<u64>>;
}

/// A recorded upload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCall {
    pub table: &'static str,
    pub rows: Vec<StoreRow>,
    pub committed: bool,
}

/// In-memory uploader for testing.
///
/// Records every call, empty ones included. Tables marked with
/// [`MemoryUploader::fail_table`] reject their uploads.
#[derive(Debug, Default)]
pub struct MemoryUploader {
    calls: Vec<UploadCall>,
    failing: HashSet<&'static str>,
}

impl MemoryUploader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every upload to `table` fail.
    pub fn fail_table(mut self, table: &TableSpec) -> Self {
        self.failing.insert(table.name);
        self
    }

    /// All recorded calls, in order.
    pub fn calls(&self) -> &[UploadCall] {
        &self.calls
    }

    /// Committed rows for a table across all calls.
    pub fn committed_rows(&self, table: &TableSpec) -> Vec<&StoreRow> {
        self.calls
            .iter()
            .filter(|call| call.committed && call.table == table.name)
            .flat_map(|call| call.rows.iter())
            .collect()
    }
}

impl BatchUploader for MemoryUploader {
    async fn upload(&mut self, table: &TableSpec, rows: &[StoreRow]) -> UploadResult<u64> {
        let committed = !self.failing.contains(table.name);
        self.calls.push(UploadCall {
            table: table.name,
            rows: rows.to_vec(),
            committed,
        });

        if !committed {
            return Err(UploadError::Insert {
                table: table.name.to_string(),
                reason: "rejected by memory uploader".into(),
            });
        }
        Ok(rows.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ASSISTANCE_TABLE, VOTE_TABLE};
    use chrono::DateTime;

    fn row(code: i32) -> StoreRow {
        StoreRow {
            code,
            exhibition_id: "EXH_01".into(),
            observed_at: DateTime::parse_from_rfc3339("2024-03-13T12:00:00+00:00").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_memory_upload_records_rows() {
        let mut uploader = MemoryUploader::new();

        let count = uploader.upload(&VOTE_TABLE, &[row(1), row(2)]).await.unwrap();

        assert_eq!(count, 2);
        assert_eq!(uploader.calls().len(), 1);
        assert_eq!(uploader.committed_rows(&VOTE_TABLE).len(), 2);
        assert!(uploader.committed_rows(&ASSISTANCE_TABLE).is_empty());
    }

    #[tokio::test]
    async fn test_memory_upload_empty() {
        let mut uploader = MemoryUploader::new();
        assert_eq!(uploader.upload(&VOTE_TABLE, &[]).await.unwrap(), 0);
        assert_eq!(uploader.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_memory_upload_failure() {
        let mut uploader = MemoryUploader::new().fail_table(&ASSISTANCE_TABLE);

        let err = uploader.upload(&ASSISTANCE_TABLE, &[row(0)]).await.unwrap_err();
        assert!(matches!(err, UploadError::Insert { .. }));
        assert!(uploader.committed_rows(&ASSISTANCE_TABLE).is_empty());

        assert!(uploader.upload(&VOTE_TABLE, &[row(3)]).await.is_ok());
    }
}
