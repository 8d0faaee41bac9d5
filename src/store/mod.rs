//! Relational store boundary
//!
//! The ingest loop hands each flushed batch to a [`BatchUploader`] once per
//! destination table. An uploader persists one call as one multi-row insert
//! inside one transaction and reports failure as a value; it never panics or
//! aborts the loop.
//!
//! # Feature Flags
//!
//! - `postgres` - Enables [`PgUploader`] (requires `sqlx` with postgres).

mod errors;
mod table;
mod uploader;

#[cfg(feature = "postgres")]
mod postgres;

pub use errors::{UploadError, UploadResult};
pub use table::{StoreRow, TableSpec, ASSISTANCE_TABLE, VOTE_TABLE};
pub use uploader::{BatchUploader, MemoryUploader, UploadCall};

#[cfg(feature = "postgres")]
pub use postgres::PgUploader;
