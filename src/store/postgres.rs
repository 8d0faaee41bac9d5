//! PostgreSQL uploader
//!
//! Owns a single connection for the lifetime of the ingest loop. Each
//! upload opens a transaction, issues one multi-row insert and commits;
//! an error drops the transaction, which rolls it back.

use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{Connection, Postgres, QueryBuilder};

use crate::config::StoreConfig;

use super::errors::{UploadError, UploadResult};
use super::table::{StoreRow, TableSpec};
use super::uploader::BatchUploader;

pub struct PgUploader {
    conn: PgConnection,
}

impl PgUploader {
    /// Open the store connection. Failure here is fatal at startup.
    pub async fn connect(config: &StoreConfig) -> UploadResult<Self> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.username)
            .password(config.password.expose())
            .database(&config.database);

        let conn = PgConnection::connect_with(&options)
            .await
            .map_err(|e| UploadError::Connect(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Close the connection cleanly.
    pub async fn close(self) -> UploadResult<()> {
        self.conn
            .close()
            .await
            .map_err(|e| UploadError::Connect(e.to_string()))
    }
}

impl BatchUploader for PgUploader {
    async fn upload(&mut self, table: &TableSpec, rows: &[StoreRow]) -> UploadResult<u64> {
        if rows.is_empty() {
            return Ok(0);
        }

        let insert_error = |e: sqlx::Error| UploadError::Insert {
            table: table.name.to_string(),
            reason: e.to_string(),
        };

        let mut tx = self.conn.begin().await.map_err(insert_error)?;

        let mut builder = QueryBuilder::<Postgres>::new(table.insert_prefix());
        builder.push_values(rows, |mut values, row| {
            values
                .push_bind(row.code)
                .push_bind(row.exhibition_id.clone())
                .push_bind(row.observed_at);
        });

        let result = builder
            .build()
            .execute(&mut *tx)
            .await
            .map_err(insert_error)?;

        tx.commit().await.map_err(|e| UploadError::Commit {
            table: table.name.to_string(),
            reason: e.to_string(),
        })?;

        Ok(result.rows_affected())
    }
}
