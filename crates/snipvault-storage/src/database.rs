// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! `Database` IS the single writer: query modules accept `&Database` and go
//! through [`Database::connection`]. Do NOT open additional connections for writes.

use std::time::Duration;

use rusqlite::ErrorCode;
use tracing::{debug, info};

use snipvault_config::model::StorageConfig;
use snipvault_core::SnipvaultError;

use crate::migrations;

/// Connection options applied on open.
#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    pub wal_mode: bool,
    pub busy_timeout: Duration,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            wal_mode: true,
            busy_timeout: Duration::from_millis(5000),
        }
    }
}

impl From<&StorageConfig> for DatabaseOptions {
    fn from(config: &StorageConfig) -> Self {
        Self {
            wal_mode: config.wal_mode,
            busy_timeout: Duration::from_millis(config.busy_timeout_ms),
        }
    }
}

/// Handle to the open SQLite database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
    path: String,
}

impl Database {
    /// Open (or create) the database at `path` with default options and ensure the schema.
    pub async fn open(path: &str) -> Result<Self, SnipvaultError> {
        Self::open_with(path, DatabaseOptions::default()).await
    }

    /// Open with explicit options. Schema failures surface as [`SnipvaultError::Schema`].
    pub async fn open_with(path: &str, options: DatabaseOptions) -> Result<Self, SnipvaultError> {
        if let Some(parent) = std::path::Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| SnipvaultError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(map_sqlite_err)?;

        let DatabaseOptions {
            wal_mode,
            busy_timeout,
        } = options;
        let journal_mode = conn
            .call(move |conn| -> Result<String, rusqlite::Error> {
                conn.busy_timeout(busy_timeout)?;
                let mode = if wal_mode { "WAL" } else { "DELETE" };
                let applied: String =
                    conn.pragma_update_and_check(None, "journal_mode", mode, |row| row.get(0))?;
                conn.pragma_update(None, "synchronous", "NORMAL")?;
                conn.pragma_update(None, "foreign_keys", "ON")?;
                Ok(applied)
            })
            .await
            .map_err(map_tr_err)?;
        debug!(path, journal_mode = %journal_mode, ?busy_timeout, "connection configured");

        let db = Self {
            conn,
            path: path.to_string(),
        };
        db.ensure_schema().await?;
        info!(path, "database opened");
        Ok(db)
    }

    /// Open with options taken from the storage configuration section.
    pub async fn open_with_config(config: &StorageConfig) -> Result<Self, SnipvaultError> {
        Self::open_with(&config.database_path, DatabaseOptions::from(config)).await
    }

    /// Create missing tables and add late columns. Safe to call on every startup.
    pub async fn ensure_schema(&self) -> Result<(), SnipvaultError> {
        self.conn
            .call(|conn| migrations::ensure_schema(conn))
            .await
            .map_err(|e| match e {
                tokio_rusqlite::Error::Error(inner) => inner,
                other => SnipvaultError::Schema {
                    source: Box::new(other),
                },
            })
    }

    /// The underlying single-writer connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Run `PRAGMA integrity_check` and return the reported lines (`["ok"]` when healthy).
    pub async fn integrity_check(&self) -> Result<Vec<String>, SnipvaultError> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare("PRAGMA integrity_check")?;
                let lines = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(lines)
            })
            .await
            .map_err(map_tr_err)
    }

    /// Checkpoint the WAL into the main database file.
    pub async fn close(&self) -> Result<(), SnipvaultError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!(path = %self.path, "WAL checkpoint complete");
        Ok(())
    }
}

/// True for SQLITE_BUSY / SQLITE_LOCKED, the errors the busy timeout gave up on.
pub fn is_busy(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if matches!(failure.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
    )
}

/// Convert a rusqlite error, classifying lock contention as retryable.
pub fn map_sqlite_err(e: rusqlite::Error) -> SnipvaultError {
    if is_busy(&e) {
        SnipvaultError::Busy {
            source: Box::new(e),
        }
    } else {
        SnipvaultError::Storage {
            source: Box::new(e),
        }
    }
}

/// Convert a tokio-rusqlite error, classifying lock contention as retryable.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> SnipvaultError {
    match e {
        tokio_rusqlite::Error::Error(inner) => map_sqlite_err(inner),
        other => SnipvaultError::Storage {
            source: Box::new(other),
        },
    }
}
