// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the PersistenceGateway trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use snipvault_config::model::StorageConfig;
use snipvault_core::{
    HealthStatus, PersistenceGateway, Record, RecordId, RecordKind, SnipvaultError, Theme,
};

use crate::database::{map_tr_err, Database};
use crate::models::Collection;
use crate::queries;

/// SQLite-backed persistence gateway.
///
/// Wraps a [`Database`] handle and delegates every verb to the typed query
/// modules. The database is opened lazily by [`SqliteGateway::initialize`].
pub struct SqliteGateway {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteGateway {
    /// Create a new gateway. The database is not opened until [`initialize`](Self::initialize).
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Wrap an already-open database.
    pub fn from_database(config: StorageConfig, db: Database) -> Self {
        Self {
            config,
            db: OnceCell::from(db),
        }
    }

    /// Open the database and ensure the schema. Errors if called twice.
    pub async fn initialize(&self) -> Result<(), SnipvaultError> {
        let db = Database::open_with_config(&self.config).await?;
        self.db.set(db).map_err(|_| SnipvaultError::Storage {
            source: "gateway already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite gateway initialized");
        Ok(())
    }

    /// Checkpoint the WAL.
    pub async fn close(&self) -> Result<(), SnipvaultError> {
        self.db()?.close().await
    }

    /// Returns the underlying Database, or an error if not initialized.
    pub fn db(&self) -> Result<&Database, SnipvaultError> {
        self.db.get().ok_or_else(|| SnipvaultError::Storage {
            source: "gateway not initialized -- call initialize() first".into(),
        })
    }

    /// Every stored setting, ordered by key.
    pub async fn list_settings(&self) -> Result<Vec<(String, String)>, SnipvaultError> {
        queries::settings::list(self.db()?).await
    }

    /// Single-record lookup in the collection for `kind`.
    pub async fn get_record(
        &self,
        kind: RecordKind,
        id: &RecordId,
    ) -> Result<Option<Record>, SnipvaultError> {
        queries::records::get(self.db()?, Collection::from(kind), id).await
    }

    async fn upsert_into(
        &self,
        collection: Collection,
        record: &Record,
    ) -> Result<(), SnipvaultError> {
        check_writable(collection, record)?;
        queries::records::upsert(self.db()?, collection, record).await?;
        debug!(%collection, id = %record.id, "record upserted");
        Ok(())
    }
}

/// Reject records that must never reach the store.
fn check_writable(collection: Collection, record: &Record) -> Result<(), SnipvaultError> {
    if record.kind != collection.kind() {
        return Err(SnipvaultError::Validation(format!(
            "cannot save a {} into {collection}",
            record.kind
        )));
    }
    if record.title.trim().is_empty() {
        return Err(SnipvaultError::Validation(format!(
            "record {} has no title and cannot be persisted",
            record.id
        )));
    }
    Ok(())
}

#[async_trait]
impl PersistenceGateway for SqliteGateway {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, SnipvaultError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), SnipvaultError> {
        if let Some(db) = self.db.get() {
            db.close().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }

    // --- Snippets ---

    async fn get_snippets(&self) -> Result<Vec<Record>, SnipvaultError> {
        queries::records::list_all(self.db()?, Collection::Snippets).await
    }

    async fn save_snippet(&self, record: &Record) -> Result<(), SnipvaultError> {
        self.upsert_into(Collection::Snippets, record).await
    }

    async fn delete_snippet(&self, id: &RecordId) -> Result<(), SnipvaultError> {
        queries::records::delete(self.db()?, Collection::Snippets, id).await?;
        Ok(())
    }

    // --- Projects ---

    async fn get_projects(&self) -> Result<Vec<Record>, SnipvaultError> {
        queries::records::list_all(self.db()?, Collection::Projects).await
    }

    async fn save_project(&self, record: &Record) -> Result<(), SnipvaultError> {
        self.upsert_into(Collection::Projects, record).await
    }

    async fn delete_project(&self, id: &RecordId) -> Result<(), SnipvaultError> {
        queries::records::delete(self.db()?, Collection::Projects, id).await?;
        Ok(())
    }

    // --- Settings and theme ---

    async fn get_setting(&self, key: &str) -> Result<Option<String>, SnipvaultError> {
        queries::settings::get_by_key(self.db()?, key).await
    }

    async fn save_setting(&self, key: &str, value: &str) -> Result<(), SnipvaultError> {
        queries::settings::put_by_key(self.db()?, key, value).await
    }

    async fn get_theme(&self) -> Result<Option<Theme>, SnipvaultError> {
        queries::theme::get_current(self.db()?).await
    }

    async fn save_theme(&self, theme: &Theme) -> Result<(), SnipvaultError> {
        queries::theme::put(self.db()?, theme).await
    }
}
