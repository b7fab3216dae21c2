// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The persistence gateway: the only path from the sync layer to the store.

use async_trait::async_trait;

use crate::error::SnipvaultError;
use crate::types::{HealthStatus, Record, RecordId, RecordKind, Theme};

/// Verb set over the snippet, project, setting, and theme collections.
///
/// Every `save_*` is a whole-record upsert keyed by id. There is no partial
/// field update at this boundary, so a save can never merge with data the
/// caller has not seen. Deleting an id that does not exist succeeds.
#[async_trait]
pub trait PersistenceGateway: Send + Sync + 'static {
    /// Human-readable name of this gateway implementation.
    fn name(&self) -> &str;

    /// Semantic version of this gateway implementation.
    fn version(&self) -> semver::Version;

    /// Reports whether the backing store is reachable.
    async fn health_check(&self) -> Result<HealthStatus, SnipvaultError>;

    /// Flushes pending writes and releases the backing store.
    async fn shutdown(&self) -> Result<(), SnipvaultError>;

    /// All snippets, title-ascending.
    async fn get_snippets(&self) -> Result<Vec<Record>, SnipvaultError>;

    async fn save_snippet(&self, record: &Record) -> Result<(), SnipvaultError>;

    async fn delete_snippet(&self, id: &RecordId) -> Result<(), SnipvaultError>;

    /// All projects, title-ascending.
    async fn get_projects(&self) -> Result<Vec<Record>, SnipvaultError>;

    async fn save_project(&self, record: &Record) -> Result<(), SnipvaultError>;

    async fn delete_project(&self, id: &RecordId) -> Result<(), SnipvaultError>;

    async fn get_setting(&self, key: &str) -> Result<Option<String>, SnipvaultError>;

    async fn save_setting(&self, key: &str, value: &str) -> Result<(), SnipvaultError>;

    /// The theme row with id `"current"`, if one was ever saved.
    async fn get_theme(&self) -> Result<Option<Theme>, SnipvaultError>;

    async fn save_theme(&self, theme: &Theme) -> Result<(), SnipvaultError>;

    /// List the collection for `kind`.
    async fn list(&self, kind: RecordKind) -> Result<Vec<Record>, SnipvaultError> {
        match kind {
            RecordKind::Snippet => self.get_snippets().await,
            RecordKind::Project => self.get_projects().await,
        }
    }

    /// Save into the collection named by the record's own discriminator.
    async fn save(&self, record: &Record) -> Result<(), SnipvaultError> {
        match record.kind {
            RecordKind::Snippet => self.save_snippet(record).await,
            RecordKind::Project => self.save_project(record).await,
        }
    }

    async fn delete(&self, kind: RecordKind, id: &RecordId) -> Result<(), SnipvaultError> {
        match kind {
            RecordKind::Snippet => self.delete_snippet(id).await,
            RecordKind::Project => self.delete_project(id).await,
        }
    }
}
