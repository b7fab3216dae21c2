// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A real SQLite gateway living in a temporary directory.

use std::sync::Arc;

use snipvault_config::model::StorageConfig;
use snipvault_core::{PersistenceGateway, SnipvaultError};
use snipvault_storage::SqliteGateway;

/// Temporary on-disk store. The directory is removed on drop.
pub struct TempStore {
    pub gateway: Arc<SqliteGateway>,
    pub config: StorageConfig,
    _temp_dir: tempfile::TempDir,
}

impl TempStore {
    /// Create and initialize a fresh database.
    pub async fn new() -> Result<Self, SnipvaultError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| SnipvaultError::Storage { source: e.into() })?;
        let config = StorageConfig {
            database_path: temp_dir
                .path()
                .join("snippets.db")
                .to_string_lossy()
                .into_owned(),
            ..StorageConfig::default()
        };
        let gateway = SqliteGateway::new(config.clone());
        gateway.initialize().await?;
        Ok(Self {
            gateway: Arc::new(gateway),
            config,
            _temp_dir: temp_dir,
        })
    }

    /// The gateway as a trait object, ready to hand to a cache.
    pub fn dyn_gateway(&self) -> Arc<dyn PersistenceGateway> {
        self.gateway.clone()
    }

    /// Open a second gateway on the same file, as a restarted process would.
    pub async fn reopen(&self) -> Result<SqliteGateway, SnipvaultError> {
        self.gateway.shutdown().await?;
        let gateway = SqliteGateway::new(self.config.clone());
        gateway.initialize().await?;
        Ok(gateway)
    }
}
