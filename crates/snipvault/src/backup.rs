// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `snipvault backup` and `snipvault restore`.
//!
//! Both directions go through SQLite's online backup API, so a copy taken
//! while another process holds the vault open in WAL mode is still consistent.

use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, OpenFlags};
use tracing::info;

use snipvault_core::SnipvaultError;

fn storage_err(e: impl std::error::Error + Send + Sync + 'static) -> SnipvaultError {
    SnipvaultError::Storage {
        source: Box::new(e),
    }
}

fn not_found(what: &str, path: &str) -> SnipvaultError {
    storage_err(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("{what} not found: {path}"),
    ))
}

/// Page-stepped copy of `from` into `to`, replacing whatever `to` held.
fn copy_database(from: &str, to: &str) -> Result<u64, SnipvaultError> {
    let src = Connection::open_with_flags(
        from,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(storage_err)?;
    let mut dst = Connection::open(to).map_err(storage_err)?;

    let backup = rusqlite::backup::Backup::new(&src, &mut dst).map_err(storage_err)?;
    // 100 pages per step with a short pause so a live writer is not starved.
    backup
        .run_to_completion(100, Duration::from_millis(10), None)
        .map_err(storage_err)?;
    drop(backup);

    Ok(std::fs::metadata(to).map_err(storage_err)?.len())
}

/// Reject files that are not SQLite or do not hold a vault.
fn validate_vault(path: &str) -> Result<(), SnipvaultError> {
    let conn =
        Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(storage_err)?;
    let tables: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master
             WHERE type = 'table' AND name IN ('snippets', 'projects')",
            [],
            |row| row.get(0),
        )
        .map_err(storage_err)?;
    if tables < 2 {
        return Err(SnipvaultError::Validation(format!(
            "{path} is not a snipvault database"
        )));
    }
    Ok(())
}

fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

/// Copy the vault at `db_path` to `backup_path`.
pub fn run_backup(db_path: &str, backup_path: &str) -> Result<(), SnipvaultError> {
    if !Path::new(db_path).exists() {
        return Err(not_found("database", db_path));
    }
    let size = copy_database(db_path, backup_path)?;
    info!(from = db_path, to = backup_path, bytes = size, "backup complete");
    eprintln!(
        "Backup complete: {:.1} MB written to {backup_path}",
        megabytes(size)
    );
    Ok(())
}

/// Replace the vault at `db_path` with the contents of `restore_from`.
///
/// The current database, if any, is first copied to `{db_path}.pre-restore`.
pub fn run_restore(db_path: &str, restore_from: &str) -> Result<(), SnipvaultError> {
    if !Path::new(restore_from).exists() {
        return Err(not_found("backup file", restore_from));
    }
    validate_vault(restore_from)?;

    if Path::new(db_path).exists() {
        let pre_restore = format!("{db_path}.pre-restore");
        eprintln!("Creating safety backup: {pre_restore}");
        run_backup(db_path, &pre_restore)?;
    }

    let size = copy_database(restore_from, db_path)?;
    info!(from = restore_from, to = db_path, bytes = size, "restore complete");
    eprintln!(
        "Restore complete: {:.1} MB restored from {restore_from}",
        megabytes(size)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use snipvault_config::model::StorageConfig;
    use snipvault_core::{PersistenceGateway, RecordKind};
    use snipvault_storage::SqliteGateway;
    use snipvault_sync::export::record_from_file;

    async fn vault_with(path: &Path, titles: &[&str]) {
        let gateway = SqliteGateway::new(StorageConfig {
            database_path: path.to_string_lossy().into_owned(),
            ..StorageConfig::default()
        });
        gateway.initialize().await.unwrap();
        for title in titles {
            let record = record_from_file(title, "SELECT 1;".into(), RecordKind::Snippet);
            gateway.save_snippet(&record).await.unwrap();
        }
        gateway.shutdown().await.unwrap();
    }

    fn snippet_titles(path: &Path) -> Vec<String> {
        let conn = Connection::open(path).unwrap();
        let mut stmt = conn
            .prepare("SELECT title FROM snippets ORDER BY title")
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn backup_of_missing_database_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.db");
        let err = run_backup(
            missing.to_str().unwrap(),
            dir.path().join("out.db").to_str().unwrap(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn restore_from_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_restore(
            dir.path().join("vault.db").to_str().unwrap(),
            dir.path().join("nope.db").to_str().unwrap(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn backup_copies_every_snippet() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("vault.db");
        let out = dir.path().join("copy.db");
        vault_with(&db, &["a.sql", "b.sql"]).await;

        run_backup(db.to_str().unwrap(), out.to_str().unwrap()).unwrap();
        assert_eq!(snippet_titles(&out), vec!["a.sql", "b.sql"]);
    }

    #[tokio::test]
    async fn restore_keeps_a_safety_copy_of_the_current_vault() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("vault.db");
        let saved = dir.path().join("saved.db");
        vault_with(&saved, &["from-backup.sql"]).await;
        vault_with(&db, &["current.sql"]).await;

        run_restore(db.to_str().unwrap(), saved.to_str().unwrap()).unwrap();

        assert_eq!(snippet_titles(&db), vec!["from-backup.sql"]);
        let pre_restore = dir.path().join("vault.db.pre-restore");
        assert_eq!(snippet_titles(&pre_restore), vec!["current.sql"]);
    }

    #[test]
    fn restore_rejects_non_sqlite_files() {
        let dir = tempfile::tempdir().unwrap();
        let junk = dir.path().join("junk.db");
        std::fs::write(&junk, b"definitely not sqlite").unwrap();
        let result = run_restore(
            dir.path().join("vault.db").to_str().unwrap(),
            junk.to_str().unwrap(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn restore_rejects_sqlite_files_without_vault_tables() {
        let dir = tempfile::tempdir().unwrap();
        let other = dir.path().join("other.db");
        Connection::open(&other)
            .unwrap()
            .execute_batch("CREATE TABLE unrelated (id INTEGER PRIMARY KEY);")
            .unwrap();

        let err = run_restore(
            dir.path().join("vault.db").to_str().unwrap(),
            other.to_str().unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, SnipvaultError::Validation(_)));
        assert!(!dir.path().join("vault.db").exists());
    }
}
