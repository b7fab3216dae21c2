// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Last-write-wins key/value settings.

use rusqlite::{params, OptionalExtension};

use snipvault_core::SnipvaultError;

use crate::database::{map_tr_err, Database};

/// Get the value stored under `key`.
pub async fn get_by_key(db: &Database, key: &str) -> Result<Option<String>, SnipvaultError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM settings WHERE key = ?1",
                    params![key],
                    |row| row.get::<_, Option<String>>(0),
                )
                .optional()?;
            Ok(value.flatten())
        })
        .await
        .map_err(map_tr_err)
}

/// Store `value` under `key`, replacing any previous value.
pub async fn put_by_key(db: &Database, key: &str, value: &str) -> Result<(), SnipvaultError> {
    let key = key.to_string();
    let value = value.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO settings (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Every setting, ordered by key.
pub async fn list(db: &Database) -> Result<Vec<(String, String)>, SnipvaultError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare("SELECT key, value FROM settings ORDER BY key ASC")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .map_err(map_tr_err)
}
