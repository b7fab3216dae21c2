// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The single theme row, keyed by `"current"`.

use rusqlite::{params, OptionalExtension};

use snipvault_core::types::CURRENT_THEME_ID;
use snipvault_core::{SnipvaultError, Theme};

use crate::database::{map_tr_err, Database};

/// Load the current theme, if one was ever saved.
pub async fn get_current(db: &Database) -> Result<Option<Theme>, SnipvaultError> {
    db.connection()
        .call(|conn| {
            let theme = conn
                .query_row(
                    "SELECT id, name, colors FROM theme WHERE id = ?1",
                    params![CURRENT_THEME_ID],
                    |row| {
                        Ok(Theme {
                            id: row.get(0)?,
                            name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                            colors: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                        })
                    },
                )
                .optional()?;
            Ok(theme)
        })
        .await
        .map_err(map_tr_err)
}

/// Insert or replace the theme row keyed by `theme.id`.
pub async fn put(db: &Database, theme: &Theme) -> Result<(), SnipvaultError> {
    let theme = theme.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO theme (id, name, colors) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET name = excluded.name, colors = excluded.colors",
                params![theme.id, theme.name, theme.colors],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn theme_is_absent_until_saved() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("t.db").to_str().unwrap())
            .await
            .unwrap();
        assert!(get_current(&db).await.unwrap().is_none());

        let dark = Theme::current("dark", r##"{"bg":"#0f172a"}"##);
        put(&db, &dark).await.unwrap();
        assert_eq!(get_current(&db).await.unwrap(), Some(dark));

        let light = Theme::current("light", "{}");
        put(&db, &light).await.unwrap();
        assert_eq!(get_current(&db).await.unwrap(), Some(light));
    }
}
