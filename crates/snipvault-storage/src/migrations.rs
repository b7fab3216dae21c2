// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded schema migrations plus additive column upgrades.
//!
//! SQL migration files are compiled into the binary at build time via
//! `embed_migrations!`. The initial migration uses `CREATE TABLE IF NOT EXISTS`
//! so databases created before refinery tracked them pass through unchanged;
//! columns that were added later are then patched in from [`ADDITIVE_COLUMNS`].

use snipvault_core::SnipvaultError;
use tracing::info;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Columns introduced after a table first shipped: `(table, column, declaration)`.
pub const ADDITIVE_COLUMNS: &[(&str, &str, &str)] = &[("snippets", "tags", "TEXT")];

/// Run embedded migrations, then add any missing late columns.
pub fn ensure_schema(conn: &mut rusqlite::Connection) -> Result<(), SnipvaultError> {
    run_migrations(conn)?;
    add_missing_columns(conn).map_err(|e| SnipvaultError::Schema {
        source: Box::new(e),
    })
}

/// Run all pending migrations against the given connection.
///
/// Refinery tracks applied migrations in its own `refinery_schema_history` table.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), SnipvaultError> {
    embedded::migrations::runner()
        .run(conn)
        .map_err(|e| SnipvaultError::Schema {
            source: Box::new(e),
        })?;
    Ok(())
}

fn add_missing_columns(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    for (table, column, decl) in ADDITIVE_COLUMNS {
        if !column_exists(conn, table, column)? {
            conn.execute_batch(&format!("ALTER TABLE {table} ADD COLUMN {column} {decl};"))?;
            info!(table, column, "added missing column");
        }
    }
    Ok(())
}

/// Whether `table` has a column named `column`.
pub fn column_exists(
    conn: &rusqlite::Connection,
    table: &str,
    column: &str,
) -> Result<bool, rusqlite::Error> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names.iter().any(|name| name == column))
}
