// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Upsert, lookup, listing, and deletion for the snippets and projects tables.

use rusqlite::{params, OptionalExtension};
use tracing::debug;

use snipvault_core::{Language, Record, RecordId, SnipvaultError, TagSet};
use snipvault_inference::extract_tags;

use crate::database::{map_tr_err, Database};
use crate::models::Collection;

fn select_columns(collection: Collection) -> &'static str {
    if collection.has_tags_column() {
        "id, title, code, language, timestamp, type, tags"
    } else {
        "id, title, code, language, timestamp, type"
    }
}

/// Map a row to a record, tolerating NULL columns left by older writers.
///
/// Rows without a stored tag list (projects, or snippets written before the
/// `tags` column existed) get tags derived from their code.
fn row_to_record(row: &rusqlite::Row<'_>, collection: Collection) -> rusqlite::Result<Record> {
    let code: String = row.get::<_, Option<String>>(2)?.unwrap_or_default();
    let language: Option<String> = row.get(3)?;
    let stored_tags: Option<String> = if collection.has_tags_column() {
        row.get(6)?
    } else {
        None
    };
    let tags = match stored_tags {
        Some(raw) => TagSet::from_delimited(&raw),
        None => extract_tags(&code),
    };
    Ok(Record {
        id: RecordId(row.get(0)?),
        title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        language: language
            .as_deref()
            .map(Language::from_token)
            .unwrap_or_default(),
        timestamp: row.get::<_, Option<i64>>(4)?.unwrap_or_default(),
        kind: collection.kind(),
        tags,
        code,
    })
}

/// Insert or wholly replace the row keyed by `record.id`.
pub async fn upsert(
    db: &Database,
    collection: Collection,
    record: &Record,
) -> Result<(), SnipvaultError> {
    let record = record.clone();
    db.connection()
        .call(move |conn| {
            if collection.has_tags_column() {
                conn.execute(
                    "INSERT INTO snippets (id, title, code, language, timestamp, type, tags)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                     ON CONFLICT(id) DO UPDATE SET
                         title = excluded.title,
                         code = excluded.code,
                         language = excluded.language,
                         timestamp = excluded.timestamp,
                         type = excluded.type,
                         tags = excluded.tags",
                    params![
                        record.id.as_str(),
                        record.title,
                        record.code,
                        record.language.as_str(),
                        record.timestamp,
                        record.kind.as_str(),
                        record.tags.to_delimited(),
                    ],
                )?;
            } else {
                conn.execute(
                    "INSERT INTO projects (id, title, code, language, timestamp, type)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     ON CONFLICT(id) DO UPDATE SET
                         title = excluded.title,
                         code = excluded.code,
                         language = excluded.language,
                         timestamp = excluded.timestamp,
                         type = excluded.type",
                    params![
                        record.id.as_str(),
                        record.title,
                        record.code,
                        record.language.as_str(),
                        record.timestamp,
                        record.kind.as_str(),
                    ],
                )?;
            }
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch one record by id.
pub async fn get(
    db: &Database,
    collection: Collection,
    id: &RecordId,
) -> Result<Option<Record>, SnipvaultError> {
    let id = id.as_str().to_string();
    db.connection()
        .call(move |conn| {
            let sql = format!(
                "SELECT {} FROM {} WHERE id = ?1",
                select_columns(collection),
                collection.table()
            );
            let mut stmt = conn.prepare(&sql)?;
            let record = stmt
                .query_row(params![id], |row| row_to_record(row, collection))
                .optional()?;
            Ok(record)
        })
        .await
        .map_err(map_tr_err)
}

/// All rows, ordered by title ascending with id breaking ties.
pub async fn list_all(db: &Database, collection: Collection) -> Result<Vec<Record>, SnipvaultError> {
    db.connection()
        .call(move |conn| {
            let sql = format!(
                "SELECT {} FROM {} ORDER BY title ASC, id ASC",
                select_columns(collection),
                collection.table()
            );
            let mut stmt = conn.prepare(&sql)?;
            let records = stmt
                .query_map([], |row| row_to_record(row, collection))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(records)
        })
        .await
        .map_err(map_tr_err)
}

/// Remove the row if present. Returns whether a row was removed; absence is not an error.
pub async fn delete(
    db: &Database,
    collection: Collection,
    id: &RecordId,
) -> Result<bool, SnipvaultError> {
    let id = id.as_str().to_string();
    let removed = db
        .connection()
        .call(move |conn| {
            let sql = format!("DELETE FROM {} WHERE id = ?1", collection.table());
            let n = conn.execute(&sql, params![id])?;
            Ok(n > 0)
        })
        .await
        .map_err(map_tr_err)?;
    debug!(%collection, removed, "delete executed");
    Ok(removed)
}
