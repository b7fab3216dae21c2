// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end checks of the SQLite gateway against a real database file.

use snipvault_config::model::StorageConfig;
use snipvault_core::{Language, PersistenceGateway, Record, RecordId, RecordKind, TagSet};
use snipvault_inference::extract_tags;
use snipvault_storage::SqliteGateway;
use tempfile::TempDir;

async fn open_gateway() -> (TempDir, SqliteGateway) {
    let dir = tempfile::tempdir().unwrap();
    let config = StorageConfig {
        database_path: dir.path().join("snippets.db").to_string_lossy().into_owned(),
        ..StorageConfig::default()
    };
    let gw = SqliteGateway::new(config);
    gw.initialize().await.unwrap();
    (dir, gw)
}

fn record(kind: RecordKind, id: &str, title: &str, code: &str) -> Record {
    Record {
        id: RecordId::new(id),
        title: title.to_string(),
        code: code.to_string(),
        language: Language::JavaScript,
        timestamp: 1_700_000_000_000,
        kind,
        tags: extract_tags(code),
    }
}

#[tokio::test]
async fn saved_records_read_back_unchanged() {
    let (_dir, gw) = open_gateway().await;
    let snip = record(RecordKind::Snippet, "10", "fetch helper", "const f = 1; #net #http");
    let proj = record(RecordKind::Project, "11", "site", "let x = 2; #web");

    gw.save(&snip).await.unwrap();
    gw.save(&proj).await.unwrap();

    assert_eq!(gw.get_snippets().await.unwrap(), vec![snip]);
    assert_eq!(gw.get_projects().await.unwrap(), vec![proj]);
}

#[tokio::test]
async fn resaving_replaces_the_whole_row() {
    let (_dir, gw) = open_gateway().await;
    let mut snip = record(RecordKind::Snippet, "1", "first", "var a; #old");
    gw.save_snippet(&snip).await.unwrap();

    snip.title = "renamed".into();
    snip.code = "print(1)".into();
    snip.language = Language::Python;
    snip.tags = TagSet::new();
    snip.timestamp += 5;
    gw.save_snippet(&snip).await.unwrap();

    let all = gw.get_snippets().await.unwrap();
    assert_eq!(all, vec![snip]);
}

#[tokio::test]
async fn delete_only_touches_its_collection() {
    let (_dir, gw) = open_gateway().await;
    gw.save(&record(RecordKind::Snippet, "7", "s", "")).await.unwrap();
    gw.save(&record(RecordKind::Project, "7", "p", "")).await.unwrap();

    gw.delete(RecordKind::Snippet, &RecordId::new("7")).await.unwrap();

    assert!(gw.list(RecordKind::Snippet).await.unwrap().is_empty());
    assert_eq!(gw.list(RecordKind::Project).await.unwrap().len(), 1);
}

#[tokio::test]
async fn settings_listing_is_ordered_by_key() {
    let (_dir, gw) = open_gateway().await;
    gw.save_setting("wordWrap", "on").await.unwrap();
    gw.save_setting("fontSize", "14").await.unwrap();
    gw.save_setting("fontSize", "16").await.unwrap();

    let all = gw.list_settings().await.unwrap();
    assert_eq!(
        all,
        vec![
            ("fontSize".to_string(), "16".to_string()),
            ("wordWrap".to_string(), "on".to_string()),
        ]
    );
}
