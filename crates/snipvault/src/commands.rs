// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record, settings, and theme commands run against an open vault.
//!
//! Each command returns the text to print so the binary stays a thin shell
//! around [`Vault`].

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Local};
use tracing::debug;

use snipvault_config::model::SnipvaultConfig;
use snipvault_core::{PersistenceGateway, Record, RecordId, RecordKind, SnipvaultError, Theme};
use snipvault_sync::export::{import, record_from_file, ExportDocument};
use snipvault_sync::{ClientCache, EditorSession, SaveOptions, SaveResult};
use snipvault_storage::SqliteGateway;

/// Open store plus the cache in front of it.
pub struct Vault {
    gateway: Arc<SqliteGateway>,
    cache: Arc<ClientCache>,
    export_version: String,
}

impl Vault {
    /// Open the database, apply the schema, and load both collections.
    pub async fn open(config: &SnipvaultConfig) -> Result<Self, SnipvaultError> {
        let gateway = Arc::new(SqliteGateway::new(config.storage.clone()));
        gateway.initialize().await?;
        let cache = ClientCache::new(
            Arc::clone(&gateway) as Arc<dyn PersistenceGateway>,
            &config.autosave,
        );
        cache.refresh_all().await?;
        Ok(Self {
            gateway,
            cache,
            export_version: config.export.version.clone(),
        })
    }

    /// Cancel pending autosaves and checkpoint the database.
    pub async fn close(&self) -> Result<(), SnipvaultError> {
        self.cache.shutdown().await
    }

    fn editor(&self) -> EditorSession {
        EditorSession::new(Arc::clone(&self.cache))
    }

    /// Find a record by id, or by `@mention` when the target starts with `@`.
    async fn find(&self, target: &str) -> Result<Record, SnipvaultError> {
        let found = if target.starts_with('@') {
            self.cache.resolve_mention(target).await
        } else {
            self.cache.get(&RecordId::new(target)).await
        };
        found.ok_or_else(|| SnipvaultError::Validation(format!("nothing matches {target}")))
    }

    pub async fn list(&self, kind: RecordKind, tag: Option<&str>) -> String {
        let records = match tag {
            Some(tag) => self
                .cache
                .with_tag(tag)
                .await
                .into_iter()
                .filter(|r| r.kind == kind)
                .collect(),
            None => self.cache.list(kind).await,
        };
        summarize(&records)
    }

    pub async fn search(&self, kind: RecordKind, term: &str) -> String {
        summarize(&self.cache.search(kind, term).await)
    }

    pub async fn show(&self, target: &str) -> Result<String, SnipvaultError> {
        let record = self.find(target).await?;
        let mut out = String::new();
        let _ = writeln!(out, "{} ({}, {})", record.title, record.kind, record.language);
        let _ = writeln!(out, "id:       {}", record.id);
        let _ = writeln!(out, "modified: {}", format_timestamp(record.timestamp));
        if !record.tags.is_empty() {
            let _ = writeln!(out, "tags:     {}", hashtags(&record));
        }
        let _ = writeln!(out);
        out.push_str(&record.code);
        if !record.code.ends_with('\n') {
            out.push('\n');
        }
        Ok(out)
    }

    /// Every tag in use, one per line.
    pub async fn tags(&self) -> String {
        let tags = self.cache.all_tags().await;
        let mut out = String::new();
        for tag in tags.iter() {
            let count = self.cache.with_tag(tag).await.len();
            let _ = writeln!(out, "#{tag:<24} {count}");
        }
        out
    }

    /// Create a record the way the editor does: draft, type, then name it.
    pub async fn create(
        &self,
        kind: RecordKind,
        title: &str,
        code: &str,
    ) -> Result<String, SnipvaultError> {
        let mut editor = self.editor();
        editor.new_draft(kind);
        editor.on_edit(code)?;
        let result = editor.name_draft(title).await;
        editor.close();
        saved_line(result?, "created")
    }

    /// Replace a record's body and save it explicitly.
    pub async fn edit(&self, target: &str, code: &str) -> Result<String, SnipvaultError> {
        let record = self.find(target).await?;
        let mut editor = self.editor();
        editor.open(&record.id).await?;
        editor.on_edit(code)?;
        let result = editor.request_save().await;
        editor.close();
        saved_line(result?, "saved")
    }

    pub async fn rename(&self, target: &str, name: &str) -> Result<String, SnipvaultError> {
        let record = self.find(target).await?;
        let mut editor = self.editor();
        editor.open(&record.id).await?;
        let result = editor.rename(name).await;
        editor.close();
        saved_line(result?, "renamed")
    }

    pub async fn delete(&self, target: &str) -> Result<String, SnipvaultError> {
        let record = self.find(target).await?;
        let mut editor = self.editor();
        editor.open(&record.id).await?;
        editor.request_delete().await?;
        Ok(format!("deleted {} {}\n", record.kind, record.title))
    }

    /// Import an export document.
    pub async fn import_document(&self, raw: &str) -> Result<String, SnipvaultError> {
        let report = import(&self.cache, ExportDocument::from_json(raw)?).await?;
        Ok(format!(
            "imported {}, skipped {}, failed {}\n",
            report.imported, report.skipped, report.failed
        ))
    }

    /// Create one record from a file on disk, titled by its file name.
    pub async fn import_file(
        &self,
        path: &Path,
        kind: RecordKind,
    ) -> Result<String, SnipvaultError> {
        let code = std::fs::read_to_string(path).map_err(|e| SnipvaultError::Storage {
            source: Box::new(e),
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let record = record_from_file(&file_name, code, kind);
        debug!(path = %path.display(), language = %record.language, "importing file");
        let outcome = self.cache.save(record, SaveOptions::default()).await?;
        saved_line(outcome.into(), "imported")
    }

    pub async fn export(&self) -> Result<String, SnipvaultError> {
        ExportDocument::from_cache(&self.cache, &self.export_version)
            .await
            .to_json()
    }

    pub async fn get_setting(&self, key: &str) -> Result<String, SnipvaultError> {
        Ok(match self.gateway.get_setting(key).await? {
            Some(value) => format!("{value}\n"),
            None => String::new(),
        })
    }

    pub async fn set_setting(&self, key: &str, value: &str) -> Result<String, SnipvaultError> {
        self.gateway.save_setting(key, value).await?;
        Ok(String::new())
    }

    pub async fn list_settings(&self) -> Result<String, SnipvaultError> {
        let mut out = String::new();
        for (key, value) in self.gateway.list_settings().await? {
            let _ = writeln!(out, "{key} = {value}");
        }
        Ok(out)
    }

    pub async fn get_theme(&self) -> Result<String, SnipvaultError> {
        Ok(match self.gateway.get_theme().await? {
            Some(theme) => format!("{}\n{}\n", theme.name, theme.colors),
            None => "default\n".to_string(),
        })
    }

    /// Store the current theme. `colors` must be a JSON value.
    pub async fn set_theme(&self, name: &str, colors: &str) -> Result<String, SnipvaultError> {
        serde_json::from_str::<serde_json::Value>(colors).map_err(|e| {
            SnipvaultError::Serialization {
                source: Box::new(e),
            }
        })?;
        self.gateway.save_theme(&Theme::current(name, colors)).await?;
        Ok(String::new())
    }
}

fn saved_line(result: SaveResult, verb: &str) -> Result<String, SnipvaultError> {
    match result {
        SaveResult::Saved(record) => Ok(format!("{verb} {} {}\n", record.kind, record.id)),
        SaveResult::NeedsName => Err(SnipvaultError::Validation("a name is required".into())),
        SaveResult::Tombstoned => Err(SnipvaultError::Validation(
            "the record was deleted while saving".into(),
        )),
    }
}

fn hashtags(record: &Record) -> String {
    record
        .tags
        .iter()
        .map(|t| format!("#{t}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_timestamp(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| millis.to_string())
}

fn summarize(records: &[Record]) -> String {
    let mut out = String::new();
    for record in records {
        let _ = write!(
            out,
            "{:<16} {:<32} {:<5} {}",
            record.id.as_str(),
            record.title,
            record.language.as_str(),
            format_timestamp(record.timestamp)
        );
        if !record.tags.is_empty() {
            let _ = write!(out, "  {}", hashtags(record));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use snipvault_core::Language;

    async fn open_vault(dir: &tempfile::TempDir) -> Vault {
        let mut config = SnipvaultConfig::default();
        config.storage.database_path = dir.path().join("vault.db").to_string_lossy().into_owned();
        Vault::open(&config).await.unwrap()
    }

    fn created_id(line: &str) -> String {
        line.split_whitespace().last().unwrap().to_string()
    }

    #[tokio::test]
    async fn create_then_show_by_id_and_mention() {
        let dir = tempfile::tempdir().unwrap();
        let vault = open_vault(&dir).await;

        let line = vault
            .create(RecordKind::Snippet, "Hello World", "def hi():\n    print('hi') #greeting")
            .await
            .unwrap();
        assert!(line.starts_with("created snippet "));
        let id = created_id(&line);

        let shown = vault.show(&id).await.unwrap();
        assert!(shown.starts_with("Hello World (snippet, py)"));
        assert!(shown.contains("#greeting"));
        assert_eq!(shown, vault.show("@hello-world").await.unwrap());
        assert!(vault.show("@nonexistent").await.is_err());
        vault.close().await.unwrap();
    }

    #[tokio::test]
    async fn create_without_a_title_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let vault = open_vault(&dir).await;
        let err = vault.create(RecordKind::Snippet, "  ", "x").await.unwrap_err();
        assert!(matches!(err, SnipvaultError::Validation(_)));
        assert!(vault.list(RecordKind::Snippet, None).await.is_empty());
    }

    #[tokio::test]
    async fn edit_rename_and_delete_persist_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let vault = open_vault(&dir).await;
        let id = created_id(&vault.create(RecordKind::Snippet, "q", "hello").await.unwrap());

        vault.edit(&id, "SELECT * FROM t; #db").await.unwrap();
        vault.rename(&id, "query.sql").await.unwrap();
        vault.close().await.unwrap();
        drop(vault);

        let vault = open_vault(&dir).await;
        let shown = vault.show(&id).await.unwrap();
        assert!(shown.starts_with("query.sql (snippet, sql)"));
        assert!(shown.contains("#db"));

        vault.delete(&id).await.unwrap();
        assert!(vault.show(&id).await.is_err());
        assert!(vault.list(RecordKind::Snippet, None).await.is_empty());
    }

    #[tokio::test]
    async fn list_filters_by_tag_and_kind() {
        let dir = tempfile::tempdir().unwrap();
        let vault = open_vault(&dir).await;
        vault.create(RecordKind::Snippet, "a", "x #keep").await.unwrap();
        vault.create(RecordKind::Snippet, "b", "y #drop").await.unwrap();
        vault.create(RecordKind::Project, "c", "z #keep").await.unwrap();

        let listed = vault.list(RecordKind::Snippet, Some("keep")).await;
        assert_eq!(listed.lines().count(), 1);
        assert!(listed.contains(" a "));

        let tags = vault.tags().await;
        assert!(tags.lines().any(|l| l.starts_with("#keep") && l.ends_with('2')));
    }

    #[tokio::test]
    async fn export_and_import_round_the_library() {
        let source_dir = tempfile::tempdir().unwrap();
        let source = open_vault(&source_dir).await;
        source.create(RecordKind::Snippet, "one.py", "x = 1").await.unwrap();
        source.create(RecordKind::Project, "plan", "# Plan").await.unwrap();
        let json = source.export().await.unwrap();

        let target_dir = tempfile::tempdir().unwrap();
        let target = open_vault(&target_dir).await;
        assert_eq!(
            target.import_document(&json).await.unwrap(),
            "imported 2, skipped 0, failed 0\n"
        );
        assert_eq!(target.search(RecordKind::Project, "pla").await.lines().count(), 1);
    }

    #[tokio::test]
    async fn import_file_titles_by_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let vault = open_vault(&dir).await;
        let file = dir.path().join("deploy.sh");
        std::fs::write(&file, "#!/bin/sh\necho deploy #ops\n").unwrap();

        let id = created_id(&vault.import_file(&file, RecordKind::Snippet).await.unwrap());
        let record = vault.find(&id).await.unwrap();
        assert_eq!(record.title, "deploy.sh");
        assert_eq!(record.language, Language::Shell);
        assert!(record.tags.contains("ops"));
    }

    #[tokio::test]
    async fn settings_and_theme() {
        let dir = tempfile::tempdir().unwrap();
        let vault = open_vault(&dir).await;
        assert_eq!(vault.get_setting("font").await.unwrap(), "");
        vault.set_setting("font", "mono").await.unwrap();
        vault.set_setting("autosave", "on").await.unwrap();
        assert_eq!(vault.get_setting("font").await.unwrap(), "mono\n");
        assert_eq!(
            vault.list_settings().await.unwrap(),
            "autosave = on\nfont = mono\n"
        );

        assert_eq!(vault.get_theme().await.unwrap(), "default\n");
        assert!(vault.set_theme("dark", "not json").await.is_err());
        vault.set_theme("dark", r##"{"bg":"#000"}"##).await.unwrap();
        assert_eq!(vault.get_theme().await.unwrap(), "dark\n{\"bg\":\"#000\"}\n");
    }
}
