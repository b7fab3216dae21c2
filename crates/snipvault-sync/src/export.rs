// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON export and import of the whole library, and file import.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use snipvault_core::types::now_millis;
use snipvault_core::{Record, RecordId, RecordKind, SnipvaultError};
use snipvault_inference::{extract_tags, normalize_title, resolve_language};

use crate::cache::{ClientCache, SaveOptions, SaveOutcome};

/// The export file. Records keep their stored field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub export_date: String,
    pub version: String,
    #[serde(default)]
    pub snippets: Vec<Record>,
    #[serde(default)]
    pub projects: Vec<Record>,
}

impl ExportDocument {
    pub fn new(version: &str, snippets: Vec<Record>, projects: Vec<Record>) -> Self {
        Self::at(Utc::now(), version, snippets, projects)
    }

    pub fn at(
        date: DateTime<Utc>,
        version: &str,
        snippets: Vec<Record>,
        projects: Vec<Record>,
    ) -> Self {
        Self {
            export_date: date.to_rfc3339_opts(SecondsFormat::Millis, true),
            version: version.to_string(),
            snippets,
            projects,
        }
    }

    /// Snapshot of everything in the cache.
    pub async fn from_cache(cache: &ClientCache, version: &str) -> Self {
        Self::new(version, cache.snippets().await, cache.projects().await)
    }

    pub fn to_json(&self) -> Result<String, SnipvaultError> {
        serde_json::to_string_pretty(self).map_err(|e| SnipvaultError::Serialization {
            source: Box::new(e),
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, SnipvaultError> {
        serde_json::from_str(raw).map_err(|e| SnipvaultError::Serialization {
            source: Box::new(e),
        })
    }
}

/// Counts from an import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Save every record of `document` through the cache.
///
/// Records are taken as exported, except that the array they came from decides
/// their kind. Untitled records are skipped. One failing record does not stop
/// the rest.
pub async fn import(
    cache: &ClientCache,
    document: ExportDocument,
) -> Result<ImportReport, SnipvaultError> {
    let mut report = ImportReport::default();
    let tagged = document
        .snippets
        .into_iter()
        .map(|r| (RecordKind::Snippet, r))
        .chain(document.projects.into_iter().map(|r| (RecordKind::Project, r)));

    for (kind, mut record) in tagged {
        record.kind = kind;
        if record.title.trim().is_empty() {
            warn!(id = %record.id, "skipping untitled record");
            report.skipped += 1;
            continue;
        }
        record.tags = extract_tags(&record.code);
        record.language = resolve_language(&record.title, &record.code);
        let options = SaveOptions {
            skip_selection_update: true,
        };
        match cache.save(record, options).await {
            Ok(SaveOutcome::Saved(_)) => report.imported += 1,
            Ok(_) => report.skipped += 1,
            Err(_) => report.failed += 1,
        }
    }
    info!(
        imported = report.imported,
        skipped = report.skipped,
        failed = report.failed,
        "import finished"
    );
    Ok(report)
}

/// Build a new record from a file's name and contents.
///
/// The title is the file name; the language comes from its extension, or
/// from the contents when the extension is unknown.
pub fn record_from_file(file_name: &str, code: String, kind: RecordKind) -> Record {
    let title = normalize_title(file_name);
    Record {
        id: RecordId::generate(),
        language: resolve_language(&title, &code),
        tags: extract_tags(&code),
        title,
        code,
        timestamp: now_millis(),
        kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::TimeZone;
    use snipvault_config::model::AutosaveConfig;
    use snipvault_core::{Language, TagSet};
    use snipvault_test_utils::MockGateway;

    fn record(kind: RecordKind, id: &str, title: &str) -> Record {
        Record {
            id: RecordId::new(id),
            title: title.into(),
            code: "x = 1 #math".into(),
            language: Language::Python,
            timestamp: 1_700_000_000_000,
            kind,
            tags: TagSet::from_delimited("math"),
        }
    }

    #[test]
    fn export_shape_uses_camel_case_header_and_stored_record_fields() {
        let date = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let doc = ExportDocument::at(
            date,
            "1.0.0",
            vec![record(RecordKind::Snippet, "1", "s")],
            vec![],
        );
        let json: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(json["exportDate"], "2026-01-02T03:04:05.000Z");
        assert_eq!(json["version"], "1.0.0");
        let snip = &json["snippets"][0];
        assert_eq!(snip["type"], "snippet");
        assert_eq!(snip["language"], "py");
        assert_eq!(snip["tags"], "math");
        assert_eq!(snip["timestamp"], 1_700_000_000_000i64);
        assert!(json["projects"].as_array().unwrap().is_empty());
    }

    #[test]
    fn export_parses_back() {
        let doc = ExportDocument::new("1.0.0", vec![], vec![record(RecordKind::Project, "2", "p")]);
        let back = ExportDocument::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn malformed_export_is_a_serialization_error() {
        let err = ExportDocument::from_json("{\"version\": 3}").unwrap_err();
        assert!(matches!(err, SnipvaultError::Serialization { .. }));
    }

    #[test]
    fn file_records_take_language_from_extension_then_content() {
        let r = record_from_file("notes.md", "def f(): pass".into(), RecordKind::Snippet);
        assert_eq!(r.title, "notes.md");
        assert_eq!(r.language, Language::Markdown);

        let r = record_from_file("Makefile", "echo build #ci".into(), RecordKind::Snippet);
        assert_eq!(r.language, Language::Shell);
        assert!(r.tags.contains("ci"));
    }

    #[tokio::test]
    async fn import_rederives_tags_and_language_from_code() {
        let gw = MockGateway::new();
        let cache = ClientCache::new(Arc::new(gw.clone()), &AutosaveConfig::default());
        let mut stale = record(RecordKind::Snippet, "7", "query");
        stale.code = "SELECT name FROM users WHERE id = 1".into();
        stale.tags = TagSet::from_delimited("stale,fake");
        stale.language = Language::Css;
        let mut untagged = record(RecordKind::Project, "8", "notes");
        untagged.code = "no hashtags here".into();
        untagged.tags = TagSet::from_delimited("stale,fake");

        let report = import(&cache, ExportDocument::new("1.0.0", vec![stale], vec![untagged]))
            .await
            .unwrap();
        assert_eq!(report.imported, 2);

        let snippet = &gw.stored(RecordKind::Snippet).await[0];
        assert!(snippet.tags.is_empty());
        assert_eq!(snippet.language, Language::Sql);
        let project = &gw.stored(RecordKind::Project).await[0];
        assert!(project.tags.is_empty());
        assert_eq!(project.language, Language::PlainText);
    }
}
