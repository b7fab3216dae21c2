// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The editor-facing session over one open document.

use std::sync::Arc;

use tracing::debug;

use snipvault_core::{
    Document, Draft, DraftState, Record, RecordId, RecordKind, SnipvaultError,
};
use snipvault_inference::{detect_language, extract_tags, rename, resolve_language};

use crate::cache::{ClientCache, SaveOptions, SaveOutcome};
use crate::draft::{DraftLifecycle, SaveGate};

/// Result of an editor save request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveResult {
    Saved(Record),
    /// The document is an unnamed draft. Prompt for a name, then call
    /// [`EditorSession::name_draft`].
    NeedsName,
    /// The record was deleted while the save was in flight.
    Tombstoned,
}

impl From<SaveOutcome> for SaveResult {
    fn from(outcome: SaveOutcome) -> Self {
        match outcome {
            SaveOutcome::Saved(record) => SaveResult::Saved(record),
            // Explicit saves never run the autosave guards.
            SaveOutcome::Tombstoned | SaveOutcome::Suppressed(_) => SaveResult::Tombstoned,
        }
    }
}

fn no_document() -> SnipvaultError {
    SnipvaultError::Validation("no document is open".into())
}

/// One editor pane: the open document, its lifecycle, and the cache it saves through.
pub struct EditorSession {
    cache: Arc<ClientCache>,
    document: Option<Document>,
    lifecycle: DraftLifecycle,
}

impl EditorSession {
    pub fn new(cache: Arc<ClientCache>) -> Self {
        Self {
            cache,
            document: None,
            lifecycle: DraftLifecycle::new(),
        }
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn state(&self) -> Option<DraftState> {
        self.document.as_ref().map(|_| self.lifecycle.state())
    }

    /// Drop the current document's pending autosave. It is not carried over.
    fn leave_current(&mut self) {
        if let Some(doc) = self.document.take() {
            self.cache.scheduler().cancel(doc.id());
        }
    }

    /// Open a cached record and select it.
    pub async fn open(&mut self, id: &RecordId) -> Result<Record, SnipvaultError> {
        let record = self
            .cache
            .select(id)
            .await
            .ok_or_else(|| SnipvaultError::Validation(format!("no record with id {id}")))?;
        self.leave_current();
        let document = Document::Persisted(record.clone());
        self.lifecycle = DraftLifecycle::for_document(&document);
        self.document = Some(document);
        debug!(%id, "document opened");
        Ok(record)
    }

    /// Start an unnamed draft. Nothing is persisted until it is named.
    pub fn new_draft(&mut self, kind: RecordKind) -> RecordId {
        self.leave_current();
        let draft = Draft::new(kind);
        let id = draft.id.clone();
        self.document = Some(Document::Draft(draft));
        self.lifecycle = DraftLifecycle::new();
        id
    }

    /// Replace the document body, re-derive tags and language, and arm autosave
    /// for named documents.
    pub fn on_edit(&mut self, content: &str) -> Result<(), SnipvaultError> {
        if self.lifecycle.is_deleted() {
            return Err(SnipvaultError::InvalidTransition {
                from: DraftState::Deleted,
                to: DraftState::Persisted,
            });
        }
        match self.document.as_mut().ok_or_else(no_document)? {
            Document::Draft(draft) => {
                draft.code = content.to_string();
                draft.tags = extract_tags(content);
                draft.language = detect_language(content);
            }
            Document::Persisted(record) => {
                record.code = content.to_string();
                record.tags = extract_tags(content);
                record.language = resolve_language(&record.title, content);
                if self.lifecycle.can_persist() {
                    self.cache.schedule_autosave(record.clone());
                }
            }
        }
        Ok(())
    }

    /// Explicit save of the open document.
    pub async fn request_save(&mut self) -> Result<SaveResult, SnipvaultError> {
        if self.lifecycle.save_gate()? == SaveGate::NeedsName {
            return Ok(SaveResult::NeedsName);
        }
        let record = match self.document.as_ref().ok_or_else(no_document)? {
            Document::Persisted(record) => record.clone(),
            Document::Draft(_) => return Ok(SaveResult::NeedsName),
        };
        if record.code.trim().is_empty() {
            return Err(SnipvaultError::Validation("nothing to save".into()));
        }
        self.save_record(record).await
    }

    /// Give the open draft a name and save it for the first time.
    ///
    /// A failed first save leaves the document named but unsaved; the next
    /// [`request_save`](Self::request_save) retries.
    pub async fn name_draft(&mut self, name: &str) -> Result<SaveResult, SnipvaultError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SnipvaultError::Validation("a name is required".into()));
        }
        let draft = match self.document.as_ref().ok_or_else(no_document)? {
            Document::Draft(draft) => draft.clone(),
            Document::Persisted(_) => {
                return Err(SnipvaultError::InvalidTransition {
                    from: self.lifecycle.state(),
                    to: DraftState::NamedUnsaved,
                });
            }
        };
        self.lifecycle.name()?;
        let language = resolve_language(name, &draft.code);
        let record = draft.into_record(name, language)?;
        self.document = Some(Document::Persisted(record.clone()));

        self.save_record(record).await
    }

    /// Rename the open document. Drafts are named instead.
    ///
    /// On failure the document keeps its old title.
    pub async fn rename(&mut self, name: &str) -> Result<SaveResult, SnipvaultError> {
        let current = match self.document.as_ref().ok_or_else(no_document)? {
            Document::Draft(_) => return self.name_draft(name).await,
            Document::Persisted(record) => record.clone(),
        };
        if self.lifecycle.is_deleted() {
            return Err(SnipvaultError::InvalidTransition {
                from: DraftState::Deleted,
                to: DraftState::Persisted,
            });
        }
        self.save_record(rename(&current, name)).await
    }

    /// The first acknowledged save of a named draft also selects it.
    async fn save_record(&mut self, record: Record) -> Result<SaveResult, SnipvaultError> {
        let first_save = self.lifecycle.state() == DraftState::NamedUnsaved;
        let outcome = self.cache.save(record, SaveOptions::default()).await?;
        if let SaveOutcome::Saved(saved) = &outcome {
            self.lifecycle.acknowledge_save()?;
            if first_save {
                self.cache.select(&saved.id).await;
            }
            self.document = Some(Document::Persisted(saved.clone()));
        }
        Ok(outcome.into())
    }

    /// Delete the open document. Drafts are simply discarded.
    ///
    /// Returns whether a persisted record was removed.
    pub async fn request_delete(&mut self) -> Result<bool, SnipvaultError> {
        let doc = self.document.as_ref().ok_or_else(no_document)?;
        let (id, is_draft) = (doc.id().clone(), doc.is_draft());
        self.lifecycle.delete()?;
        if is_draft {
            return Ok(false);
        }
        self.cache.delete(&id).await
    }

    pub async fn resolve_mention(&self, token: &str) -> Option<Record> {
        self.cache.resolve_mention(token).await
    }

    /// Close the editor, dropping any pending autosave.
    pub fn close(&mut self) {
        self.leave_current();
        self.lifecycle = DraftLifecycle::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snipvault_config::model::AutosaveConfig;
    use snipvault_core::{Language, TagSet};
    use snipvault_test_utils::MockGateway;

    async fn session() -> (EditorSession, Arc<ClientCache>, MockGateway) {
        let gw = MockGateway::new();
        let cache = ClientCache::new(
            Arc::new(gw.clone()),
            &AutosaveConfig {
                enabled: true,
                quiet_period_ms: 1000,
            },
        );
        (EditorSession::new(Arc::clone(&cache)), cache, gw)
    }

    #[tokio::test]
    async fn unnamed_draft_save_asks_for_name() {
        let (mut editor, _cache, gw) = session().await;
        editor.new_draft(RecordKind::Snippet);
        editor.on_edit("print('hello') #demo").unwrap();

        assert_eq!(editor.request_save().await.unwrap(), SaveResult::NeedsName);
        assert_eq!(gw.save_count().await, 0);
        assert_eq!(editor.state(), Some(DraftState::Unnamed));

        let Document::Draft(draft) = editor.document().unwrap() else {
            panic!("expected a draft");
        };
        assert_eq!(draft.language, Language::Python);
        assert!(draft.tags.contains("demo"));
    }

    #[tokio::test]
    async fn naming_a_draft_persists_and_selects_it() {
        let (mut editor, cache, gw) = session().await;
        let id = editor.new_draft(RecordKind::Project);
        editor.on_edit("echo hi").unwrap();

        let SaveResult::Saved(saved) = editor.name_draft("  deploy.sh ").await.unwrap() else {
            panic!("expected saved");
        };
        assert_eq!(saved.id, id);
        assert_eq!(saved.title, "deploy.sh");
        assert_eq!(saved.language, Language::Shell);
        assert_eq!(editor.state(), Some(DraftState::Persisted));
        assert_eq!(cache.selected().await.unwrap().id, id);
        assert_eq!(gw.stored(RecordKind::Project).await.len(), 1);
    }

    #[tokio::test]
    async fn failed_first_save_stays_named_unsaved_then_retries() {
        let (mut editor, cache, gw) = session().await;
        editor.new_draft(RecordKind::Snippet);
        editor.on_edit("SELECT 1").unwrap();
        gw.fail_saves(1).await;

        assert!(editor.name_draft("query").await.is_err());
        assert_eq!(editor.state(), Some(DraftState::NamedUnsaved));
        assert!(cache.selected().await.is_none());
        assert!(gw.stored(RecordKind::Snippet).await.is_empty());

        let SaveResult::Saved(saved) = editor.request_save().await.unwrap() else {
            panic!("expected saved");
        };
        assert_eq!(saved.language, Language::Sql);
        assert_eq!(editor.state(), Some(DraftState::Persisted));
        assert_eq!(cache.selected().await.map(|r| r.id), Some(saved.id));
    }

    #[tokio::test]
    async fn empty_content_is_rejected_on_explicit_save() {
        let (mut editor, cache, gw) = session().await;
        editor.new_draft(RecordKind::Snippet);
        editor.name_draft("blank").await.unwrap();
        gw.clear_calls().await;

        editor.on_edit("   ").unwrap();
        cache.scheduler().cancel_all();
        let err = editor.request_save().await.unwrap_err();
        assert!(matches!(err, SnipvaultError::Validation(_)));
        assert_eq!(gw.save_count().await, 0);
    }

    #[tokio::test]
    async fn rename_rederives_language_and_reverts_on_failure() {
        let (mut editor, cache, gw) = session().await;
        editor.new_draft(RecordKind::Snippet);
        editor.on_edit("def f(): pass").unwrap();
        editor.name_draft("helper").await.unwrap();

        let SaveResult::Saved(renamed) = editor.rename("helper.md").await.unwrap() else {
            panic!("expected saved");
        };
        assert_eq!(renamed.language, Language::Markdown);

        gw.fail_saves(1).await;
        assert!(editor.rename("other").await.is_err());
        assert_eq!(editor.document().unwrap().title(), "helper.md");
        assert_eq!(cache.selected().await.unwrap().title, "helper.md");
    }

    #[tokio::test]
    async fn deleted_document_rejects_further_work() {
        let (mut editor, cache, gw) = session().await;
        gw.seed(Record {
            id: RecordId::new("5"),
            title: "gone".into(),
            code: "x".into(),
            language: Language::PlainText,
            timestamp: 0,
            kind: RecordKind::Snippet,
            tags: TagSet::new(),
        })
        .await;
        cache.refresh_all().await.unwrap();
        editor.open(&RecordId::new("5")).await.unwrap();

        assert!(editor.request_delete().await.unwrap());
        assert_eq!(editor.state(), Some(DraftState::Deleted));
        assert!(matches!(
            editor.on_edit("more"),
            Err(SnipvaultError::InvalidTransition { .. })
        ));
        assert!(editor.request_save().await.is_err());
    }

    #[tokio::test]
    async fn discarding_a_draft_touches_nothing() {
        let (mut editor, _cache, gw) = session().await;
        editor.new_draft(RecordKind::Snippet);
        editor.on_edit("scratch").unwrap();
        assert!(!editor.request_delete().await.unwrap());
        assert!(gw.calls().await.is_empty());
    }

    #[tokio::test]
    async fn open_unknown_id_fails() {
        let (mut editor, _cache, _gw) = session().await;
        assert!(editor.open(&RecordId::new("missing")).await.is_err());
        assert!(editor.document().is_none());
    }
}
