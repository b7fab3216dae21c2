// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Optimistic in-memory mirror of the persisted collections.
//!
//! Saves are merged into the cache before the gateway is called and the
//! gateway's answer decides what happens to the selection. Deletes remove the
//! record immediately and leave a tombstone, so a save that was already in
//! flight can never bring the record back. The tombstone is lifted once the
//! delete and every gateway call started for the id have finished.
//!
//! The state mutex is only held across synchronous sections, never across a
//! gateway call.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use snipvault_config::model::AutosaveConfig;
use snipvault_core::{PersistenceGateway, Record, RecordId, RecordKind, SnipvaultError, TagSet};

use crate::notify::{Notice, Notifier, SuppressReason};
use crate::scheduler::AutosaveScheduler;

/// Per-call save behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveOptions {
    /// Leave the selection untouched even when it mirrors the saved record.
    pub skip_selection_update: bool,
}

/// What became of a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Acknowledged by the gateway. Carries the stamped record.
    Saved(Record),
    /// The record was deleted. Nothing is stored.
    Tombstoned,
    /// An autosave fired but its guards held it back.
    Suppressed(SuppressReason),
}

#[derive(Default)]
struct CacheState {
    snippets: Vec<Record>,
    projects: Vec<Record>,
    selected: Option<Record>,
    tombstones: HashSet<RecordId>,
    /// Gateway calls started and not yet finished, per id.
    in_flight: HashMap<RecordId, usize>,
}

impl CacheState {
    fn collection(&self, kind: RecordKind) -> &Vec<Record> {
        match kind {
            RecordKind::Snippet => &self.snippets,
            RecordKind::Project => &self.projects,
        }
    }

    fn collection_mut(&mut self, kind: RecordKind) -> &mut Vec<Record> {
        match kind {
            RecordKind::Snippet => &mut self.snippets,
            RecordKind::Project => &mut self.projects,
        }
    }

    fn find(&self, id: &RecordId) -> Option<&Record> {
        self.snippets
            .iter()
            .chain(self.projects.iter())
            .find(|r| &r.id == id)
    }

    /// Replace the record with the same id, or prepend it.
    ///
    /// An id lives in one collection only. When the kind changed the old copy
    /// is dropped and its kind returned.
    fn merge(&mut self, record: Record) -> Option<RecordKind> {
        let other = match record.kind {
            RecordKind::Snippet => RecordKind::Project,
            RecordKind::Project => RecordKind::Snippet,
        };
        let moved = {
            let stale = self.collection_mut(other);
            let before = stale.len();
            stale.retain(|r| r.id != record.id);
            (stale.len() != before).then_some(other)
        };
        let collection = self.collection_mut(record.kind);
        match collection.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => collection.insert(0, record),
        }
        moved
    }

    fn begin_call(&mut self, id: &RecordId) {
        *self.in_flight.entry(id.clone()).or_default() += 1;
    }

    /// Finish one gateway call for `id`. The last one lifts its tombstone.
    fn finish_call(&mut self, id: &RecordId) {
        let Some(count) = self.in_flight.get_mut(id) else {
            return;
        };
        *count -= 1;
        if *count == 0 {
            self.in_flight.remove(id);
            if self.tombstones.remove(id) {
                debug!(%id, "tombstone lifted");
            }
        }
    }

    /// Remove `id` from whichever collection holds it.
    fn remove(&mut self, id: &RecordId) -> Option<Record> {
        for kind in [RecordKind::Snippet, RecordKind::Project] {
            let collection = self.collection_mut(kind);
            if let Some(pos) = collection.iter().position(|r| &r.id == id) {
                return Some(collection.remove(pos));
            }
        }
        None
    }

    fn selection_is(&self, id: &RecordId) -> bool {
        self.selected.as_ref().is_some_and(|s| &s.id == id)
    }
}

/// Client-side cache and reconciliation against a [`PersistenceGateway`].
pub struct ClientCache {
    gateway: Arc<dyn PersistenceGateway>,
    state: Mutex<CacheState>,
    scheduler: AutosaveScheduler,
    notifier: Notifier,
    autosave_enabled: bool,
    /// Handle to ourselves for timer tasks. Empty unless built through
    /// [`ClientCache::new`].
    this: Weak<ClientCache>,
}

impl ClientCache {
    pub fn new(gateway: Arc<dyn PersistenceGateway>, autosave: &AutosaveConfig) -> Arc<Self> {
        Self::with_notifier(gateway, autosave, Notifier::default())
    }

    pub fn with_notifier(
        gateway: Arc<dyn PersistenceGateway>,
        autosave: &AutosaveConfig,
        notifier: Notifier,
    ) -> Arc<Self> {
        let quiet_period = Duration::from_millis(autosave.quiet_period_ms);
        Arc::new_cyclic(|this| Self {
            gateway,
            state: Mutex::new(CacheState::default()),
            scheduler: AutosaveScheduler::new(quiet_period),
            notifier,
            autosave_enabled: autosave.enabled,
            this: this.clone(),
        })
    }

    pub fn gateway(&self) -> &Arc<dyn PersistenceGateway> {
        &self.gateway
    }

    pub fn scheduler(&self) -> &AutosaveScheduler {
        &self.scheduler
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.notifier.subscribe()
    }

    /// Reload both collections from the gateway.
    ///
    /// Tombstoned ids are dropped. The selection survives if its record is
    /// still present and is refreshed to the loaded copy.
    pub async fn refresh_all(&self) -> Result<(), SnipvaultError> {
        let loaded = async {
            let snippets = self.gateway.get_snippets().await?;
            let projects = self.gateway.get_projects().await?;
            Ok::<_, SnipvaultError>((snippets, projects))
        }
        .await;
        let (snippets, projects) = match loaded {
            Ok(loaded) => loaded,
            Err(err) => {
                warn!(error = %err, "failed to load collections");
                self.notifier.publish(Notice::LoadFailed {
                    message: err.to_string(),
                });
                return Err(err);
            }
        };

        let mut state = self.state.lock().await;
        let CacheState {
            tombstones,
            snippets: cached_snippets,
            projects: cached_projects,
            ..
        } = &mut *state;
        *cached_snippets = snippets
            .into_iter()
            .filter(|r| !tombstones.contains(&r.id))
            .collect();
        *cached_projects = projects
            .into_iter()
            .filter(|r| !tombstones.contains(&r.id))
            .collect();
        let selected = state.selected.take();
        state.selected = selected.and_then(|s| state.find(&s.id).cloned());
        info!(
            snippets = state.snippets.len(),
            projects = state.projects.len(),
            "collections loaded"
        );
        Ok(())
    }

    /// Explicit save. Cancels any pending autosave for the record first.
    pub async fn save(
        &self,
        record: Record,
        options: SaveOptions,
    ) -> Result<SaveOutcome, SnipvaultError> {
        self.scheduler.cancel(&record.id);
        self.persist(record, options).await
    }

    /// Save fired by the autosave timer. Held back when the record has no
    /// title, is being deleted, or is no longer in the cache.
    pub async fn autosave(&self, record: Record) -> Result<SaveOutcome, SnipvaultError> {
        let reason = if record.title.trim().is_empty() {
            Some(SuppressReason::Untitled)
        } else {
            let state = self.state.lock().await;
            if state.tombstones.contains(&record.id) {
                Some(SuppressReason::PendingDeletion)
            } else if state.find(&record.id).is_none() {
                Some(SuppressReason::UnknownRecord)
            } else {
                None
            }
        };
        if let Some(reason) = reason {
            debug!(id = %record.id, %reason, "autosave suppressed");
            self.notifier.publish(Notice::AutosaveSuppressed {
                id: record.id.clone(),
                reason,
            });
            return Ok(SaveOutcome::Suppressed(reason));
        }
        self.persist(
            record,
            SaveOptions {
                skip_selection_update: true,
            },
        )
        .await
    }

    /// Arm the debounce timer for `record`, replacing any pending one.
    ///
    /// The record captured here is what gets saved when the timer fires.
    /// Does nothing when autosave is disabled.
    pub fn schedule_autosave(&self, record: Record) {
        if !self.autosave_enabled {
            return;
        }
        let cache = self.this.clone();
        let id = record.id.clone();
        self.scheduler.arm(id, async move {
            if let Some(cache) = cache.upgrade() {
                // Failures are published and logged inside.
                let _ = cache.autosave(record).await;
            }
        });
    }

    async fn persist(
        &self,
        mut record: Record,
        options: SaveOptions,
    ) -> Result<SaveOutcome, SnipvaultError> {
        if record.title.trim().is_empty() {
            return Err(SnipvaultError::Validation(
                "a record needs a name before it can be saved".into(),
            ));
        }
        record.touch();

        let (previous_selection, moved_from) = {
            let mut state = self.state.lock().await;
            if state.tombstones.contains(&record.id) {
                debug!(id = %record.id, "save rejected: record was deleted");
                return Ok(SaveOutcome::Tombstoned);
            }
            let moved_from = state.merge(record.clone());
            state.begin_call(&record.id);
            let previous = state.selected.clone();
            if !options.skip_selection_update && state.selection_is(&record.id) {
                state.selected = Some(record.clone());
            }
            (previous, moved_from)
        };

        match self.gateway.save(&record).await {
            Ok(()) => {
                let deleted_meanwhile = {
                    let mut state = self.state.lock().await;
                    let deleted = state.tombstones.contains(&record.id);
                    if !deleted {
                        state.finish_call(&record.id);
                    }
                    deleted
                };
                if deleted_meanwhile {
                    warn!(id = %record.id, "save landed after delete, removing it again");
                    let undone = self.gateway.delete(record.kind, &record.id).await;
                    self.state.lock().await.finish_call(&record.id);
                    if let Err(err) = undone {
                        self.notifier.publish(Notice::DeleteFailed {
                            id: record.id.clone(),
                            message: err.to_string(),
                        });
                        return Err(err);
                    }
                    return Ok(SaveOutcome::Tombstoned);
                }
                if let Some(old_kind) = moved_from {
                    self.drop_stale_copy(old_kind, &record.id).await;
                }
                debug!(id = %record.id, kind = %record.kind, "record saved");
                self.notifier.publish(Notice::Saved {
                    id: record.id.clone(),
                    kind: record.kind,
                });
                Ok(SaveOutcome::Saved(record))
            }
            Err(err) => {
                warn!(id = %record.id, error = %err, "save failed");
                {
                    let mut state = self.state.lock().await;
                    state.finish_call(&record.id);
                    if state.selected.as_ref() == Some(&record) {
                        state.selected = previous_selection;
                    }
                }
                self.notifier.publish(Notice::SaveFailed {
                    id: record.id.clone(),
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Remove the stored copy left under `kind` after a record changed kind.
    async fn drop_stale_copy(&self, kind: RecordKind, id: &RecordId) {
        if let Err(err) = self.gateway.delete(kind, id).await {
            warn!(%id, %kind, error = %err, "failed to remove copy under previous kind");
            self.notifier.publish(Notice::DeleteFailed {
                id: id.clone(),
                message: err.to_string(),
            });
        }
    }

    /// Delete a record everywhere.
    ///
    /// Returns `Ok(false)` for ids the cache does not know. A failed gateway
    /// delete is reported but the record stays out of the views until the
    /// next [`refresh_all`](Self::refresh_all).
    pub async fn delete(&self, id: &RecordId) -> Result<bool, SnipvaultError> {
        self.scheduler.cancel(id);

        let removed = {
            let mut state = self.state.lock().await;
            let Some(removed) = state.remove(id) else {
                return Ok(false);
            };
            state.tombstones.insert(id.clone());
            state.begin_call(id);
            if state.selection_is(id) {
                state.selected = state.collection(removed.kind).first().cloned();
            }
            removed
        };

        let result = self.gateway.delete(removed.kind, id).await;
        {
            let mut state = self.state.lock().await;
            if result.is_err() {
                state.tombstones.remove(id);
            }
            state.finish_call(id);
        }
        match result {
            Ok(()) => {
                info!(%id, kind = %removed.kind, "record deleted");
                self.notifier.publish(Notice::Deleted {
                    id: id.clone(),
                    kind: removed.kind,
                });
                Ok(true)
            }
            Err(err) => {
                warn!(%id, error = %err, "delete failed");
                self.notifier.publish(Notice::DeleteFailed {
                    id: id.clone(),
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Select a cached record. Returns it, or `None` (selection unchanged) if
    /// the id is unknown.
    pub async fn select(&self, id: &RecordId) -> Option<Record> {
        let mut state = self.state.lock().await;
        let record = state.find(id).cloned()?;
        state.selected = Some(record.clone());
        Some(record)
    }

    pub async fn clear_selection(&self) {
        self.state.lock().await.selected = None;
    }

    pub async fn selected(&self) -> Option<Record> {
        self.state.lock().await.selected.clone()
    }

    pub async fn snippets(&self) -> Vec<Record> {
        self.state.lock().await.snippets.clone()
    }

    pub async fn projects(&self) -> Vec<Record> {
        self.state.lock().await.projects.clone()
    }

    pub async fn list(&self, kind: RecordKind) -> Vec<Record> {
        self.state.lock().await.collection(kind).clone()
    }

    pub async fn get(&self, id: &RecordId) -> Option<Record> {
        self.state.lock().await.find(id).cloned()
    }

    pub async fn contains(&self, id: &RecordId) -> bool {
        self.state.lock().await.find(id).is_some()
    }

    /// Records of `kind` whose title or language contains `term`, ignoring case.
    pub async fn search(&self, kind: RecordKind, term: &str) -> Vec<Record> {
        let term = term.trim().to_lowercase();
        let state = self.state.lock().await;
        state
            .collection(kind)
            .iter()
            .filter(|r| {
                term.is_empty()
                    || r.title.to_lowercase().contains(&term)
                    || r.language.as_str().contains(&term)
            })
            .cloned()
            .collect()
    }

    /// Every tag used by any cached record.
    pub async fn all_tags(&self) -> TagSet {
        let state = self.state.lock().await;
        let mut tags = TagSet::new();
        for record in state.snippets.iter().chain(state.projects.iter()) {
            tags.extend(&record.tags);
        }
        tags
    }

    /// Records of any kind carrying `tag`.
    pub async fn with_tag(&self, tag: &str) -> Vec<Record> {
        let state = self.state.lock().await;
        state
            .snippets
            .iter()
            .chain(state.projects.iter())
            .filter(|r| r.tags.contains(tag))
            .cloned()
            .collect()
    }

    /// Resolve an `@mention` against snippets first, then projects.
    pub async fn resolve_mention(&self, token: &str) -> Option<Record> {
        let state = self.state.lock().await;
        snipvault_inference::resolve_mention(
            token,
            state.snippets.iter().chain(state.projects.iter()),
        )
        .cloned()
    }

    /// Cancel every pending autosave and shut the gateway down.
    pub async fn shutdown(&self) -> Result<(), SnipvaultError> {
        self.scheduler.cancel_all();
        self.gateway.shutdown().await
    }
}
