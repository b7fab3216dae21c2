// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock persistence gateway for deterministic testing.
//!
//! `MockGateway` keeps collections in memory, records every call with the
//! tokio clock reading at which it arrived, and can be told to fail or stall
//! upcoming calls.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use snipvault_core::{
    HealthStatus, PersistenceGateway, Record, RecordId, RecordKind, SnipvaultError, Theme,
};

/// Gateway verb, as recorded in the call log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayOp {
    GetSnippets,
    SaveSnippet,
    DeleteSnippet,
    GetProjects,
    SaveProject,
    DeleteProject,
    GetSetting,
    SaveSetting,
    GetTheme,
    SaveTheme,
}

impl GatewayOp {
    pub fn is_save(&self) -> bool {
        matches!(self, GatewayOp::SaveSnippet | GatewayOp::SaveProject)
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, GatewayOp::DeleteSnippet | GatewayOp::DeleteProject)
    }
}

/// One captured gateway call.
#[derive(Debug, Clone)]
pub struct GatewayCall {
    pub op: GatewayOp,
    pub id: Option<RecordId>,
    /// The saved record, for save calls.
    pub record: Option<Record>,
    pub at: Instant,
}

#[derive(Default)]
struct MockState {
    snippets: BTreeMap<RecordId, Record>,
    projects: BTreeMap<RecordId, Record>,
    settings: HashMap<String, String>,
    theme: Option<Theme>,
    calls: Vec<GatewayCall>,
    failing_saves: usize,
    failing_deletes: usize,
    failing_loads: usize,
    save_delay: Option<Duration>,
    delete_delay: Option<Duration>,
}

impl MockState {
    fn collection_mut(&mut self, kind: RecordKind) -> &mut BTreeMap<RecordId, Record> {
        match kind {
            RecordKind::Snippet => &mut self.snippets,
            RecordKind::Project => &mut self.projects,
        }
    }

    fn sorted(&self, kind: RecordKind) -> Vec<Record> {
        let collection = match kind {
            RecordKind::Snippet => &self.snippets,
            RecordKind::Project => &self.projects,
        };
        let mut records: Vec<Record> = collection.values().cloned().collect();
        records.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));
        records
    }

    fn log(&mut self, op: GatewayOp, id: Option<RecordId>, record: Option<Record>) {
        self.calls.push(GatewayCall {
            op,
            id,
            record,
            at: Instant::now(),
        });
    }
}

/// Take one unit from an injected-failure budget.
fn take(budget: &mut usize) -> bool {
    if *budget > 0 {
        *budget -= 1;
        true
    } else {
        false
    }
}

fn injected(what: &str) -> SnipvaultError {
    SnipvaultError::Storage {
        source: format!("injected {what} failure").into(),
    }
}

/// An in-memory gateway.
#[derive(Clone, Default)]
pub struct MockGateway {
    state: Arc<Mutex<MockState>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-load a record without logging a call.
    pub async fn seed(&self, record: Record) {
        let mut state = self.state.lock().await;
        state
            .collection_mut(record.kind)
            .insert(record.id.clone(), record);
    }

    /// Make the next `n` save calls fail.
    pub async fn fail_saves(&self, n: usize) {
        self.state.lock().await.failing_saves = n;
    }

    /// Make the next `n` delete calls fail.
    pub async fn fail_deletes(&self, n: usize) {
        self.state.lock().await.failing_deletes = n;
    }

    /// Make the next `n` list calls fail.
    pub async fn fail_loads(&self, n: usize) {
        self.state.lock().await.failing_loads = n;
    }

    /// Stall every save call for `delay` before it is applied.
    pub async fn set_save_delay(&self, delay: Option<Duration>) {
        self.state.lock().await.save_delay = delay;
    }

    /// Stall every delete call for `delay` before it is applied.
    pub async fn set_delete_delay(&self, delay: Option<Duration>) {
        self.state.lock().await.delete_delay = delay;
    }

    /// Every call so far, in arrival order.
    pub async fn calls(&self) -> Vec<GatewayCall> {
        self.state.lock().await.calls.clone()
    }

    /// Save calls for `id`, in arrival order.
    pub async fn saves_for(&self, id: &RecordId) -> Vec<GatewayCall> {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .filter(|c| c.op.is_save() && c.id.as_ref() == Some(id))
            .cloned()
            .collect()
    }

    pub async fn save_count(&self) -> usize {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .filter(|c| c.op.is_save())
            .count()
    }

    pub async fn clear_calls(&self) {
        self.state.lock().await.calls.clear();
    }

    /// Current stored records of `kind`, title-ascending.
    pub async fn stored(&self, kind: RecordKind) -> Vec<Record> {
        self.state.lock().await.sorted(kind)
    }

    async fn list_kind(&self, kind: RecordKind) -> Result<Vec<Record>, SnipvaultError> {
        let mut state = self.state.lock().await;
        let op = match kind {
            RecordKind::Snippet => GatewayOp::GetSnippets,
            RecordKind::Project => GatewayOp::GetProjects,
        };
        state.log(op, None, None);
        if take(&mut state.failing_loads) {
            return Err(injected("load"));
        }
        Ok(state.sorted(kind))
    }

    async fn save_kind(&self, kind: RecordKind, record: &Record) -> Result<(), SnipvaultError> {
        let op = match kind {
            RecordKind::Snippet => GatewayOp::SaveSnippet,
            RecordKind::Project => GatewayOp::SaveProject,
        };
        let delay = {
            let mut state = self.state.lock().await;
            state.log(op, Some(record.id.clone()), Some(record.clone()));
            state.save_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().await;
        if take(&mut state.failing_saves) {
            return Err(injected("save"));
        }
        if record.kind != kind {
            return Err(SnipvaultError::Validation(format!(
                "cannot save a {} as a {kind}",
                record.kind
            )));
        }
        if record.title.trim().is_empty() {
            return Err(SnipvaultError::Validation(
                "record has no title and cannot be persisted".into(),
            ));
        }
        state
            .collection_mut(kind)
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn delete_kind(&self, kind: RecordKind, id: &RecordId) -> Result<(), SnipvaultError> {
        let op = match kind {
            RecordKind::Snippet => GatewayOp::DeleteSnippet,
            RecordKind::Project => GatewayOp::DeleteProject,
        };
        let delay = {
            let mut state = self.state.lock().await;
            state.log(op, Some(id.clone()), None);
            state.delete_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().await;
        if take(&mut state.failing_deletes) {
            return Err(injected("delete"));
        }
        state.collection_mut(kind).remove(id);
        Ok(())
    }
}

#[async_trait]
impl PersistenceGateway for MockGateway {
    fn name(&self) -> &str {
        "mock-gateway"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, SnipvaultError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), SnipvaultError> {
        Ok(())
    }

    async fn get_snippets(&self) -> Result<Vec<Record>, SnipvaultError> {
        self.list_kind(RecordKind::Snippet).await
    }

    async fn save_snippet(&self, record: &Record) -> Result<(), SnipvaultError> {
        self.save_kind(RecordKind::Snippet, record).await
    }

    async fn delete_snippet(&self, id: &RecordId) -> Result<(), SnipvaultError> {
        self.delete_kind(RecordKind::Snippet, id).await
    }

    async fn get_projects(&self) -> Result<Vec<Record>, SnipvaultError> {
        self.list_kind(RecordKind::Project).await
    }

    async fn save_project(&self, record: &Record) -> Result<(), SnipvaultError> {
        self.save_kind(RecordKind::Project, record).await
    }

    async fn delete_project(&self, id: &RecordId) -> Result<(), SnipvaultError> {
        self.delete_kind(RecordKind::Project, id).await
    }

    async fn get_setting(&self, key: &str) -> Result<Option<String>, SnipvaultError> {
        let mut state = self.state.lock().await;
        state.log(GatewayOp::GetSetting, None, None);
        Ok(state.settings.get(key).cloned())
    }

    async fn save_setting(&self, key: &str, value: &str) -> Result<(), SnipvaultError> {
        let mut state = self.state.lock().await;
        state.log(GatewayOp::SaveSetting, None, None);
        state.settings.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_theme(&self) -> Result<Option<Theme>, SnipvaultError> {
        let mut state = self.state.lock().await;
        state.log(GatewayOp::GetTheme, None, None);
        Ok(state.theme.clone())
    }

    async fn save_theme(&self, theme: &Theme) -> Result<(), SnipvaultError> {
        let mut state = self.state.lock().await;
        state.log(GatewayOp::SaveTheme, None, None);
        state.theme = Some(theme.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snipvault_core::{Language, TagSet};

    fn snippet(id: &str, title: &str) -> Record {
        Record {
            id: RecordId::new(id),
            title: title.into(),
            code: String::new(),
            language: Language::PlainText,
            timestamp: 0,
            kind: RecordKind::Snippet,
            tags: TagSet::new(),
        }
    }

    #[tokio::test]
    async fn saves_are_listed_title_ascending() {
        let gw = MockGateway::new();
        gw.save_snippet(&snippet("1", "b")).await.unwrap();
        gw.save_snippet(&snippet("2", "a")).await.unwrap();
        let titles: Vec<String> = gw
            .get_snippets()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["a", "b"]);
        assert_eq!(gw.save_count().await, 2);
    }

    #[tokio::test]
    async fn injected_failures_are_consumed() {
        let gw = MockGateway::new();
        gw.fail_saves(1).await;
        assert!(gw.save_snippet(&snippet("1", "x")).await.is_err());
        assert!(gw.save_snippet(&snippet("1", "x")).await.is_ok());
        assert_eq!(gw.saves_for(&RecordId::new("1")).await.len(), 2);
        assert_eq!(gw.stored(RecordKind::Snippet).await.len(), 1);
    }

    #[tokio::test]
    async fn untitled_and_misfiled_records_are_rejected() {
        let gw = MockGateway::new();
        assert!(gw.save_snippet(&snippet("1", "")).await.is_err());
        assert!(gw.save_project(&snippet("2", "p")).await.is_err());
        assert!(gw.stored(RecordKind::Snippet).await.is_empty());
        assert!(gw.stored(RecordKind::Project).await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn save_delay_uses_tokio_clock() {
        let gw = MockGateway::new();
        gw.set_save_delay(Some(Duration::from_millis(500))).await;
        let start = Instant::now();
        gw.save_snippet(&snippet("1", "slow")).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(500));
    }
}
