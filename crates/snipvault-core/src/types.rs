// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the store, the gateway, and the sync layer.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::SnipvaultError;

/// Fixed primary key of the single theme row.
pub const CURRENT_THEME_ID: &str = "current";

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

static LAST_ISSUED_ID: AtomicI64 = AtomicI64::new(0);

/// Opaque, immutable record identifier.
///
/// Generated ids are epoch milliseconds, bumped past the last issued value
/// so two records created within the same millisecond never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Issue a fresh time-derived id.
    pub fn generate() -> Self {
        let now = now_millis();
        let mut last = LAST_ISSUED_ID.load(Ordering::Relaxed);
        loop {
            let next = now.max(last + 1);
            match LAST_ISSUED_ID.compare_exchange_weak(
                last,
                next,
                Ordering::SeqCst,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Self(next.to_string()),
                Err(observed) => last = observed,
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Discriminator stored in the `type` column.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Snippet,
    Project,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Short language token attached to every record.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
pub enum Language {
    #[strum(serialize = "html")]
    #[serde(rename = "html")]
    Html,
    #[strum(serialize = "py")]
    #[serde(rename = "py")]
    Python,
    #[strum(serialize = "js")]
    #[serde(rename = "js")]
    JavaScript,
    #[strum(serialize = "css")]
    #[serde(rename = "css")]
    Css,
    #[strum(serialize = "json")]
    #[serde(rename = "json")]
    Json,
    #[strum(serialize = "sql")]
    #[serde(rename = "sql")]
    Sql,
    #[strum(serialize = "cpp")]
    #[serde(rename = "cpp")]
    Cpp,
    #[strum(serialize = "java")]
    #[serde(rename = "java")]
    Java,
    #[strum(serialize = "sh")]
    #[serde(rename = "sh")]
    Shell,
    #[strum(serialize = "md")]
    #[serde(rename = "md")]
    Markdown,
    #[default]
    #[strum(serialize = "txt")]
    #[serde(rename = "txt", alias = "text")]
    PlainText,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Parse a stored token, degrading unknown tokens to plain text.
    pub fn from_token(token: &str) -> Self {
        token
            .trim()
            .to_ascii_lowercase()
            .parse()
            .unwrap_or(Language::PlainText)
    }
}

/// Duplicate-free, order-independent set of lowercase hashtag tokens.
///
/// Serialized as a comma-delimited string in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TagSet(BTreeSet<String>);

impl TagSet {
    pub const DELIMITER: char = ',';

    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Parse the stored form. Whitespace is accepted as a delimiter too.
    pub fn from_delimited(raw: &str) -> Self {
        raw.split(|c: char| c == Self::DELIMITER || c.is_whitespace())
            .map(|t| t.trim_start_matches('#'))
            .filter(|t| !t.is_empty())
            .collect()
    }

    pub fn to_delimited(&self) -> String {
        let mut out = String::new();
        for (i, tag) in self.0.iter().enumerate() {
            if i > 0 {
                out.push(Self::DELIMITER);
            }
            out.push_str(tag);
        }
        out
    }

    pub fn insert(&mut self, tag: &str) -> bool {
        self.0.insert(tag.to_lowercase())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(&tag.to_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn extend(&mut self, other: &TagSet) {
        self.0.extend(other.0.iter().cloned());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(|t| t.as_ref().to_lowercase()).collect())
    }
}

impl From<String> for TagSet {
    fn from(value: String) -> Self {
        TagSet::from_delimited(&value)
    }
}

impl From<TagSet> for String {
    fn from(value: TagSet) -> Self {
        value.to_delimited()
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_delimited())
    }
}

/// A snippet or project with a non-empty title. Only records reach the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub title: String,
    pub code: String,
    pub language: Language,
    /// Last persisted write, epoch milliseconds.
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    #[serde(default)]
    pub tags: TagSet,
}

impl Record {
    /// Advance the timestamp to now, never moving it backwards.
    pub fn touch(&mut self) {
        self.timestamp = now_millis().max(self.timestamp);
    }

    /// Lowercase title with whitespace runs collapsed to hyphens.
    pub fn slug(&self) -> String {
        self.title
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
    }
}

/// Unnamed, in-progress record. Never sent to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub id: RecordId,
    pub kind: RecordKind,
    pub code: String,
    pub language: Language,
    pub tags: TagSet,
    pub created_at: i64,
}

impl Draft {
    pub fn new(kind: RecordKind) -> Self {
        Self {
            id: RecordId::generate(),
            kind,
            code: String::new(),
            language: Language::PlainText,
            tags: TagSet::new(),
            created_at: now_millis(),
        }
    }

    /// Promote the draft to a record. The title must be non-empty after trimming.
    pub fn into_record(
        self,
        title: &str,
        language: Language,
    ) -> Result<Record, SnipvaultError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(SnipvaultError::Validation(
                "a draft cannot be saved without a name".into(),
            ));
        }
        Ok(Record {
            id: self.id,
            title: title.to_string(),
            code: self.code,
            language,
            timestamp: now_millis().max(self.created_at),
            kind: self.kind,
            tags: self.tags,
        })
    }
}

/// What an editor has open: either an unnamed draft or a real record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Document {
    Draft(Draft),
    Persisted(Record),
}

impl Document {
    pub fn id(&self) -> &RecordId {
        match self {
            Document::Draft(d) => &d.id,
            Document::Persisted(r) => &r.id,
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            Document::Draft(d) => d.kind,
            Document::Persisted(r) => r.kind,
        }
    }

    /// Empty for drafts.
    pub fn title(&self) -> &str {
        match self {
            Document::Draft(_) => "",
            Document::Persisted(r) => &r.title,
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Document::Draft(d) => &d.code,
            Document::Persisted(r) => &r.code,
        }
    }

    pub fn language(&self) -> Language {
        match self {
            Document::Draft(d) => d.language,
            Document::Persisted(r) => r.language,
        }
    }

    pub fn is_draft(&self) -> bool {
        matches!(self, Document::Draft(_))
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Document::Draft(_) => None,
            Document::Persisted(r) => Some(r),
        }
    }
}

/// Lifecycle position of an editor document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum DraftState {
    /// In memory only, no title.
    Unnamed,
    /// Title assigned, first save not yet acknowledged.
    NamedUnsaved,
    /// Round-tripped through the gateway at least once.
    Persisted,
    /// Terminal.
    Deleted,
}

/// The single palette row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub id: String,
    pub name: String,
    /// Opaque palette payload (JSON text in practice).
    pub colors: String,
}

impl Theme {
    pub fn current(name: impl Into<String>, colors: impl Into<String>) -> Self {
        Self {
            id: CURRENT_THEME_ID.to_string(),
            name: name.into(),
            colors: colors.into(),
        }
    }
}

/// Health status reported by gateway health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}
