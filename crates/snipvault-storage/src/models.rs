// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage-side view of the record collections.

use std::fmt;

use snipvault_core::RecordKind;

/// A record table. Settings and theme are key/value tables handled separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Snippets,
    Projects,
}

impl Collection {
    pub fn table(&self) -> &'static str {
        match self {
            Collection::Snippets => "snippets",
            Collection::Projects => "projects",
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            Collection::Snippets => RecordKind::Snippet,
            Collection::Projects => RecordKind::Project,
        }
    }

    /// Only the snippets table carries a `tags` column.
    pub fn has_tags_column(&self) -> bool {
        matches!(self, Collection::Snippets)
    }
}

impl From<RecordKind> for Collection {
    fn from(kind: RecordKind) -> Self {
        match kind {
            RecordKind::Snippet => Collection::Snippets,
            RecordKind::Project => Collection::Projects,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}
