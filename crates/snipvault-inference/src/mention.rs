// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `@mention` tokens that link one record to another by name.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use snipvault_core::Record;

static MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([A-Za-z0-9._-]+)").unwrap());

/// Mention tokens in `text`, without the `@`, in order of first appearance.
///
/// Tokens differing only in case count as one.
pub fn extract_mentions(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    MENTION
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|token| seen.insert(token.to_lowercase()))
        .collect()
}

/// Find the record a mention token refers to.
///
/// The token (with or without its leading `@`) matches a record whose slug
/// or lowercase title equals it case-insensitively. The first match in
/// iteration order wins.
pub fn resolve_mention<'a, I>(token: &str, records: I) -> Option<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    let wanted = token.trim().trim_start_matches('@').to_lowercase();
    if wanted.is_empty() {
        return None;
    }
    records
        .into_iter()
        .find(|r| r.slug() == wanted || r.title.to_lowercase() == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use snipvault_core::{Language, RecordId, RecordKind, TagSet};

    fn titled(id: &str, title: &str) -> Record {
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

    #[test]
    fn slug_match_resolves() {
        let records = vec![titled("1", "Other"), titled("2", "Hello World")];
        let found = resolve_mention("@hello-world", &records).unwrap();
        assert_eq!(found.id.as_str(), "2");
    }

    #[test]
    fn lowercase_title_match_resolves() {
        let records = vec![titled("1", "utils.py")];
        assert!(resolve_mention("Utils.py", &records).is_some());
    }

    #[test]
    fn unknown_token_is_none() {
        let records = vec![titled("1", "Hello World")];
        assert!(resolve_mention("@nonexistent", &records).is_none());
        assert!(resolve_mention("@", &records).is_none());
    }

    #[test]
    fn mentions_are_listed_once_in_order() {
        let tokens = extract_mentions("see @b-note then @A.md and @B-NOTE again");
        assert_eq!(tokens, vec!["b-note".to_string(), "A.md".to_string()]);
    }
}
