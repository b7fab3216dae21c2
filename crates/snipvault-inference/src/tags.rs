// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hashtag extraction.

use std::sync::LazyLock;

use regex::Regex;

use snipvault_core::TagSet;

static HASHTAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#([A-Za-z0-9_-]+)").unwrap());

/// Collect the lowercase hashtags in `code`.
pub fn extract_tags(code: &str) -> TagSet {
    HASHTAG
        .captures_iter(code)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn duplicates_fold_case_insensitively() {
        let tags = extract_tags("hello #foo #FOO #bar");
        assert_eq!(tags.to_delimited(), "bar,foo");
    }

    #[test]
    fn hyphens_and_underscores_are_kept() {
        let tags = extract_tags("#snake_case and #kebab-case!");
        assert!(tags.contains("snake_case"));
        assert!(tags.contains("kebab-case"));
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn no_hashtags_yields_empty_set() {
        assert!(extract_tags("").is_empty());
        assert!(extract_tags("a # b ##").is_empty());
    }

    proptest! {
        #[test]
        fn repeating_the_text_changes_nothing(code in "[a-z #_-]{0,64}") {
            let doubled = format!("{code} {code}");
            prop_assert_eq!(extract_tags(&doubled), extract_tags(&code));
        }

        #[test]
        fn every_tag_is_lowercase(code in "\\PC{0,64}") {
            for tag in extract_tags(&code).iter() {
                prop_assert_eq!(tag.to_lowercase(), tag);
            }
        }
    }
}
