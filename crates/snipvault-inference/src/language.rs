// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Language detection.
//!
//! A title carrying a known file extension decides the language outright.
//! Otherwise the content runs through an ordered classifier chain where the
//! first matching classifier wins.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use snipvault_core::Language;

/// A content test paired with the language it implies.
pub struct Classifier {
    pub name: &'static str,
    pattern: Regex,
}

impl Classifier {
    fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).unwrap(),
        }
    }

    pub fn matches(&self, code: &str) -> bool {
        self.pattern.is_match(code)
    }
}

/// Classifier chain, evaluated top to bottom.
static CHAIN: LazyLock<Vec<(Classifier, Language)>> = LazyLock::new(|| {
    vec![
        (
            Classifier::new("markup", r"(?i)^\s*<\w|<!DOCTYPE|<html[\s>]"),
            Language::Html,
        ),
        (
            Classifier::new(
                "python-keywords",
                r"\b(def|import\s+\w+|from\s+\w+|elif|except|with)\b|\bprint\(",
            ),
            Language::Python,
        ),
        (
            Classifier::new(
                "javascript-keywords",
                r"\b(function|const|let|var|console\.log|class\s+\w+)\b|=>",
            ),
            Language::JavaScript,
        ),
        // A brace block only counts as CSS when it holds a `prop: value;`
        // declaration, so JSON objects fall through to the next classifier.
        (
            Classifier::new(
                "stylesheet",
                r"\{[^{}]*[\w-]+\s*:\s*[^;{}]+;[^{}]*\}|:\s*\w+;|@media|--[a-z-]+:",
            ),
            Language::Css,
        ),
        (
            Classifier::new("json-shape", r#"\{\s*"|\[\s*\{|\}\s*\]"#),
            Language::Json,
        ),
        (
            Classifier::new(
                "sql-statement",
                r"(?i)^(SELECT|INSERT|UPDATE|DELETE|CREATE|ALTER)\b",
            ),
            Language::Sql,
        ),
        (
            Classifier::new("cpp", r"#include\s+<|std::|int\s+main\s*\("),
            Language::Cpp,
        ),
        (
            Classifier::new(
                "java",
                r"\bpublic\s+class\b|System\.out\.println|package\s+\w+",
            ),
            Language::Java,
        ),
        (
            Classifier::new("shell", r"^#!.*(bash|sh)|\becho\b|\bcd\b|\bfi\b"),
            Language::Shell,
        ),
        (
            Classifier::new("markdown", r"(?m)^(# |## |### |> |\* |\d+\. )"),
            Language::Markdown,
        ),
    ]
});

/// Extension table. Lookups are case-insensitive.
const EXTENSIONS: &[(&[&str], Language)] = &[
    (&["html", "htm"], Language::Html),
    (&["py"], Language::Python),
    (&["js", "jsx", "mjs", "cjs", "ts", "tsx"], Language::JavaScript),
    (&["css"], Language::Css),
    (&["json"], Language::Json),
    (&["sql"], Language::Sql),
    (&["cpp", "cc", "cxx", "hpp", "hh", "h", "c"], Language::Cpp),
    (&["java"], Language::Java),
    (&["sh", "bash", "zsh"], Language::Shell),
    (&["md", "markdown"], Language::Markdown),
    (&["txt", "text"], Language::PlainText),
];

/// Infer the language of `code` from its content alone.
pub fn detect_language(code: &str) -> Language {
    if code.trim().is_empty() {
        return Language::PlainText;
    }
    for (classifier, language) in CHAIN.iter() {
        if classifier.matches(code) {
            trace!(classifier = classifier.name, %language, "content classified");
            return *language;
        }
    }
    Language::PlainText
}

/// Map a bare extension (without the dot) to a language.
pub fn language_for_extension(ext: &str) -> Option<Language> {
    let ext = ext.to_ascii_lowercase();
    EXTENSIONS
        .iter()
        .find(|(exts, _)| exts.contains(&ext.as_str()))
        .map(|(_, language)| *language)
}

/// Language implied by a title's file extension, if the extension is known.
///
/// Dotfiles such as `.bashrc` have no extension.
pub fn language_for_title(title: &str) -> Option<Language> {
    let (stem, ext) = title.trim().rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    language_for_extension(ext)
}

/// The language of a record with this title and code.
pub fn resolve_language(title: &str, code: &str) -> Language {
    language_for_title(title).unwrap_or_else(|| detect_language(code))
}
