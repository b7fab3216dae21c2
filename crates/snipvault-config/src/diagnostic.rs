// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment errors as miette diagnostics.
//!
//! Unknown keys are reported against the `snipvault.toml` section they
//! appeared in. The suggestion comes from that section's keys, or points at
//! the section the key actually belongs to.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity for a "did you mean" hint.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// Keys accepted in each section.
pub const SECTIONS: &[(&str, &[&str])] = &[
    ("storage", &["database_path", "wal_mode", "busy_timeout_ms"]),
    ("autosave", &["enabled", "quiet_period_ms"]),
    ("logging", &["level"]),
    ("export", &["version"]),
];

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown key `{key}` in {location}")]
    #[diagnostic(code(snipvault::config::unknown_key), help("{help}"))]
    UnknownKey {
        key: String,
        /// `[section]`, or `the top level`.
        location: String,
        suggestion: Option<String>,
        help: String,
        #[label("not recognized here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("wrong type for `{key}`: {detail}")]
    #[diagnostic(code(snipvault::config::invalid_type))]
    InvalidType { key: String, detail: String },

    #[error("validation error: {message}")]
    #[diagnostic(code(snipvault::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(snipvault::config::other))]
    Other(String),
}

fn section_keys(section: &str) -> Option<&'static [&'static str]> {
    SECTIONS
        .iter()
        .find(|(name, _)| *name == section)
        .map(|(_, keys)| *keys)
}

/// The section that declares `key`, if any.
fn home_section(key: &str) -> Option<&'static str> {
    SECTIONS
        .iter()
        .find(|(_, keys)| keys.contains(&key))
        .map(|(name, _)| *name)
}

/// Build the diagnostic for `key` found in `section` (`None` at the top level).
pub fn unknown_key(section: Option<&str>, key: &str) -> ConfigError {
    let valid: Vec<&str> = match section.and_then(section_keys) {
        Some(keys) => keys.to_vec(),
        None => SECTIONS.iter().map(|(name, _)| *name).collect(),
    };
    let location = section.map_or_else(|| "the top level".to_string(), |s| format!("[{s}]"));
    let (suggestion, help) = match home_section(key) {
        Some(home) => (None, format!("`{key}` belongs under [{home}]")),
        None => {
            let suggestion = suggest_key(key, &valid);
            let accepted = format!("{location} accepts: {}", valid.join(", "));
            let help = match &suggestion {
                Some(s) => format!("did you mean `{s}`? {accepted}"),
                None => accepted,
            };
            (suggestion, help)
        }
    };
    ConfigError::UnknownKey {
        key: key.to_string(),
        location,
        suggestion,
        help,
        span: None,
        src: None,
    }
}

/// Convert every error carried by a `figment::Error`.
///
/// `toml_sources` pairs file paths with their contents so unknown keys can be
/// pointed at in the file they came from.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| match &error.kind {
            Kind::UnknownField(field, _) => {
                let section = error.path.first().map(String::as_str);
                let mut diagnostic = unknown_key(section, field);
                if let ConfigError::UnknownKey { span, src, .. } = &mut diagnostic
                    && let Some((path, content)) = source_of(&error, toml_sources)
                    && let Some(offset) = locate_key(content, section, field)
                {
                    *span = Some(SourceSpan::new(offset.into(), field.len()));
                    *src = Some(NamedSource::new(path, content.to_string()));
                }
                diagnostic
            }
            Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
                key: error.path.join("."),
                detail: format!("found {actual}, expected {expected}"),
            },
            _ => ConfigError::Other(error.to_string()),
        })
        .collect()
}

/// The TOML file an error was read from, when it came from a file.
fn source_of<'a>(
    error: &figment::error::Error,
    toml_sources: &'a [(String, String)],
) -> Option<(&'a str, &'a str)> {
    let path = match error.metadata.as_ref()?.source.as_ref()? {
        figment::Source::File(path) => path.display().to_string(),
        _ => return None,
    };
    toml_sources
        .iter()
        .find(|(p, _)| *p == path)
        .map(|(p, content)| (p.as_str(), content.as_str()))
}

/// Byte offset of `key` inside `section` of a TOML document.
///
/// At the top level (`section` is `None`) a table header named `key` counts
/// too, so an unknown `[section]` can be pointed at.
pub fn locate_key(content: &str, section: Option<&str>, key: &str) -> Option<usize> {
    let mut current: Option<&str> = None;
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let indent = line.len() - line.trim_start().len();
        let trimmed = line.trim();
        if let Some(header) = trimmed.strip_prefix('[') {
            current = header.split(']').next().map(str::trim);
            if section.is_none() && current == Some(key) {
                return Some(offset + indent + 1);
            }
        } else if current == section
            && let Some(rest) = trimmed.strip_prefix(key)
            && rest.trim_start().starts_with('=')
        {
            return Some(offset + indent);
        }
        offset += line.len();
    }
    None
}

/// Best Jaro-Winkler match above the threshold.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Render errors to stderr with miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        match handler.render_report(&mut buf, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{buf}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}
