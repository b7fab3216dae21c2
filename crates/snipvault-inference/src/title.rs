// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Title normalization and rename.

use snipvault_core::Record;

use crate::language::resolve_language;

/// Title given to a record renamed to nothing.
pub const UNTITLED: &str = "Untitled";

/// Trim `name`, falling back to [`UNTITLED`] when nothing is left.
pub fn normalize_title(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        UNTITLED.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Retitle `record` and re-derive its language from the new title and its code.
pub fn rename(record: &Record, new_name: &str) -> Record {
    let title = normalize_title(new_name);
    let language = resolve_language(&title, &record.code);
    Record {
        title,
        language,
        ..record.clone()
    }
}
