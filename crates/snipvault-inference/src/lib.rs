// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure content inference for Snipvault records.
//!
//! Everything here is a total function of its inputs: no I/O, no errors.
//! Unclassifiable content degrades to plain text and text without hashtags
//! yields an empty tag set.

pub mod language;
pub mod mention;
pub mod tags;
pub mod title;

pub use language::{detect_language, language_for_extension, language_for_title, resolve_language};
pub use mention::{extract_mentions, resolve_mention};
pub use tags::extract_tags;
pub use title::{normalize_title, rename, UNTITLED};
