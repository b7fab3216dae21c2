// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for the record collections and the key/value tables.

pub mod records;
pub mod settings;
pub mod theme;
