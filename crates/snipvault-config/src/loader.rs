// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./snipvault.toml` > `~/.config/snipvault/snipvault.toml`
//! > `/etc/snipvault/snipvault.toml` with environment variable overrides via the
//! `SNIPVAULT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::SnipvaultConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/snipvault/snipvault.toml` (system-wide)
/// 3. `~/.config/snipvault/snipvault.toml` (user XDG config)
/// 4. `./snipvault.toml` (local directory)
/// 5. `SNIPVAULT_*` environment variables
pub fn load_config() -> Result<SnipvaultConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<SnipvaultConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SnipvaultConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SnipvaultConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SnipvaultConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for XDG config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(SnipvaultConfig::default()))
        .merge(Toml::file("/etc/snipvault/snipvault.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("snipvault/snipvault.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("snipvault.toml"))
        .merge(env_provider())
}

/// Environment provider with explicit section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `SNIPVAULT_STORAGE_BUSY_TIMEOUT_MS` must map to
/// `storage.busy_timeout_ms`, not `storage.busy.timeout.ms`.
fn env_provider() -> Env {
    Env::prefixed("SNIPVAULT_").map(|key| {
        let mapped = key
            .as_str()
            .to_ascii_lowercase()
            .replacen("storage_", "storage.", 1)
            .replacen("autosave_", "autosave.", 1)
            .replacen("logging_", "logging.", 1)
            .replacen("export_", "export.", 1);
        mapped.into()
    })
}
