// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Snipvault.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Snipvault configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SnipvaultConfig {
    /// Durable store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Debounced autosave settings.
    #[serde(default)]
    pub autosave: AutosaveConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Backup/export document settings.
    #[serde(default)]
    pub export: ExportConfig,
}

/// Durable store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// How long a statement waits on a locked database before failing.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("snipvault").join("snippets.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("snippets.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

/// Autosave scheduler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AutosaveConfig {
    /// Whether edits arm a debounce timer at all.
    #[serde(default = "default_autosave_enabled")]
    pub enabled: bool,

    /// Quiet period after the last edit before the save fires.
    #[serde(default = "default_quiet_period_ms")]
    pub quiet_period_ms: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            enabled: default_autosave_enabled(),
            quiet_period_ms: default_quiet_period_ms(),
        }
    }
}

fn default_autosave_enabled() -> bool {
    true
}

fn default_quiet_period_ms() -> u64 {
    1000
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Export document configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    /// Value written to the `version` field of exported documents.
    #[serde(default = "default_export_version")]
    pub version: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            version: default_export_version(),
        }
    }
}

fn default_export_version() -> String {
    "1.0.0".to_string()
}
