// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty paths and bounded timer durations.

use crate::diagnostic::ConfigError;
use crate::model::SnipvaultConfig;

/// Upper bound for the SQLite busy timeout.
pub const MAX_BUSY_TIMEOUT_MS: u64 = 60_000;

/// Accepted autosave quiet periods.
pub const QUIET_PERIOD_RANGE_MS: std::ops::RangeInclusive<u64> = 50..=60_000;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &SnipvaultConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.storage.busy_timeout_ms > MAX_BUSY_TIMEOUT_MS {
        errors.push(ConfigError::Validation {
            message: format!(
                "storage.busy_timeout_ms must be at most {MAX_BUSY_TIMEOUT_MS}, got {}",
                config.storage.busy_timeout_ms
            ),
        });
    }

    if !QUIET_PERIOD_RANGE_MS.contains(&config.autosave.quiet_period_ms) {
        errors.push(ConfigError::Validation {
            message: format!(
                "autosave.quiet_period_ms must be between {} and {}, got {}",
                QUIET_PERIOD_RANGE_MS.start(),
                QUIET_PERIOD_RANGE_MS.end(),
                config.autosave.quiet_period_ms
            ),
        });
    }

    let level = config.logging.level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.level `{}` is not one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.export.version.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "export.version must not be empty".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = SnipvaultConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = SnipvaultConfig::default();
        config.storage.database_path = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "database_path"));
    }

    #[test]
    fn oversized_busy_timeout_fails_validation() {
        let mut config = SnipvaultConfig::default();
        config.storage.busy_timeout_ms = 120_000;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "busy_timeout_ms"));
    }

    #[test]
    fn quiet_period_out_of_range_fails_validation() {
        let mut config = SnipvaultConfig::default();
        config.autosave.quiet_period_ms = 10;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "quiet_period_ms"));
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let mut config = SnipvaultConfig::default();
        config.logging.level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "logging.level"));
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let mut config = SnipvaultConfig::default();
        config.logging.level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = SnipvaultConfig::default();
        config.storage.database_path = String::new();
        config.autosave.quiet_period_ms = 0;
        config.export.version = String::new();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
