// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for Snipvault.

use thiserror::Error;

use crate::types::DraftState;

/// The error type used across the gateway trait, the store, and the sync layer.
#[derive(Debug, Error)]
pub enum SnipvaultError {
    /// Configuration errors (invalid TOML, failed validation).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage failures other than lock contention (disk error, bad SQL, closed connection).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The database stayed locked past the busy timeout.
    #[error("storage busy: {source}")]
    Busy {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Schema creation or additive migration failed. Fatal at startup.
    #[error("schema migration failed: {source}")]
    Schema {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Rejected locally before any store mutation was attempted.
    #[error("validation error: {0}")]
    Validation(String),

    /// A draft lifecycle transition that the state machine does not allow.
    #[error("invalid draft transition from {from} to {to}")]
    InvalidTransition { from: DraftState, to: DraftState },

    /// JSON encoding or decoding failed (export/import).
    #[error("serialization error: {source}")]
    Serialization {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SnipvaultError {
    /// Lock contention that is expected to clear on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SnipvaultError::Busy { .. })
    }

    /// I/O-class failures: the optimistic cache state must not be trusted as durable.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SnipvaultError::Busy { .. } | SnipvaultError::Storage { .. }
        )
    }

    /// Errors the application cannot continue past.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SnipvaultError::Schema { .. })
    }
}
