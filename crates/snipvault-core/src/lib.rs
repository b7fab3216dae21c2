// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Snipvault.
//!
//! Defines the record model shared by every other crate, the single error
//! type, and the [`PersistenceGateway`] trait that is the only path from the
//! in-memory layers to durable storage.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::SnipvaultError;
pub use traits::PersistenceGateway;
pub use types::{
    Document, Draft, DraftState, HealthStatus, Language, Record, RecordId, RecordKind, TagSet,
    Theme,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snipvault_error_has_all_variants() {
        let _config = SnipvaultError::Config("test".into());
        let _storage = SnipvaultError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _busy = SnipvaultError::Busy {
            source: Box::new(std::io::Error::other("locked")),
        };
        let _schema = SnipvaultError::Schema {
            source: Box::new(std::io::Error::other("bad migration")),
        };
        let _validation = SnipvaultError::Validation("empty".into());
        let _transition = SnipvaultError::InvalidTransition {
            from: DraftState::Deleted,
            to: DraftState::Persisted,
        };
        let _serde = SnipvaultError::Serialization {
            source: Box::new(std::io::Error::other("json")),
        };
        let _internal = SnipvaultError::Internal("test".into());
    }

    #[test]
    fn gateway_trait_is_object_safe() {
        fn _assert_dyn(_: &dyn PersistenceGateway) {}
    }
}
