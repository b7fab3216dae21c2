// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Draft lifecycle state machine.
//!
//! ```text
//! Unnamed --name--> NamedUnsaved --ack--> Persisted --ack--> Persisted
//!    \                  \                    \
//!     +------------------+--------------------+--delete--> Deleted
//! ```

use snipvault_core::{Document, DraftState, SnipvaultError};

/// What an explicit save request should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveGate {
    /// The document has a name; hand it to the cache.
    Proceed,
    /// The document is an unnamed draft; ask the user for a name.
    NeedsName,
}

fn allowed(from: DraftState, to: DraftState) -> bool {
    use DraftState::*;
    matches!(
        (from, to),
        (Unnamed, NamedUnsaved)
            | (NamedUnsaved, NamedUnsaved)
            | (NamedUnsaved, Persisted)
            | (Persisted, Persisted)
            | (_, Deleted)
    )
}

/// Tracks where one editor document is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DraftLifecycle {
    state: DraftState,
}

impl DraftLifecycle {
    pub fn new() -> Self {
        Self {
            state: DraftState::Unnamed,
        }
    }

    /// Starting state for a document: drafts are unnamed, records persisted.
    pub fn for_document(document: &Document) -> Self {
        let state = match document {
            Document::Draft(_) => DraftState::Unnamed,
            Document::Persisted(_) => DraftState::Persisted,
        };
        Self { state }
    }

    pub fn state(&self) -> DraftState {
        self.state
    }

    pub fn is_deleted(&self) -> bool {
        self.state == DraftState::Deleted
    }

    /// Whether the document may be handed to the gateway.
    pub fn can_persist(&self) -> bool {
        matches!(self.state, DraftState::NamedUnsaved | DraftState::Persisted)
    }

    pub fn transition(&mut self, to: DraftState) -> Result<(), SnipvaultError> {
        if !allowed(self.state, to) {
            return Err(SnipvaultError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }

    /// A non-empty name was supplied.
    pub fn name(&mut self) -> Result<(), SnipvaultError> {
        self.transition(DraftState::NamedUnsaved)
    }

    /// The gateway acknowledged a save.
    pub fn acknowledge_save(&mut self) -> Result<(), SnipvaultError> {
        self.transition(DraftState::Persisted)
    }

    pub fn delete(&mut self) -> Result<(), SnipvaultError> {
        self.transition(DraftState::Deleted)
    }

    /// Gate for an explicit save request.
    pub fn save_gate(&self) -> Result<SaveGate, SnipvaultError> {
        match self.state {
            DraftState::Unnamed => Ok(SaveGate::NeedsName),
            DraftState::NamedUnsaved | DraftState::Persisted => Ok(SaveGate::Proceed),
            DraftState::Deleted => Err(SnipvaultError::InvalidTransition {
                from: DraftState::Deleted,
                to: DraftState::Persisted,
            }),
        }
    }
}

impl Default for DraftLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snipvault_core::{Draft, RecordKind};

    #[test]
    fn happy_path() {
        let mut lc = DraftLifecycle::new();
        assert_eq!(lc.save_gate().unwrap(), SaveGate::NeedsName);
        assert!(!lc.can_persist());

        lc.name().unwrap();
        assert_eq!(lc.state(), DraftState::NamedUnsaved);
        assert_eq!(lc.save_gate().unwrap(), SaveGate::Proceed);

        lc.acknowledge_save().unwrap();
        lc.acknowledge_save().unwrap();
        assert_eq!(lc.state(), DraftState::Persisted);
    }

    #[test]
    fn unnamed_cannot_be_acknowledged() {
        let mut lc = DraftLifecycle::new();
        let err = lc.acknowledge_save().unwrap_err();
        assert!(matches!(
            err,
            SnipvaultError::InvalidTransition {
                from: DraftState::Unnamed,
                to: DraftState::Persisted
            }
        ));
        assert_eq!(lc.state(), DraftState::Unnamed);
    }

    #[test]
    fn every_state_can_be_deleted() {
        for mut lc in [
            DraftLifecycle::new(),
            DraftLifecycle {
                state: DraftState::NamedUnsaved,
            },
            DraftLifecycle {
                state: DraftState::Persisted,
            },
        ] {
            lc.delete().unwrap();
            assert!(lc.is_deleted());
        }
    }

    #[test]
    fn deleted_is_terminal() {
        let mut lc = DraftLifecycle::new();
        lc.delete().unwrap();
        assert!(lc.name().is_err());
        assert!(lc.acknowledge_save().is_err());
        assert!(lc.save_gate().is_err());
        lc.delete().unwrap();
        assert!(lc.is_deleted());
    }

    #[test]
    fn persisted_cannot_be_renamed_back_to_unsaved() {
        let mut lc = DraftLifecycle {
            state: DraftState::Persisted,
        };
        assert!(lc.name().is_err());
    }

    #[test]
    fn starting_state_follows_document() {
        let draft = Document::Draft(Draft::new(RecordKind::Snippet));
        assert_eq!(
            DraftLifecycle::for_document(&draft).state(),
            DraftState::Unnamed
        );
    }
}
