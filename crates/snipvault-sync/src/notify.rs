// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification channel for save, delete, and load outcomes.

use strum::Display;
use tokio::sync::broadcast;
use tracing::debug;

use snipvault_core::{RecordId, RecordKind};

/// Default broadcast channel capacity.
const DEFAULT_CAPACITY: usize = 256;

/// Why a fired autosave did not reach the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SuppressReason {
    Untitled,
    PendingDeletion,
    UnknownRecord,
}

/// Something the user should hear about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Saved { id: RecordId, kind: RecordKind },
    Deleted { id: RecordId, kind: RecordKind },
    SaveFailed { id: RecordId, message: String },
    DeleteFailed { id: RecordId, message: String },
    LoadFailed { message: String },
    AutosaveSuppressed { id: RecordId, reason: SuppressReason },
}

impl Notice {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Notice::SaveFailed { .. } | Notice::DeleteFailed { .. } | Notice::LoadFailed { .. }
        )
    }
}

/// Fan-out of [`Notice`]s. Publishing never blocks; with no subscribers the
/// notice is dropped.
#[derive(Debug, Clone)]
pub struct Notifier {
    sender: broadcast::Sender<Notice>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    pub fn publish(&self, notice: Notice) {
        if let Ok(n) = self.sender.send(notice) {
            debug!(subscribers = n, "notice published");
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_without_subscribers_is_silent() {
        let notifier = Notifier::default();
        notifier.publish(Notice::LoadFailed {
            message: "disk gone".into(),
        });
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[test]
    fn every_subscriber_sees_each_notice() {
        let notifier = Notifier::default();
        let mut a = notifier.subscribe();
        let mut b = notifier.subscribe();
        let notice = Notice::Deleted {
            id: RecordId::new("9"),
            kind: RecordKind::Project,
        };
        notifier.publish(notice.clone());
        assert_eq!(a.try_recv().unwrap(), notice);
        assert_eq!(b.try_recv().unwrap(), notice);
        assert!(!notice.is_failure());
    }

    #[test]
    fn suppress_reasons_display_snake_case() {
        assert_eq!(SuppressReason::PendingDeletion.to_string(), "pending_deletion");
    }
}
