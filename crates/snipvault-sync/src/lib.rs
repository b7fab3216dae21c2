// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client-side synchronization for Snipvault.
//!
//! [`ClientCache`] mirrors the persisted collections in memory, applies saves
//! optimistically, and reconciles them with the gateway's answers.
//! [`AutosaveScheduler`] debounces edits per record, [`DraftLifecycle`]
//! decides when a document may reach the gateway, and [`EditorSession`] ties
//! the three together for a single open editor.

pub mod cache;
pub mod draft;
pub mod editor;
pub mod export;
pub mod notify;
pub mod scheduler;

pub use cache::{ClientCache, SaveOptions, SaveOutcome};
pub use draft::{DraftLifecycle, SaveGate};
pub use editor::{EditorSession, SaveResult};
pub use export::{ExportDocument, ImportReport};
pub use notify::{Notice, Notifier, SuppressReason};
pub use scheduler::AutosaveScheduler;
