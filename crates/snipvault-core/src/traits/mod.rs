// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the sync layer and durable storage.
//!
//! Implementations use `#[async_trait]` for dynamic dispatch compatibility.

pub mod gateway;

pub use gateway::PersistenceGateway;
