// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite durable store for Snipvault.
//!
//! Provides WAL-mode SQLite storage with an idempotent embedded schema, a
//! single-writer concurrency model via `tokio-rusqlite`, typed upsert/list/delete
//! queries for the record collections, key/value access for settings and the
//! theme, and [`SqliteGateway`], the production [`PersistenceGateway`].
//!
//! [`PersistenceGateway`]: snipvault_core::PersistenceGateway

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use adapter::SqliteGateway;
pub use database::Database;
pub use models::Collection;
