// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Snipvault integration tests.
//!
//! Provides an in-memory gateway and a temporary SQLite store for fast,
//! deterministic tests.
//!
//! # Components
//!
//! - [`MockGateway`] - In-memory gateway with failure injection and call capture
//! - [`TempStore`] - Real SQLite gateway backed by a temporary directory

pub mod harness;
pub mod mock_gateway;

pub use harness::TempStore;
pub use mock_gateway::{GatewayCall, GatewayOp, MockGateway};
