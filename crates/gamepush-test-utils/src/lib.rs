// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for gamepush integration tests.
//!
//! Provides mock collaborators and a harness that wires the whole notify
//! core against a temporary SQLite database, without network access.
//!
//! # Components
//!
//! - [`MockSender`] - Scripted channel sender that captures every message
//! - [`StaticCatalog`] - Catalog source returning a fixed (or failing) catalog
//! - [`TestHarness`] - Fully wired dispatcher, state machine, and reconciler

pub mod harness;
pub mod mock_catalog;
pub mod mock_sender;

pub use harness::{TestHarness, TestHarnessBuilder, game};
pub use mock_catalog::StaticCatalog;
pub use mock_sender::{MockSender, SentMessage};
