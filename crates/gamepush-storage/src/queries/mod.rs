// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules. Every function takes a [`Database`](crate::Database)
//! and runs on its single writer thread.

pub mod kv;
pub mod push_logs;
pub mod subscribers;
