// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Week-scoped promotion cache.
//!
//! [`PromotionCache`] keeps, per promotion window, the cached game list, the
//! set of subscribers already notified about each game, and each
//! subscriber's last known lifecycle label. It sits on a [`KvStore`]
//! (see [`MemoryKv`] and [`SqliteKv`]).
//!
//! [`KvStore`]: gamepush_core::KvStore

pub mod keys;
pub mod memory;
pub mod promotion;
pub mod sqlite;

pub use memory::MemoryKv;
pub use promotion::PromotionCache;
pub use sqlite::SqliteKv;
