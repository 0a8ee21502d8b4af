// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seam traits between the notify core and its external collaborators.
//!
//! All traits use `#[async_trait]` so they can be held as trait objects.

pub mod catalog;
pub mod channel;
pub mod kv;

pub use catalog::CatalogSource;
pub use channel::ChannelSender;
pub use kv::KvStore;
