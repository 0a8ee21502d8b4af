// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storefront catalog source.
//!
//! [`EpicCatalog`] fetches the free-games promotions feed and [`parse`]
//! turns it into the `current` and `upcoming` game lists.

pub mod epic;
pub mod parse;

pub use epic::EpicCatalog;
pub use parse::parse_promotions;
