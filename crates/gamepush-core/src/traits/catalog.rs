// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storefront catalog source.

use async_trait::async_trait;

use crate::error::GamepushError;
use crate::types::Catalog;

/// Produces the current and upcoming free-game lists.
#[async_trait]
pub trait CatalogSource: Send + Sync + 'static {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Fetches both windows in one call.
    ///
    /// Malformed upstream data is reported as [`GamepushError::Upstream`];
    /// callers decide whether that becomes an empty catalog.
    async fn fetch(&self) -> Result<Catalog, GamepushError>;
}
