// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key-value store primitives backing the promotion cache.

use async_trait::async_trait;

use crate::error::GamepushError;

/// A small key-value store with list, set, and hash values.
///
/// Every single-key operation is atomic. [`KvStore::reset`] is the only
/// multi-key operation and must apply all of its effects or none.
#[async_trait]
pub trait KvStore: Send + Sync + 'static {
    /// Returns the list stored at `key`, empty if absent.
    async fn list_get(&self, key: &str) -> Result<Vec<String>, GamepushError>;

    /// Adds `member` to the set at `key`. Returns `true` if it was not present.
    async fn set_add(&self, key: &str, member: &str) -> Result<bool, GamepushError>;

    async fn set_contains(&self, key: &str, member: &str) -> Result<bool, GamepushError>;

    async fn hash_set(&self, key: &str, field: &str, value: &str) -> Result<(), GamepushError>;

    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>, GamepushError>;

    /// Atomically deletes every key starting with one of `prefixes` and
    /// replaces the list at `list_key` with `values`.
    async fn reset(
        &self,
        prefixes: &[String],
        list_key: &str,
        values: Vec<String>,
    ) -> Result<(), GamepushError>;
}
