// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`KvStore`] over the `kv_*` tables of the main database.

use async_trait::async_trait;
use gamepush_core::{GamepushError, KvStore};
use gamepush_storage::Database;
use gamepush_storage::queries::kv;

/// SQLite-backed key-value store. Survives restarts; [`KvStore::reset`]
/// runs in a single transaction.
#[derive(Clone)]
pub struct SqliteKv {
    db: Database,
}

impl SqliteKv {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

// Storage failures are surfaced as cache errors so callers can tell the
// two stores apart.
fn as_cache_err(e: GamepushError) -> GamepushError {
    GamepushError::cache("sqlite kv operation failed", Some(Box::new(e)))
}

#[async_trait]
impl KvStore for SqliteKv {
    async fn list_get(&self, key: &str) -> Result<Vec<String>, GamepushError> {
        kv::list_get(&self.db, key).await.map_err(as_cache_err)
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<bool, GamepushError> {
        kv::set_add(&self.db, key, member).await.map_err(as_cache_err)
    }

    async fn set_contains(&self, key: &str, member: &str) -> Result<bool, GamepushError> {
        kv::set_contains(&self.db, key, member)
            .await
            .map_err(as_cache_err)
    }

    async fn hash_set(&self, key: &str, field: &str, value: &str) -> Result<(), GamepushError> {
        kv::hash_set(&self.db, key, field, value)
            .await
            .map_err(as_cache_err)
    }

    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>, GamepushError> {
        kv::hash_get(&self.db, key, field)
            .await
            .map_err(as_cache_err)
    }

    async fn reset(
        &self,
        prefixes: &[String],
        list_key: &str,
        values: Vec<String>,
    ) -> Result<(), GamepushError> {
        kv::reset(&self.db, prefixes, list_key, values)
            .await
            .map_err(as_cache_err)
    }
}
