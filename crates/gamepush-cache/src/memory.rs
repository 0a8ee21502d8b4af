// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process [`KvStore`] for tests and single-run deployments.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use dashmap::DashMap;
use gamepush_core::{GamepushError, KvStore};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
enum Entry {
    List(Vec<String>),
    Set(BTreeSet<String>),
    Hash(HashMap<String, String>),
}

impl Entry {
    fn kind(&self) -> &'static str {
        match self {
            Entry::List(_) => "list",
            Entry::Set(_) => "set",
            Entry::Hash(_) => "hash",
        }
    }
}

fn wrong_type(key: &str, found: &Entry, wanted: &str) -> GamepushError {
    GamepushError::cache(
        format!("key `{key}` holds a {}, not a {wanted}", found.kind()),
        None,
    )
}

/// One shared key space, like a single Redis database.
///
/// Single-key operations hold the gate for reading; [`KvStore::reset`] holds
/// it for writing so no reader observes a half-reset window.
#[derive(Default)]
pub struct MemoryKv {
    entries: DashMap<String, Entry>,
    gate: RwLock<()>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn list_get(&self, key: &str) -> Result<Vec<String>, GamepushError> {
        let _gate = self.gate.read().await;
        match self.entries.get(key).as_deref() {
            None => Ok(Vec::new()),
            Some(Entry::List(values)) => Ok(values.clone()),
            Some(other) => Err(wrong_type(key, other, "list")),
        }
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<bool, GamepushError> {
        let _gate = self.gate.read().await;
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::Set(BTreeSet::new()));
        match entry.value_mut() {
            Entry::Set(members) => Ok(members.insert(member.to_string())),
            other => Err(wrong_type(key, other, "set")),
        }
    }

    async fn set_contains(&self, key: &str, member: &str) -> Result<bool, GamepushError> {
        let _gate = self.gate.read().await;
        match self.entries.get(key).as_deref() {
            None => Ok(false),
            Some(Entry::Set(members)) => Ok(members.contains(member)),
            Some(other) => Err(wrong_type(key, other, "set")),
        }
    }

    async fn hash_set(&self, key: &str, field: &str, value: &str) -> Result<(), GamepushError> {
        let _gate = self.gate.read().await;
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::Hash(HashMap::new()));
        match entry.value_mut() {
            Entry::Hash(fields) => {
                fields.insert(field.to_string(), value.to_string());
                Ok(())
            }
            other => Err(wrong_type(key, other, "hash")),
        }
    }

    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>, GamepushError> {
        let _gate = self.gate.read().await;
        match self.entries.get(key).as_deref() {
            None => Ok(None),
            Some(Entry::Hash(fields)) => Ok(fields.get(field).cloned()),
            Some(other) => Err(wrong_type(key, other, "hash")),
        }
    }

    async fn reset(
        &self,
        prefixes: &[String],
        list_key: &str,
        values: Vec<String>,
    ) -> Result<(), GamepushError> {
        let _gate = self.gate.write().await;
        self.entries
            .retain(|key, _| !prefixes.iter().any(|p| key.starts_with(p.as_str())));
        if values.is_empty() {
            self.entries.remove(list_key);
        } else {
            self.entries
                .insert(list_key.to_string(), Entry::List(values));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_semantics() {
        let kv = MemoryKv::new();
        assert!(kv.set_add("s", "1").await.unwrap());
        assert!(!kv.set_add("s", "1").await.unwrap());
        assert!(kv.set_contains("s", "1").await.unwrap());
        assert!(!kv.set_contains("s", "2").await.unwrap());
        assert!(!kv.set_contains("missing", "1").await.unwrap());
    }

    #[tokio::test]
    async fn type_mismatch_is_a_cache_error() {
        let kv = MemoryKv::new();
        kv.hash_set("h", "f", "v").await.unwrap();
        let err = kv.set_add("h", "x").await.unwrap_err();
        assert!(matches!(err, GamepushError::Cache { .. }));
    }

    #[tokio::test]
    async fn reset_replaces_list_and_drops_prefixed_keys() {
        let kv = MemoryKv::new();
        kv.reset(&[], "games:current", vec!["a".into()]).await.unwrap();
        kv.set_add("notified:current:a", "1").await.unwrap();
        kv.hash_set("status:next:a", "1", "pending").await.unwrap();

        kv.reset(&["notified:current:".into()], "games:current", vec!["b".into()])
            .await
            .unwrap();
        assert_eq!(kv.list_get("games:current").await.unwrap(), ["b"]);
        assert!(!kv.set_contains("notified:current:a", "1").await.unwrap());
        assert_eq!(
            kv.hash_get("status:next:a", "1").await.unwrap().as_deref(),
            Some("pending")
        );
    }
}
