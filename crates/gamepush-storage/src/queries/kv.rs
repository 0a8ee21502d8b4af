// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! List, set, and hash primitives over the `kv_*` tables.

use gamepush_core::GamepushError;
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};

pub async fn list_get(db: &Database, key: &str) -> Result<Vec<String>, GamepushError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare("SELECT value FROM kv_lists WHERE key = ?1 ORDER BY position ASC")?;
            let rows = stmt.query_map(params![key], |row| row.get(0))?;
            rows.collect::<Result<Vec<String>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn set_add(db: &Database, key: &str, member: &str) -> Result<bool, GamepushError> {
    let (key, member) = (key.to_string(), member.to_string());
    db.connection()
        .call(move |conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO kv_sets (key, member) VALUES (?1, ?2)",
                params![key, member],
            )?;
            Ok(inserted > 0)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn set_contains(db: &Database, key: &str, member: &str) -> Result<bool, GamepushError> {
    let (key, member) = (key.to_string(), member.to_string());
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT 1 FROM kv_sets WHERE key = ?1 AND member = ?2",
                params![key, member],
                |_| Ok(()),
            )
            .optional()
            .map(|found| found.is_some())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn hash_set(
    db: &Database,
    key: &str,
    field: &str,
    value: &str,
) -> Result<(), GamepushError> {
    let (key, field, value) = (key.to_string(), field.to_string(), value.to_string());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO kv_hashes (key, field, value) VALUES (?1, ?2, ?3) \
                 ON CONFLICT (key, field) DO UPDATE SET value = excluded.value",
                params![key, field, value],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn hash_get(
    db: &Database,
    key: &str,
    field: &str,
) -> Result<Option<String>, GamepushError> {
    let (key, field) = (key.to_string(), field.to_string());
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT value FROM kv_hashes WHERE key = ?1 AND field = ?2",
                params![key, field],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Delete every key under `prefixes` across all kv tables and replace the
/// list at `list_key` with `values`, in one transaction.
pub async fn reset(
    db: &Database,
    prefixes: &[String],
    list_key: &str,
    values: Vec<String>,
) -> Result<(), GamepushError> {
    let prefixes = prefixes.to_vec();
    let list_key = list_key.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            for prefix in &prefixes {
                // substr comparison avoids LIKE wildcard escaping in slugs.
                for table in ["kv_lists", "kv_sets", "kv_hashes"] {
                    tx.execute(
                        &format!("DELETE FROM {table} WHERE substr(key, 1, length(?1)) = ?1"),
                        params![prefix],
                    )?;
                }
            }
            tx.execute("DELETE FROM kv_lists WHERE key = ?1", params![list_key])?;
            {
                let mut stmt =
                    tx.prepare("INSERT INTO kv_lists (key, position, value) VALUES (?1, ?2, ?3)")?;
                for (position, value) in values.iter().enumerate() {
                    stmt.execute(params![list_key, position as i64, value])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
