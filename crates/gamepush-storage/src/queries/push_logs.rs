// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Push log operations: batch insert, listing, retry bookkeeping, and
//! confirmation transitions.

use std::str::FromStr;

use gamepush_core::{ConfirmAction, GamepushError};
use rusqlite::types::Value;
use rusqlite::{OptionalExtension, params, params_from_iter};

use crate::database::{Database, map_tr_err};
use crate::models::{ConfirmationStatus, DeliveryStatus, NewPushLog, PushLog, PushLogFilter};

const COLUMNS: &str = "id, subscriber_id, game_slug, game_title, contact_type, contact_id, \
     delivery_status, message_body, error_message, confirmation_status, confirmation_time, \
     is_next_week, created_at";

/// Most recent first. Rows inserted in one transaction share a timestamp,
/// so the id breaks ties.
const NEWEST_FIRST: &str = "ORDER BY created_at DESC, id DESC";

fn parse_column<T>(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    T::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn row_to_push_log(row: &rusqlite::Row<'_>) -> rusqlite::Result<PushLog> {
    let confirmation: Option<String> = row.get(9)?;
    let confirmation_status = match confirmation {
        Some(raw) => Some(ConfirmationStatus::from_str(&raw).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(9, rusqlite::types::Type::Text, Box::new(e))
        })?),
        None => None,
    };
    Ok(PushLog {
        id: row.get(0)?,
        subscriber_id: row.get(1)?,
        game_slug: row.get(2)?,
        game_title: row.get(3)?,
        contact_type: parse_column(row, 4)?,
        contact_id: row.get(5)?,
        delivery_status: parse_column(row, 6)?,
        message_body: row.get(7)?,
        error_message: row.get(8)?,
        confirmation_status,
        confirmation_time: row.get(10)?,
        is_next_week: row.get(11)?,
        created_at: row.get(12)?,
    })
}

/// Insert every row of a dispatch pass in one transaction.
///
/// Either all rows are committed or none are. Returns the new ids in input order.
pub async fn insert_push_logs(
    db: &Database,
    rows: Vec<NewPushLog>,
) -> Result<Vec<i64>, GamepushError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let mut ids = Vec::with_capacity(rows.len());
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO push_logs (subscriber_id, game_slug, game_title, contact_type, \
                     contact_id, delivery_status, message_body, error_message, \
                     confirmation_status, is_next_week) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                )?;
                for row in &rows {
                    stmt.execute(params![
                        row.subscriber_id,
                        row.game_slug,
                        row.game_title,
                        row.contact_type.as_str(),
                        row.contact_id,
                        row.delivery_status.to_string(),
                        row.message_body,
                        row.error_message,
                        row.initial_confirmation().map(|s| s.to_string()),
                        row.is_next_week,
                    ])?;
                    ids.push(tx.last_insert_rowid());
                }
            }
            tx.commit()?;
            Ok(ids)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_push_log(db: &Database, id: i64) -> Result<Option<PushLog>, GamepushError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM push_logs WHERE id = ?1"),
                params![id],
                row_to_push_log,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// List push logs newest first, with optional subscriber / status filters.
pub async fn list_push_logs(
    db: &Database,
    filter: &PushLogFilter,
) -> Result<Vec<PushLog>, GamepushError> {
    let mut clauses = Vec::new();
    let mut values: Vec<Value> = Vec::new();
    if let Some(subscriber_id) = filter.subscriber_id {
        clauses.push(format!("subscriber_id = ?{}", values.len() + 1));
        values.push(Value::Integer(subscriber_id));
    }
    if let Some(status) = filter.delivery_status {
        clauses.push(format!("delivery_status = ?{}", values.len() + 1));
        values.push(Value::Text(status.to_string()));
    }
    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };
    let sql = format!(
        "SELECT {COLUMNS} FROM push_logs {where_sql} {NEWEST_FIRST} LIMIT {} OFFSET {}",
        filter.effective_limit(),
        filter.offset.unwrap_or(0)
    );

    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(values), row_to_push_log)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Every row currently in `failed` delivery status, oldest first.
pub async fn list_failed(db: &Database) -> Result<Vec<PushLog>, GamepushError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM push_logs WHERE delivery_status = 'failed' ORDER BY id ASC"
            ))?;
            let rows = stmt.query_map([], row_to_push_log)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Record the outcome of re-sending a failed row.
///
/// On success the row flips to `success` and its error is cleared; otherwise
/// only `error_message` is replaced. Confirmation fields are never touched.
/// Only rows still in `failed` status are affected; returns whether one was.
pub async fn record_retry_outcome(
    db: &Database,
    id: i64,
    delivered: bool,
    error_message: Option<String>,
) -> Result<bool, GamepushError> {
    db.connection()
        .call(move |conn| {
            let affected = if delivered {
                conn.execute(
                    "UPDATE push_logs SET delivery_status = 'success', error_message = NULL \
                     WHERE id = ?1 AND delivery_status = 'failed'",
                    params![id],
                )?
            } else {
                conn.execute(
                    "UPDATE push_logs SET error_message = ?2 \
                     WHERE id = ?1 AND delivery_status = 'failed'",
                    params![id, error_message],
                )?
            };
            Ok(affected > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Most recent delivered row for `subscriber_id` whose confirmation status
/// is a valid source for `action`, optionally restricted to one game.
/// Rows from both promotion windows compete.
fn select_latest_confirmable(
    conn: &rusqlite::Connection,
    subscriber_id: i64,
    slug: Option<&str>,
    action: ConfirmAction,
) -> rusqlite::Result<Option<PushLog>> {
    let mut values = vec![
        Value::Integer(subscriber_id),
        Value::Text(DeliveryStatus::Success.to_string()),
    ];
    let placeholders: Vec<String> = action
        .source_states()
        .iter()
        .map(|state| {
            values.push(Value::Text(state.to_string()));
            format!("?{}", values.len())
        })
        .collect();
    let slug_clause = match slug {
        Some(slug) => {
            values.push(Value::Text(slug.to_string()));
            format!("AND game_slug = ?{}", values.len())
        }
        None => String::new(),
    };
    let sql = format!(
        "SELECT {COLUMNS} FROM push_logs \
         WHERE subscriber_id = ?1 AND delivery_status = ?2 \
         AND confirmation_status IN ({}) {slug_clause} {NEWEST_FIRST} LIMIT 1",
        placeholders.join(", ")
    );
    conn.query_row(&sql, params_from_iter(values), row_to_push_log)
        .optional()
}

/// Apply a confirmation transition to the most recent eligible row.
///
/// Lookup and update run in one transaction. Returns the updated row, or
/// `None` when no row is in a valid source state for `action`.
pub async fn apply_confirmation(
    db: &Database,
    subscriber_id: i64,
    slug: Option<&str>,
    action: ConfirmAction,
) -> Result<Option<PushLog>, GamepushError> {
    let slug = slug.map(str::to_string);
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let Some(row) = select_latest_confirmable(&tx, subscriber_id, slug.as_deref(), action)?
            else {
                tx.commit()?;
                return Ok(None);
            };
            tx.execute(
                "UPDATE push_logs SET confirmation_status = ?2, \
                 confirmation_time = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') \
                 WHERE id = ?1",
                params![row.id, action.target().to_string()],
            )?;
            let updated = tx.query_row(
                &format!("SELECT {COLUMNS} FROM push_logs WHERE id = ?1"),
                params![row.id],
                row_to_push_log,
            )?;
            tx.commit()?;
            Ok(Some(updated))
        })
        .await
        .map_err(map_tr_err)
}
