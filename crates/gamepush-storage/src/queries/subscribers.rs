// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subscriber CRUD operations.

use std::str::FromStr;

use gamepush_core::GamepushError;
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};
use crate::models::{ContactType, NewSubscriber, Subscriber};

const COLUMNS: &str = "id, epic_account, contact_type, contact_id, created_at";

fn row_to_subscriber(row: &rusqlite::Row<'_>) -> rusqlite::Result<Subscriber> {
    let contact_type: String = row.get(2)?;
    Ok(Subscriber {
        id: row.get(0)?,
        epic_account: row.get(1)?,
        contact_type: ContactType::from_str(&contact_type).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?,
        contact_id: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Register a subscriber.
///
/// Fails with [`GamepushError::Conflict`] when `(contact_type, contact_id)`
/// is already registered.
pub async fn create_subscriber(
    db: &Database,
    new: &NewSubscriber,
) -> Result<Subscriber, GamepushError> {
    let epic_account = new.epic_account.clone();
    let contact_type = new.contact_type;
    let contact_id = new.contact_id.clone();
    let conflict_id = contact_id.clone();

    // `None` signals a uniqueness violation on (contact_type, contact_id).
    let created = db
        .connection()
        .call(move |conn| {
            let inserted = conn.execute(
                "INSERT INTO subscribers (epic_account, contact_type, contact_id) VALUES (?1, ?2, ?3)",
                params![epic_account, contact_type.as_str(), contact_id],
            );
            match inserted {
                Ok(_) => {}
                Err(rusqlite::Error::SqliteFailure(err, _))
                    if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    return Ok(None);
                }
                Err(e) => return Err(e),
            }
            let id = conn.last_insert_rowid();
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM subscribers WHERE id = ?1"),
                params![id],
                row_to_subscriber,
            )
            .map(Some)
        })
        .await
        .map_err(map_tr_err)?;

    created.ok_or_else(|| {
        GamepushError::Conflict(format!(
            "{contact_type} contact {conflict_id} is already registered"
        ))
    })
}

/// Get a subscriber by id.
pub async fn get_subscriber(db: &Database, id: i64) -> Result<Option<Subscriber>, GamepushError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM subscribers WHERE id = ?1"),
                params![id],
                row_to_subscriber,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Find the subscriber registered for a channel contact.
pub async fn find_by_contact(
    db: &Database,
    contact_type: ContactType,
    contact_id: &str,
) -> Result<Option<Subscriber>, GamepushError> {
    let contact_id = contact_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {COLUMNS} FROM subscribers WHERE contact_type = ?1 AND contact_id = ?2"
                ),
                params![contact_type.as_str(), contact_id],
                row_to_subscriber,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// List all subscribers in registration order.
pub async fn list_subscribers(db: &Database) -> Result<Vec<Subscriber>, GamepushError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM subscribers ORDER BY id ASC"))?;
            let rows = stmt.query_map([], row_to_subscriber)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Delete a subscriber. Their push logs are kept. Returns whether a row was removed.
pub async fn delete_subscriber(db: &Database, id: i64) -> Result<bool, GamepushError> {
    db.connection()
        .call(move |conn| {
            let affected = conn.execute("DELETE FROM subscribers WHERE id = ?1", params![id])?;
            Ok(affected > 0)
        })
        .await
        .map_err(map_tr_err)
}
