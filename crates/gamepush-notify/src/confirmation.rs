// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subscriber acknowledgment tracking.

use gamepush_cache::PromotionCache;
use gamepush_core::{ConfirmAction, GamepushError, PushLog};
use gamepush_storage::Database;
use gamepush_storage::queries::push_logs;
use serde::Serialize;
use tracing::{info, warn};

/// Result of a confirmation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ConfirmOutcome {
    /// The transition was applied; carries the updated row.
    Applied(PushLog),
    /// No delivered row was in a state the action can move from.
    NothingPending,
}

/// Moves delivered push logs forward through `pending -> confirmed -> claimed`.
///
/// The durable row is the source of truth. The cached status map is only a
/// mirror for quick lookups and is updated after the row commits.
#[derive(Clone)]
pub struct ConfirmationStateMachine {
    db: Database,
    cache: PromotionCache,
}

impl ConfirmationStateMachine {
    pub fn new(db: Database, cache: PromotionCache) -> Self {
        Self { db, cache }
    }

    /// Apply `action` to the most recent eligible row for one game.
    pub async fn apply(
        &self,
        subscriber_id: i64,
        slug: &str,
        action: ConfirmAction,
    ) -> Result<ConfirmOutcome, GamepushError> {
        self.transition(subscriber_id, Some(slug), action).await
    }

    /// Apply `action` to the most recent eligible row across all games.
    ///
    /// Used for free-text replies that do not name a game.
    pub async fn apply_latest(
        &self,
        subscriber_id: i64,
        action: ConfirmAction,
    ) -> Result<ConfirmOutcome, GamepushError> {
        self.transition(subscriber_id, None, action).await
    }

    async fn transition(
        &self,
        subscriber_id: i64,
        slug: Option<&str>,
        action: ConfirmAction,
    ) -> Result<ConfirmOutcome, GamepushError> {
        let Some(row) = push_logs::apply_confirmation(&self.db, subscriber_id, slug, action).await?
        else {
            info!(subscriber_id, slug, %action, "no confirmable push log");
            return Ok(ConfirmOutcome::NothingPending);
        };

        info!(
            subscriber_id,
            push_log_id = row.id,
            slug = %row.game_slug,
            %action,
            "confirmation applied"
        );

        let target = action.target().to_string();
        if let Err(e) = self
            .cache
            .set_status(row.window(), &row.game_slug, subscriber_id, &target)
            .await
        {
            warn!(
                push_log_id = row.id,
                error = %e,
                "confirmation committed but cache mirror update failed"
            );
        }
        Ok(ConfirmOutcome::Applied(row))
    }
}
