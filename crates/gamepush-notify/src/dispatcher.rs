// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fan-out of cached promotions to subscribers.
//!
//! A pass walks subscribers (outer) by cached games (inner), skipping pairs
//! the cache already marks notified. Every attempt becomes a push log row;
//! rows are committed in a single transaction at the end of the pass, and
//! the cache is updated for delivered pairs only after that commit.
//!
//! Consequences:
//! - a failed commit leaves the cache untouched, so the pass can simply be
//!   run again (pairs delivered in the lost pass may be delivered twice,
//!   never lost);
//! - a cache write failing after the commit is logged, and the affected pair
//!   will be retried by the next pass.

use std::collections::HashSet;

use gamepush_cache::PromotionCache;
use gamepush_channels::ChannelRouter;
use gamepush_core::{
    ConfirmationStatus, DeliveryOutcome, DeliveryStatus, GameInfo, GamepushError, NewPushLog,
    PromotionWindow, Subscriber,
};
use gamepush_storage::Database;
use gamepush_storage::queries::{push_logs, subscribers};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::message;

/// Counts for one dispatch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub attempted: usize,
    pub succeeded: usize,
}

/// Result of a single-pair manual push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SingleDispatch {
    /// The pair was already notified in this window; nothing was sent.
    AlreadyNotified,
    /// A send was attempted and logged.
    Attempted {
        push_log_id: i64,
        outcome: DeliveryOutcome,
    },
}

/// Sends cached promotions to subscribers and records every attempt.
#[derive(Clone)]
pub struct NotificationDispatcher {
    db: Database,
    cache: PromotionCache,
    router: ChannelRouter,
    shutdown: CancellationToken,
}

impl NotificationDispatcher {
    pub fn new(
        db: Database,
        cache: PromotionCache,
        router: ChannelRouter,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            db,
            cache,
            router,
            shutdown,
        }
    }

    /// Run one dispatch pass over `window`.
    ///
    /// An empty cached catalog is not an error: the pass attempts nothing.
    /// A failed send is recorded and the pass moves on. Storage and cache read
    /// failures abort the pass with nothing committed, as does shutdown.
    pub async fn dispatch(&self, window: PromotionWindow) -> Result<DispatchReport, GamepushError> {
        let games = self.cache.list(window).await?;
        if games.is_empty() {
            info!(%window, "no cached promotions, nothing to dispatch");
            return Ok(DispatchReport::default());
        }
        let subscribers = subscribers::list_subscribers(&self.db).await?;
        info!(
            %window,
            games = games.len(),
            subscribers = subscribers.len(),
            "dispatch pass started"
        );

        let mut report = DispatchReport::default();
        let mut queued = Vec::new();
        let mut delivered = Vec::new();
        let mut seen = HashSet::new();

        for subscriber in &subscribers {
            for game in &games {
                if self.shutdown.is_cancelled() {
                    warn!(%window, queued = queued.len(), "shutdown requested, dispatch pass aborted");
                    return Err(GamepushError::Cancelled);
                }
                // Duplicate slugs in one list are attempted once.
                if !seen.insert((subscriber.id, game.slug.as_str())) {
                    continue;
                }
                if self
                    .cache
                    .is_notified(window, &game.slug, subscriber.id)
                    .await?
                {
                    debug!(%window, subscriber_id = subscriber.id, slug = %game.slug, "already notified");
                    continue;
                }

                let row = self.attempt(window, subscriber, game).await;
                report.attempted += 1;
                if row.delivery_status == DeliveryStatus::Success {
                    report.succeeded += 1;
                    delivered.push((game.slug.clone(), subscriber.id));
                }
                queued.push(row);
            }
        }

        push_logs::insert_push_logs(&self.db, queued).await?;

        for (slug, subscriber_id) in &delivered {
            self.mark_delivered(window, slug, *subscriber_id).await;
        }

        info!(
            %window,
            attempted = report.attempted,
            succeeded = report.succeeded,
            "dispatch pass finished"
        );
        Ok(report)
    }

    /// Push one game to one subscriber, honouring the dedup check.
    pub async fn dispatch_one(
        &self,
        window: PromotionWindow,
        subscriber_id: i64,
        slug: &str,
    ) -> Result<SingleDispatch, GamepushError> {
        let subscriber = subscribers::get_subscriber(&self.db, subscriber_id)
            .await?
            .ok_or_else(|| GamepushError::NotFound {
                entity: "subscriber",
                id: subscriber_id.to_string(),
            })?;
        let game = self
            .cache
            .find(window, slug)
            .await?
            .ok_or_else(|| GamepushError::NotFound {
                entity: "game",
                id: format!("{window}:{slug}"),
            })?;

        if self.cache.is_notified(window, slug, subscriber_id).await? {
            return Ok(SingleDispatch::AlreadyNotified);
        }

        let row = self.attempt(window, &subscriber, &game).await;
        let outcome = DeliveryOutcome {
            success: row.delivery_status == DeliveryStatus::Success,
            error_detail: row.error_message.clone(),
        };
        let ids = push_logs::insert_push_logs(&self.db, vec![row]).await?;
        let push_log_id = ids.first().copied().ok_or_else(|| {
            GamepushError::Internal("push log insert returned no id".to_string())
        })?;
        if outcome.success {
            self.mark_delivered(window, slug, subscriber_id).await;
        }
        Ok(SingleDispatch::Attempted {
            push_log_id,
            outcome,
        })
    }

    /// Render, send, and build the push log row for one pair.
    async fn attempt(
        &self,
        window: PromotionWindow,
        subscriber: &Subscriber,
        game: &GameInfo,
    ) -> NewPushLog {
        let body = message::render(window, game, subscriber.contact_type);
        let outcome = self
            .router
            .send(subscriber.contact_type, &subscriber.contact_id, &body)
            .await;
        if !outcome.success {
            warn!(
                %window,
                subscriber_id = subscriber.id,
                slug = %game.slug,
                contact_type = %subscriber.contact_type,
                error = outcome.error_detail.as_deref().unwrap_or("unknown"),
                "send failed"
            );
        }
        NewPushLog {
            subscriber_id: subscriber.id,
            game_slug: game.slug.clone(),
            game_title: game.title.clone(),
            contact_type: subscriber.contact_type,
            contact_id: subscriber.contact_id.clone(),
            delivery_status: outcome.status(),
            message_body: body,
            error_message: outcome.error_detail,
            is_next_week: window.is_next_week(),
        }
    }

    async fn mark_delivered(&self, window: PromotionWindow, slug: &str, subscriber_id: i64) {
        let result = async {
            self.cache.mark_notified(window, slug, subscriber_id).await?;
            self.cache
                .set_status(
                    window,
                    slug,
                    subscriber_id,
                    &ConfirmationStatus::Pending.to_string(),
                )
                .await
        }
        .await;
        if let Err(e) = result {
            warn!(
                %window,
                subscriber_id,
                slug,
                error = %e,
                "push log committed but cache update failed; pair may be sent again"
            );
        }
    }
}
