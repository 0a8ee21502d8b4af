// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Re-delivery of failed push logs.

use gamepush_cache::PromotionCache;
use gamepush_channels::ChannelRouter;
use gamepush_core::GamepushError;
use gamepush_storage::Database;
use gamepush_storage::queries::push_logs;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Counts for one retry pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RetryReport {
    pub attempted: usize,
    pub recovered: usize,
}

/// Re-sends the stored message body of every failed push log.
///
/// A recovered row flips to `success`; a row that fails again keeps its
/// status and gets the new error. Confirmation fields are never touched, so
/// a recovered row stays out of confirmation tracking.
///
/// With `mark_notified_on_recovery` off (the default), recovery does not
/// touch the dedup set and the next dispatch pass will attempt the pair
/// again. With it on, the pair is marked notified in the row's window.
#[derive(Clone)]
pub struct RetryReconciler {
    db: Database,
    cache: PromotionCache,
    router: ChannelRouter,
    mark_notified_on_recovery: bool,
    shutdown: CancellationToken,
}

impl RetryReconciler {
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
            mark_notified_on_recovery: false,
            shutdown,
        }
    }

    pub fn with_mark_notified_on_recovery(mut self, enabled: bool) -> Self {
        self.mark_notified_on_recovery = enabled;
        self
    }

    /// One pass over all failed rows, oldest first.
    ///
    /// Each row's outcome is committed as soon as it is known, so an aborted
    /// pass keeps the rows it already reconciled.
    pub async fn retry_failed(&self) -> Result<RetryReport, GamepushError> {
        let failed = push_logs::list_failed(&self.db).await?;
        if failed.is_empty() {
            debug!("no failed push logs to retry");
            return Ok(RetryReport::default());
        }
        info!(rows = failed.len(), "retry pass started");

        let mut report = RetryReport::default();
        for row in failed {
            if self.shutdown.is_cancelled() {
                warn!(
                    attempted = report.attempted,
                    "shutdown requested, retry pass aborted"
                );
                return Err(GamepushError::Cancelled);
            }

            let outcome = self
                .router
                .send(row.contact_type, &row.contact_id, &row.message_body)
                .await;
            report.attempted += 1;

            let updated = push_logs::record_retry_outcome(
                &self.db,
                row.id,
                outcome.success,
                outcome.error_detail.clone(),
            )
            .await?;
            if !updated {
                debug!(push_log_id = row.id, "row no longer failed, skipped");
                continue;
            }

            if outcome.success {
                report.recovered += 1;
                info!(push_log_id = row.id, slug = %row.game_slug, "failed push recovered");
                if self.mark_notified_on_recovery
                    && let Err(e) = self
                        .cache
                        .mark_notified(row.window(), &row.game_slug, row.subscriber_id)
                        .await
                {
                    warn!(
                        push_log_id = row.id,
                        error = %e,
                        "recovery committed but dedup mark failed"
                    );
                }
            } else {
                warn!(
                    push_log_id = row.id,
                    error = outcome.error_detail.as_deref().unwrap_or("unknown"),
                    "retry failed again"
                );
            }
        }

        info!(
            attempted = report.attempted,
            recovered = report.recovered,
            "retry pass finished"
        );
        Ok(report)
    }
}
