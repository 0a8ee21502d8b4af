// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Job identities and the notify-backed job implementations.

use async_trait::async_trait;
use gamepush_core::{GamepushError, PromotionWindow};
use gamepush_notify::{CatalogRefresher, NotificationDispatcher, RetryReconciler};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identity of a scheduled job. At most one run per id is in flight.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobId {
    Refresh,
    DispatchCurrent,
    DispatchNext,
    Retry,
}

impl JobId {
    pub const ALL: [JobId; 4] = [
        JobId::Refresh,
        JobId::DispatchCurrent,
        JobId::DispatchNext,
        JobId::Retry,
    ];

    pub fn dispatch(window: PromotionWindow) -> Self {
        match window {
            PromotionWindow::Current => Self::DispatchCurrent,
            PromotionWindow::Next => Self::DispatchNext,
        }
    }
}

/// A unit of background work.
///
/// `run` returns a short human-readable summary for logs and the management
/// surface.
#[async_trait]
pub trait Job: Send + Sync + 'static {
    async fn run(&self) -> Result<String, GamepushError>;
}

/// Refreshes both promotion windows from the catalog.
pub struct RefreshJob(pub CatalogRefresher);

#[async_trait]
impl Job for RefreshJob {
    async fn run(&self) -> Result<String, GamepushError> {
        let report = self.0.refresh_all().await?;
        Ok(format!(
            "current={} upcoming={}",
            report.current, report.upcoming
        ))
    }
}

/// Dispatches one window.
pub struct DispatchJob {
    pub dispatcher: NotificationDispatcher,
    pub window: PromotionWindow,
}

#[async_trait]
impl Job for DispatchJob {
    async fn run(&self) -> Result<String, GamepushError> {
        let report = self.dispatcher.dispatch(self.window).await?;
        Ok(format!(
            "attempted={} succeeded={}",
            report.attempted, report.succeeded
        ))
    }
}

/// Re-sends failed deliveries.
pub struct RetryJob(pub RetryReconciler);

#[async_trait]
impl Job for RetryJob {
    async fn run(&self) -> Result<String, GamepushError> {
        let report = self.0.retry_failed().await?;
        Ok(format!(
            "attempted={} recovered={}",
            report.attempted, report.recovered
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn job_ids_use_snake_case() {
        assert_eq!(JobId::DispatchCurrent.to_string(), "dispatch_current");
        assert_eq!(JobId::from_str("dispatch_next").unwrap(), JobId::DispatchNext);
        assert!(JobId::from_str("cleanup").is_err());
    }

    #[test]
    fn dispatch_id_follows_window() {
        assert_eq!(JobId::dispatch(PromotionWindow::Current), JobId::DispatchCurrent);
        assert_eq!(JobId::dispatch(PromotionWindow::Next), JobId::DispatchNext);
    }
}
