// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The promotion cache proper.

use std::sync::Arc;

use gamepush_core::{GameInfo, GamepushError, KvStore, PromotionWindow};
use tracing::{debug, warn};

use crate::keys;

/// Per-window game lists plus dedup and status state.
///
/// All state of a window is keyed by `(window, slug)`. [`replace`] wipes the
/// window's dedup and status state together with the game list, so it must
/// run before a fresh scrape is stored; otherwise a game that disappears and
/// later returns under the same slug would stay suppressed.
///
/// [`replace`]: PromotionCache::replace
#[derive(Clone)]
pub struct PromotionCache {
    kv: Arc<dyn KvStore>,
}

impl PromotionCache {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Discard the window's list, dedup set, and status map, then store `games`.
    pub async fn replace(
        &self,
        window: PromotionWindow,
        games: &[GameInfo],
    ) -> Result<(), GamepushError> {
        let encoded = games
            .iter()
            .map(|game| {
                serde_json::to_string(game)
                    .map_err(|e| GamepushError::cache("failed to encode game", Some(Box::new(e))))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.kv
            .reset(
                &keys::window_state_prefixes(window),
                &keys::games_key(window),
                encoded,
            )
            .await?;
        debug!(%window, games = games.len(), "promotion cache replaced");
        Ok(())
    }

    /// The cached games of `window`, in stored order.
    ///
    /// Entries that fail to decode are skipped with a warning.
    pub async fn list(&self, window: PromotionWindow) -> Result<Vec<GameInfo>, GamepushError> {
        let raw = self.kv.list_get(&keys::games_key(window)).await?;
        Ok(raw
            .iter()
            .filter_map(|entry| match serde_json::from_str::<GameInfo>(entry) {
                Ok(game) => Some(game),
                Err(e) => {
                    warn!(%window, error = %e, "skipping undecodable cached game");
                    None
                }
            })
            .collect())
    }

    /// Look up one cached game by slug.
    pub async fn find(
        &self,
        window: PromotionWindow,
        slug: &str,
    ) -> Result<Option<GameInfo>, GamepushError> {
        Ok(self
            .list(window)
            .await?
            .into_iter()
            .find(|game| game.slug == slug))
    }

    /// Record that `subscriber_id` was notified about `slug`. Idempotent.
    pub async fn mark_notified(
        &self,
        window: PromotionWindow,
        slug: &str,
        subscriber_id: i64,
    ) -> Result<(), GamepushError> {
        self.kv
            .set_add(&keys::notified_key(window, slug), &subscriber_id.to_string())
            .await?;
        Ok(())
    }

    pub async fn is_notified(
        &self,
        window: PromotionWindow,
        slug: &str,
        subscriber_id: i64,
    ) -> Result<bool, GamepushError> {
        self.kv
            .set_contains(&keys::notified_key(window, slug), &subscriber_id.to_string())
            .await
    }

    pub async fn set_status(
        &self,
        window: PromotionWindow,
        slug: &str,
        subscriber_id: i64,
        status: &str,
    ) -> Result<(), GamepushError> {
        self.kv
            .hash_set(
                &keys::status_key(window, slug),
                &subscriber_id.to_string(),
                status,
            )
            .await
    }

    pub async fn get_status(
        &self,
        window: PromotionWindow,
        slug: &str,
        subscriber_id: i64,
    ) -> Result<Option<String>, GamepushError> {
        self.kv
            .hash_get(&keys::status_key(window, slug), &subscriber_id.to_string())
            .await
    }
}
