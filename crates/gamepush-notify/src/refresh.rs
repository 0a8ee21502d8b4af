// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog refresh into the promotion cache.

use std::sync::Arc;

use gamepush_cache::PromotionCache;
use gamepush_core::{Catalog, CatalogSource, GamepushError, PromotionWindow};
use serde::Serialize;
use tracing::{info, warn};

/// Number of games stored per window by a refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    pub current: usize,
    pub upcoming: usize,
}

/// Fetches the catalog and replaces cached windows with it.
///
/// A failed or malformed fetch is treated as an empty catalog, so a refresh
/// always resets the window's dedup and status state.
#[derive(Clone)]
pub struct CatalogRefresher {
    source: Arc<dyn CatalogSource>,
    cache: PromotionCache,
}

impl CatalogRefresher {
    pub fn new(source: Arc<dyn CatalogSource>, cache: PromotionCache) -> Self {
        Self { source, cache }
    }

    /// Refresh a single window. Returns the number of games stored.
    pub async fn refresh(&self, window: PromotionWindow) -> Result<usize, GamepushError> {
        let games = self.fetch().await.into_window(window);
        self.cache.replace(window, &games).await?;
        info!(%window, games = games.len(), "promotion window refreshed");
        Ok(games.len())
    }

    /// Refresh both windows from one fetch.
    pub async fn refresh_all(&self) -> Result<RefreshReport, GamepushError> {
        let catalog = self.fetch().await;
        for window in PromotionWindow::ALL {
            self.cache
                .replace(window, catalog.for_window(window))
                .await?;
        }
        let report = RefreshReport {
            current: catalog.current.len(),
            upcoming: catalog.upcoming.len(),
        };
        info!(
            current = report.current,
            upcoming = report.upcoming,
            "promotion cache refreshed"
        );
        Ok(report)
    }

    async fn fetch(&self) -> Catalog {
        match self.source.fetch().await {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!(source = self.source.name(), error = %e, "catalog fetch failed, using empty catalog");
                Catalog::default()
            }
        }
    }
}
