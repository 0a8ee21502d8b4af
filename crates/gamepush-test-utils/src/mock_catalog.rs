// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog source serving a fixed catalog.

use async_trait::async_trait;
use tokio::sync::Mutex;

use gamepush_core::{Catalog, CatalogSource, GameInfo, GamepushError};

/// Returns whatever catalog was last set, or an upstream error when failing.
pub struct StaticCatalog {
    catalog: Mutex<Option<Catalog>>,
}

impl StaticCatalog {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Mutex::new(Some(catalog)),
        }
    }

    /// A source whose every fetch fails with malformed data.
    pub fn failing() -> Self {
        Self {
            catalog: Mutex::new(None),
        }
    }

    pub async fn set(&self, current: Vec<GameInfo>, upcoming: Vec<GameInfo>) {
        *self.catalog.lock().await = Some(Catalog { current, upcoming });
    }

    pub async fn fail(&self) {
        *self.catalog.lock().await = None;
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::new(Catalog::default())
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(&self) -> Result<Catalog, GamepushError> {
        self.catalog
            .lock()
            .await
            .clone()
            .ok_or_else(|| GamepushError::Upstream {
                message: "static catalog set to fail".to_string(),
                source: None,
            })
    }
}
