// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the storefront promotions feed.

use std::time::Duration;

use async_trait::async_trait;
use gamepush_config::model::CatalogConfig;
use gamepush_core::{Catalog, CatalogSource, GamepushError};
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, info};

use crate::parse::parse_promotions;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Catalog source backed by the free-games promotions endpoint.
#[derive(Debug, Clone)]
pub struct EpicCatalog {
    config: CatalogConfig,
    client: reqwest::Client,
}

impl EpicCatalog {
    pub fn new(config: CatalogConfig) -> Result<Self, GamepushError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.locale).map_err(|e| {
                GamepushError::Config(format!("invalid catalog.locale header value: {e}"))
            })?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| upstream("failed to build HTTP client", e))?;

        Ok(Self { config, client })
    }

    fn request_url(&self) -> Result<reqwest::Url, GamepushError> {
        reqwest::Url::parse_with_params(
            &self.config.api_url,
            &[
                ("locale", self.config.locale.as_str()),
                ("country", self.config.country.as_str()),
                ("allowCountries", self.config.country.as_str()),
            ],
        )
        .map_err(|e| GamepushError::Config(format!("invalid catalog.api_url: {e}")))
    }
}

fn upstream(context: &str, e: impl std::error::Error + Send + Sync + 'static) -> GamepushError {
    GamepushError::Upstream {
        message: format!("{context}: {e}"),
        source: Some(Box::new(e)),
    }
}

#[async_trait]
impl CatalogSource for EpicCatalog {
    fn name(&self) -> &str {
        "epic"
    }

    async fn fetch(&self) -> Result<Catalog, GamepushError> {
        let url = self.request_url()?;
        debug!(%url, "fetching promotions feed");

        let payload: serde_json::Value = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| upstream("promotions request failed", e))?
            .error_for_status()
            .map_err(|e| upstream("promotions endpoint returned an error", e))?
            .json()
            .await
            .map_err(|e| upstream("promotions payload is not JSON", e))?;

        let catalog = parse_promotions(&payload, &self.config.store_url)?;
        info!(
            current = catalog.current.len(),
            upcoming = catalog.upcoming.len(),
            "promotions feed parsed"
        );
        Ok(catalog)
    }
}
