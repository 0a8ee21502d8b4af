// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog source tests against a mocked promotions endpoint.

use gamepush_catalog::{EpicCatalog, parse_promotions};
use gamepush_config::model::CatalogConfig;
use gamepush_core::{CatalogSource, GamepushError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FIXTURE: &str = include_str!("fixtures/promotions.json");

fn config(server: &MockServer) -> CatalogConfig {
    CatalogConfig {
        api_url: format!("{}/freeGamesPromotions", server.uri()),
        store_url: "https://store.example/zh-CN/".into(),
        locale: "zh-CN".into(),
        country: "CN".into(),
        timeout_secs: 5,
    }
}

#[test]
fn fixture_splits_current_and_upcoming() {
    let payload: serde_json::Value = serde_json::from_str(FIXTURE).unwrap();
    let catalog = parse_promotions(&payload, "https://store.example/zh-CN").unwrap();

    assert_eq!(catalog.current.len(), 1);
    let current = &catalog.current[0];
    assert_eq!(current.title, "Hollow Lantern");
    assert_eq!(current.slug, "hollow-lantern");
    assert_eq!(current.url, "https://store.example/zh-CN/p/hollow-lantern");
    assert_eq!(
        current.thumbnail.as_deref(),
        Some("https://cdn.example/hollow-tall.jpg")
    );
    assert_eq!(current.start_date.as_deref(), Some("2026-10-15 15:00:00"));
    assert_eq!(current.end_date.as_deref(), Some("2026-10-22 15:00:00"));

    assert_eq!(catalog.upcoming.len(), 1);
    let upcoming = &catalog.upcoming[0];
    assert_eq!(upcoming.slug, "iron-courier");
    assert_eq!(upcoming.start_date.as_deref(), Some("2026-10-22 15:00:00"));
}

#[tokio::test]
async fn fetch_sends_locale_and_parses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/freeGamesPromotions"))
        .and(query_param("locale", "zh-CN"))
        .and(query_param("country", "CN"))
        .and(query_param("allowCountries", "CN"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FIXTURE))
        .expect(1)
        .mount(&server)
        .await;

    let source = EpicCatalog::new(config(&server)).unwrap();
    let catalog = source.fetch().await.unwrap();
    assert_eq!(catalog.current[0].slug, "hollow-lantern");
    assert_eq!(catalog.upcoming[0].slug, "iron-courier");
}

#[tokio::test]
async fn http_error_is_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = EpicCatalog::new(config(&server))
        .unwrap()
        .fetch()
        .await
        .unwrap_err();
    assert!(matches!(err, GamepushError::Upstream { .. }));
}

#[tokio::test]
async fn malformed_payload_is_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"errors": []})))
        .mount(&server)
        .await;

    let err = EpicCatalog::new(config(&server))
        .unwrap()
        .fetch()
        .await
        .unwrap_err();
    assert!(matches!(err, GamepushError::Upstream { .. }));
}
