// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Promotions feed parsing.
//!
//! The feed is loosely typed (many fields are optional or `null`), so it is
//! walked as a [`serde_json::Value`] instead of deserialized into structs.

use chrono::{DateTime, Utc};
use gamepush_core::{Catalog, GameInfo, GamepushError};
use serde_json::Value;

const PRODUCT_SLUG_ATTRIBUTE: &str = "com.epicgames.app.productSlug";
const PREFERRED_IMAGE: &str = "OfferImageTall";
const FALLBACK_IMAGES: [&str; 4] = [
    "Thumbnail",
    "OfferImageWide",
    "DieselStoreFrontWide",
    "VaultClosed",
];

/// Parse a promotions payload into current and upcoming free games.
///
/// A game free now is never also listed as upcoming. Fails with
/// [`GamepushError::Upstream`] when the element list is missing.
pub fn parse_promotions(payload: &Value, store_url: &str) -> Result<Catalog, GamepushError> {
    let elements = payload
        .pointer("/data/Catalog/searchStore/elements")
        .and_then(Value::as_array)
        .ok_or_else(|| GamepushError::Upstream {
            message: "promotions payload has no data.Catalog.searchStore.elements array".into(),
            source: None,
        })?;

    let mut catalog = Catalog::default();
    for element in elements {
        let promotions = element.get("promotions");
        if has_free_offer(promotions, "promotionalOffers") {
            catalog.current.push(parse_game(element, store_url));
        } else if has_free_offer(promotions, "upcomingPromotionalOffers") {
            catalog.upcoming.push(parse_game(element, store_url));
        }
    }
    Ok(catalog)
}

/// Offers in `promotions[group][*].promotionalOffers[*]`.
fn offers<'a>(promotions: Option<&'a Value>, group: &str) -> impl Iterator<Item = &'a Value> {
    promotions
        .and_then(|p| p.get(group))
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|container| container.get("promotionalOffers").and_then(Value::as_array))
        .flatten()
}

fn has_free_offer(promotions: Option<&Value>, group: &str) -> bool {
    offers(promotions, group).any(|offer| {
        // A missing percentage counts as free.
        offer
            .pointer("/discountSetting/discountPercentage")
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
            == 0.0
    })
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn first_page_slug(mappings: Option<&Value>) -> Option<&str> {
    mappings
        .and_then(Value::as_array)?
        .iter()
        .find_map(|m| non_empty_str(m.get("pageSlug")))
}

/// Resolve the product page slug, most specific source first.
pub fn resolve_slug(element: &Value, title: &str) -> String {
    let from_attributes = element
        .get("customAttributes")
        .and_then(Value::as_array)
        .and_then(|attrs| {
            attrs
                .iter()
                .find(|a| a.get("key").and_then(Value::as_str) == Some(PRODUCT_SLUG_ATTRIBUTE))
        })
        .and_then(|a| non_empty_str(a.get("value")));

    let slug = from_attributes
        .or_else(|| first_page_slug(element.get("offerMappings")))
        .or_else(|| first_page_slug(element.pointer("/catalogNs/mappings")))
        .or_else(|| non_empty_str(element.get("productSlug")))
        .or_else(|| non_empty_str(element.get("urlSlug")))
        .map(str::to_string)
        .unwrap_or_else(|| slugify(title));

    match slug.strip_suffix("/home") {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => slug,
    }
}

fn slugify(title: &str) -> String {
    title.trim().to_lowercase().replace(' ', "-")
}

fn image_url(image: &Value) -> Option<String> {
    non_empty_str(image.get("url")).map(str::to_string)
}

fn first_image_where(images: &[Value], matches: impl Fn(&str) -> bool) -> Option<String> {
    images
        .iter()
        .filter(|image| image.get("type").and_then(Value::as_str).is_some_and(&matches))
        .find_map(image_url)
}

/// Pick the best key image URL.
pub fn pick_thumbnail(element: &Value) -> Option<String> {
    let images = element.get("keyImages").and_then(Value::as_array)?;
    first_image_where(images, |t| t == PREFERRED_IMAGE)
        .or_else(|| first_image_where(images, |t| FALLBACK_IMAGES.contains(&t)))
        .or_else(|| images.first().and_then(image_url))
}

/// Normalize an RFC 3339 timestamp to `YYYY-MM-DD HH:MM:SS` in UTC.
/// Unparseable input is kept as-is.
pub fn normalize_date(raw: Option<&str>) -> Option<String> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    Some(match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.with_timezone(&Utc).format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(_) => raw.to_string(),
    })
}

fn parse_game(element: &Value, store_url: &str) -> GameInfo {
    let title = non_empty_str(element.get("title"))
        .unwrap_or("Unknown")
        .to_string();
    let slug = resolve_slug(element, &title);
    let url = format!("{}/p/{slug}", store_url.trim_end_matches('/'));

    let promotions = element.get("promotions");
    let dated_offer = offers(promotions, "promotionalOffers")
        .next()
        .or_else(|| offers(promotions, "upcomingPromotionalOffers").next());
    let date = |field: &str| {
        dated_offer.and_then(|offer| normalize_date(offer.get(field).and_then(Value::as_str)))
    };

    GameInfo {
        start_date: date("startDate"),
        end_date: date("endDate"),
        thumbnail: pick_thumbnail(element),
        title,
        slug,
        url,
    }
}
