// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot management commands.
//!
//! Each command builds the application, performs a single operation, and
//! prints the result as pretty JSON.

use gamepush_config::GamepushConfig;
use gamepush_core::{
    ConfirmAction, ContactType, DeliveryStatus, GamepushError, NewSubscriber, PromotionWindow,
};
use gamepush_storage::PushLogFilter;
use gamepush_storage::queries::{push_logs, subscribers};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::app::App;

async fn build(config: &GamepushConfig) -> Result<App, GamepushError> {
    App::build(config, CancellationToken::new()).await
}

fn print_json<T: Serialize>(value: &T) -> Result<(), GamepushError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| GamepushError::Internal(format!("failed to render output: {e}")))?;
    println!("{rendered}");
    Ok(())
}

pub async fn refresh(config: &GamepushConfig) -> Result<(), GamepushError> {
    let app = build(config).await?;
    print_json(&app.refresher.refresh_all().await?)
}

pub async fn dispatch(config: &GamepushConfig, window: PromotionWindow) -> Result<(), GamepushError> {
    let app = build(config).await?;
    print_json(&app.dispatcher.dispatch(window).await?)
}

pub async fn retry(config: &GamepushConfig) -> Result<(), GamepushError> {
    let app = build(config).await?;
    print_json(&app.retry.retry_failed().await?)
}

pub async fn confirm(
    config: &GamepushConfig,
    subscriber_id: i64,
    slug: &str,
    action: ConfirmAction,
) -> Result<(), GamepushError> {
    let app = build(config).await?;
    print_json(&app.confirmations.apply(subscriber_id, slug, action).await?)
}

pub async fn subscriber_add(
    config: &GamepushConfig,
    epic_account: String,
    contact_type: ContactType,
    contact_id: String,
) -> Result<(), GamepushError> {
    let app = build(config).await?;
    let subscriber = subscribers::create_subscriber(
        &app.db,
        &NewSubscriber {
            epic_account,
            contact_type,
            contact_id,
        },
    )
    .await?;
    print_json(&subscriber)
}

pub async fn subscriber_list(config: &GamepushConfig) -> Result<(), GamepushError> {
    let app = build(config).await?;
    print_json(&subscribers::list_subscribers(&app.db).await?)
}

pub async fn subscriber_remove(config: &GamepushConfig, id: i64) -> Result<(), GamepushError> {
    let app = build(config).await?;
    if subscribers::delete_subscriber(&app.db, id).await? {
        println!("removed subscriber {id}");
        Ok(())
    } else {
        Err(GamepushError::NotFound {
            entity: "subscriber",
            id: id.to_string(),
        })
    }
}

pub async fn logs(
    config: &GamepushConfig,
    subscriber_id: Option<i64>,
    delivery_status: Option<DeliveryStatus>,
    limit: u32,
) -> Result<(), GamepushError> {
    let app = build(config).await?;
    let filter = PushLogFilter {
        subscriber_id,
        delivery_status,
        offset: None,
        limit: Some(limit),
    };
    print_json(&push_logs::list_push_logs(&app.db, &filter).await?)
}

pub fn show_config(config: &GamepushConfig) -> Result<(), GamepushError> {
    let rendered = gamepush_config::to_redacted_toml(config)
        .map_err(|e| GamepushError::Config(format!("failed to render configuration: {e}")))?;
    print!("{rendered}");
    Ok(())
}
