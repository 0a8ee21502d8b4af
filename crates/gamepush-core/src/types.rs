// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the cache, storage, channel, and notify crates.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A promotion epoch: this week's free games or next week's preview.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PromotionWindow {
    Current,
    Next,
}

impl PromotionWindow {
    /// Both windows, in refresh order.
    pub const ALL: [PromotionWindow; 2] = [PromotionWindow::Current, PromotionWindow::Next];

    /// Key-space label used by the cache.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Next => "next",
        }
    }

    /// Whether push logs for this window carry `is_next_week = true`.
    pub fn is_next_week(&self) -> bool {
        matches!(self, Self::Next)
    }

    pub fn from_is_next_week(is_next_week: bool) -> Self {
        if is_next_week { Self::Next } else { Self::Current }
    }
}

/// Messaging channel a subscriber is reachable on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContactType {
    WechatOfficial,
    Qq,
}

impl ContactType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WechatOfficial => "wechat_official",
            Self::Qq => "qq",
        }
    }
}

/// Outcome of one dispatch attempt as recorded in a push log.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Success,
    Failed,
}

/// Acknowledgment lifecycle of a delivered promotion.
///
/// Only moves forward: `pending -> confirmed -> claimed`, or
/// `pending -> claimed` directly. Nothing leaves `claimed`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationStatus {
    Pending,
    Confirmed,
    Claimed,
}

/// A subscriber-initiated transition request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ConfirmAction {
    Confirmed,
    Claimed,
}

impl ConfirmAction {
    /// States a row must currently be in for this action to apply.
    pub fn source_states(&self) -> &'static [ConfirmationStatus] {
        match self {
            Self::Confirmed => &[ConfirmationStatus::Pending],
            Self::Claimed => &[ConfirmationStatus::Pending, ConfirmationStatus::Confirmed],
        }
    }

    /// State the row ends up in.
    pub fn target(&self) -> ConfirmationStatus {
        match self {
            Self::Confirmed => ConfirmationStatus::Confirmed,
            Self::Claimed => ConfirmationStatus::Claimed,
        }
    }
}

/// One free-game promotion as scraped from the storefront.
///
/// `slug` is the natural key within a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameInfo {
    pub title: String,
    pub slug: String,
    pub url: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// Games currently free and games announced for the next rotation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub current: Vec<GameInfo>,
    pub upcoming: Vec<GameInfo>,
}

impl Catalog {
    /// The game list that belongs to the given window.
    pub fn for_window(&self, window: PromotionWindow) -> &[GameInfo] {
        match window {
            PromotionWindow::Current => &self.current,
            PromotionWindow::Next => &self.upcoming,
        }
    }

    pub fn into_window(self, window: PromotionWindow) -> Vec<GameInfo> {
        match window {
            PromotionWindow::Current => self.current,
            PromotionWindow::Next => self.upcoming,
        }
    }
}

/// A registered recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: i64,
    pub epic_account: String,
    pub contact_type: ContactType,
    pub contact_id: String,
    pub created_at: String,
}

/// Registration payload for a new subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubscriber {
    pub epic_account: String,
    pub contact_type: ContactType,
    pub contact_id: String,
}

/// Durable record of a single dispatch attempt. Never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushLog {
    pub id: i64,
    pub subscriber_id: i64,
    pub game_slug: String,
    pub game_title: String,
    pub contact_type: ContactType,
    pub contact_id: String,
    pub delivery_status: DeliveryStatus,
    pub message_body: String,
    pub error_message: Option<String>,
    /// `None` for rows whose first attempt failed.
    pub confirmation_status: Option<ConfirmationStatus>,
    pub confirmation_time: Option<String>,
    pub is_next_week: bool,
    pub created_at: String,
}

impl PushLog {
    pub fn window(&self) -> PromotionWindow {
        PromotionWindow::from_is_next_week(self.is_next_week)
    }
}

/// A push log row queued for insertion by a dispatch pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPushLog {
    pub subscriber_id: i64,
    pub game_slug: String,
    pub game_title: String,
    pub contact_type: ContactType,
    pub contact_id: String,
    pub delivery_status: DeliveryStatus,
    pub message_body: String,
    pub error_message: Option<String>,
    pub is_next_week: bool,
}

impl NewPushLog {
    /// Confirmation tracking starts at `pending` only for delivered rows.
    pub fn initial_confirmation(&self) -> Option<ConfirmationStatus> {
        match self.delivery_status {
            DeliveryStatus::Success => Some(ConfirmationStatus::Pending),
            DeliveryStatus::Failed => None,
        }
    }
}

/// Normalized result of a channel send. Never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryOutcome {
    pub success: bool,
    pub error_detail: Option<String>,
}

impl DeliveryOutcome {
    pub fn delivered() -> Self {
        Self {
            success: true,
            error_detail: None,
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            success: false,
            error_detail: Some(detail.into()),
        }
    }

    pub fn status(&self) -> DeliveryStatus {
        if self.success {
            DeliveryStatus::Success
        } else {
            DeliveryStatus::Failed
        }
    }
}

/// Health status reported by adapters and the management surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is usable but missing something (e.g. credentials).
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

impl HealthStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded(_) => "degraded",
            Self::Unhealthy(_) => "unhealthy",
        }
    }
}
