// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage-side model types.
//!
//! Entities shared across crates live in `gamepush-core::types` and are
//! re-exported here. Query filters are storage-only.

pub use gamepush_core::types::{
    ConfirmationStatus, ContactType, DeliveryStatus, NewPushLog, NewSubscriber, PushLog,
    Subscriber,
};

/// Filter and paging for push log listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct PushLogFilter {
    #[serde(default)]
    pub subscriber_id: Option<i64>,
    #[serde(default)]
    pub delivery_status: Option<DeliveryStatus>,
    /// Rows to skip.
    #[serde(default)]
    pub offset: Option<u32>,
    /// Page size, capped at [`PushLogFilter::MAX_LIMIT`].
    #[serde(default)]
    pub limit: Option<u32>,
}

impl PushLogFilter {
    pub const DEFAULT_LIMIT: u32 = 100;
    pub const MAX_LIMIT: u32 = 1000;

    pub fn effective_limit(&self) -> u32 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }
}
