// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound channel senders.
//!
//! Each sender implements [`ChannelSender`](gamepush_core::ChannelSender) and
//! never returns an error: transport, token, and remote API problems all
//! become a failed [`DeliveryOutcome`](gamepush_core::DeliveryOutcome).
//!
//! [`wechat_callback`] covers the inbound half of the official account
//! channel: signature checks and the XML message envelope.

pub mod qq;
pub mod router;
pub mod wechat;
pub mod wechat_callback;

pub use qq::QqSender;
pub use router::ChannelRouter;
pub use wechat::WechatOfficialSender;
pub use wechat_callback::{CallbackKind, CallbackMessage, verify_signature};

use std::time::Duration;

use gamepush_core::GamepushError;

/// Build an HTTP client with a per-request timeout.
pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client, GamepushError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| GamepushError::Channel {
            message: format!("failed to build HTTP client: {e}"),
            source: Some(Box::new(e)),
        })
}
