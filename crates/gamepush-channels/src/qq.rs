// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! QQ private messages through a OneBot-compatible HTTP relay.

use async_trait::async_trait;
use gamepush_config::model::QqConfig;
use gamepush_core::{ChannelSender, ContactType, DeliveryOutcome, GamepushError};
use serde::Deserialize;
use tracing::debug;

/// OneBot v11 action reply.
#[derive(Debug, Deserialize)]
struct OneBotReply {
    #[serde(default)]
    status: String,
    #[serde(default)]
    retcode: Option<i64>,
    #[serde(default)]
    wording: Option<String>,
}

/// Sender for the `qq` channel.
pub struct QqSender {
    config: QqConfig,
    client: reqwest::Client,
}

impl QqSender {
    pub fn new(config: QqConfig) -> Result<Self, GamepushError> {
        let client = crate::http_client(config.timeout_secs)?;
        Ok(Self { config, client })
    }

    fn bearer(&self) -> Option<&str> {
        self.config
            .access_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
    }
}

/// QQ numbers go out as JSON numbers when they parse as one.
fn user_id_value(contact_id: &str) -> serde_json::Value {
    contact_id
        .trim()
        .parse::<i64>()
        .map(serde_json::Value::from)
        .unwrap_or_else(|_| serde_json::Value::from(contact_id))
}

#[async_trait]
impl ChannelSender for QqSender {
    fn contact_type(&self) -> ContactType {
        ContactType::Qq
    }

    fn is_configured(&self) -> bool {
        !self.config.api_url.trim().is_empty()
    }

    async fn send(&self, contact_id: &str, message: &str) -> DeliveryOutcome {
        if !self.is_configured() {
            return DeliveryOutcome::failed("qq relay is not configured (qq.api_url)");
        }

        let url = format!(
            "{}/send_private_msg",
            self.config.api_url.trim_end_matches('/')
        );
        let payload = serde_json::json!({
            "user_id": user_id_value(contact_id),
            "message": message,
        });

        let mut request = self.client.post(&url).json(&payload);
        if let Some(token) = self.bearer() {
            request = request.bearer_auth(token);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return DeliveryOutcome::failed(format!("qq relay request failed: {e}")),
        };
        let http_status = response.status();

        match response.json::<OneBotReply>().await {
            Ok(reply) if reply.status == "ok" => {
                debug!(contact_id, "qq message accepted by relay");
                DeliveryOutcome::delivered()
            }
            Ok(reply) => {
                let mut detail = format!(
                    "qq relay returned status `{}`",
                    if reply.status.is_empty() { "unknown" } else { reply.status.as_str() }
                );
                if let Some(code) = reply.retcode {
                    detail.push_str(&format!(" (retcode {code})"));
                }
                if let Some(wording) = reply.wording.filter(|w| !w.is_empty()) {
                    detail.push_str(&format!(": {wording}"));
                }
                DeliveryOutcome::failed(detail)
            }
            Err(e) => DeliveryOutcome::failed(format!(
                "qq relay reply unreadable (HTTP {http_status}): {e}"
            )),
        }
    }
}
