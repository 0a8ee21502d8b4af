// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WeChat official account customer-service text messages.
//!
//! Sending requires an access token obtained with the app credentials. The
//! token is cached until shortly before it expires and dropped early when
//! the API reports it invalid.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use gamepush_config::model::WechatConfig;
use gamepush_core::{ChannelSender, ContactType, DeliveryOutcome, GamepushError};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Refresh the token this long before WeChat says it expires.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(300);

/// errcodes meaning the access token is invalid or expired.
const TOKEN_INVALID_CODES: [i64; 3] = [40001, 40014, 42001];

#[derive(Debug, Deserialize)]
struct TokenReply {
    access_token: Option<String>,
    expires_in: Option<u64>,
    #[serde(default)]
    errcode: i64,
    #[serde(default)]
    errmsg: String,
}

#[derive(Debug, Deserialize)]
struct ApiReply {
    #[serde(default)]
    errcode: i64,
    #[serde(default)]
    errmsg: String,
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// Sender for the `wechat_official` channel.
pub struct WechatOfficialSender {
    config: WechatConfig,
    client: reqwest::Client,
    token: Mutex<Option<CachedToken>>,
}

impl WechatOfficialSender {
    pub fn new(config: WechatConfig) -> Result<Self, GamepushError> {
        let client = crate::http_client(config.timeout_secs)?;
        Ok(Self {
            config,
            client,
            token: Mutex::new(None),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_base.trim_end_matches('/'))
    }

    /// Return the cached token, fetching a new one when missing or stale.
    async fn access_token(&self) -> Result<String, GamepushError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref()
            && Instant::now() < token.refresh_at
        {
            return Ok(token.value.clone());
        }

        let (value, expires_in) = self.fetch_token().await?;
        let lifetime = Duration::from_secs(expires_in).saturating_sub(TOKEN_REFRESH_MARGIN);
        *cached = Some(CachedToken {
            value: value.clone(),
            refresh_at: Instant::now() + lifetime,
        });
        debug!(expires_in, "wechat access token refreshed");
        Ok(value)
    }

    async fn fetch_token(&self) -> Result<(String, u64), GamepushError> {
        let url = reqwest::Url::parse_with_params(
            &self.endpoint("/cgi-bin/token"),
            &[
                ("grant_type", "client_credential"),
                ("appid", self.config.app_id.as_str()),
                ("secret", self.config.app_secret.as_str()),
            ],
        )
        .map_err(|e| channel_error("invalid wechat token URL", e))?;

        let reply: TokenReply = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| channel_error("wechat token request failed", e))?
            .json()
            .await
            .map_err(|e| channel_error("wechat token reply unreadable", e))?;

        match (reply.access_token, reply.errcode) {
            (Some(token), 0) if !token.is_empty() => Ok((token, reply.expires_in.unwrap_or(7200))),
            _ => Err(GamepushError::Channel {
                message: format!(
                    "wechat token request rejected: errcode {} {}",
                    reply.errcode, reply.errmsg
                ),
                source: None,
            }),
        }
    }

    async fn post_text(
        &self,
        token: &str,
        contact_id: &str,
        message: &str,
    ) -> Result<ApiReply, GamepushError> {
        let url = reqwest::Url::parse_with_params(
            &self.endpoint("/cgi-bin/message/custom/send"),
            &[("access_token", token)],
        )
        .map_err(|e| channel_error("invalid wechat send URL", e))?;

        let payload = serde_json::json!({
            "touser": contact_id,
            "msgtype": "text",
            "text": { "content": message },
        });

        self.client
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| channel_error("wechat send request failed", e))?
            .json()
            .await
            .map_err(|e| channel_error("wechat send reply unreadable", e))
    }

    async fn evict_token(&self) {
        *self.token.lock().await = None;
    }
}

fn channel_error(
    context: &str,
    e: impl std::error::Error + Send + Sync + 'static,
) -> GamepushError {
    GamepushError::Channel {
        message: format!("{context}: {e}"),
        source: Some(Box::new(e)),
    }
}

#[async_trait]
impl ChannelSender for WechatOfficialSender {
    fn contact_type(&self) -> ContactType {
        ContactType::WechatOfficial
    }

    fn is_configured(&self) -> bool {
        !self.config.app_id.trim().is_empty() && !self.config.app_secret.trim().is_empty()
    }

    async fn send(&self, contact_id: &str, message: &str) -> DeliveryOutcome {
        if !self.is_configured() {
            return DeliveryOutcome::failed(
                "wechat official account is not configured (wechat.app_id / wechat.app_secret)",
            );
        }

        let token = match self.access_token().await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "wechat access token unavailable");
                return DeliveryOutcome::failed(e.to_string());
            }
        };

        match self.post_text(&token, contact_id, message).await {
            Ok(reply) if reply.errcode == 0 => DeliveryOutcome::delivered(),
            Ok(reply) => {
                if TOKEN_INVALID_CODES.contains(&reply.errcode) {
                    self.evict_token().await;
                }
                DeliveryOutcome::failed(format!(
                    "wechat errcode {}: {}",
                    reply.errcode, reply.errmsg
                ))
            }
            Err(e) => DeliveryOutcome::failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(api_base: &str) -> WechatConfig {
        WechatConfig {
            app_id: "wx-app".into(),
            app_secret: "wx-secret".into(),
            token: String::new(),
            api_base: api_base.to_string(),
            timeout_secs: 2,
        }
    }

    async fn mount_token(server: &MockServer, token: &str, expected_calls: u64) {
        Mock::given(method("GET"))
            .and(path("/cgi-bin/token"))
            .and(query_param("grant_type", "client_credential"))
            .and(query_param("appid", "wx-app"))
            .and(query_param("secret", "wx-secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": token,
                "expires_in": 7200
            })))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn unconfigured_sender_fails_without_io() {
        let sender = WechatOfficialSender::new(WechatConfig::default()).unwrap();
        assert!(!sender.is_configured());
        let outcome = sender.send("openid", "hello").await;
        assert!(!outcome.success);
        assert!(outcome.error_detail.unwrap().contains("not configured"));
    }

    #[tokio::test]
    async fn sends_text_and_reuses_token() {
        let server = MockServer::start().await;
        mount_token(&server, "tok-1", 1).await;
        Mock::given(method("POST"))
            .and(path("/cgi-bin/message/custom/send"))
            .and(query_param("access_token", "tok-1"))
            .and(body_partial_json(serde_json::json!({
                "touser": "openid-1",
                "msgtype": "text",
                "text": { "content": "free game" }
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"errcode": 0, "errmsg": "ok"})),
            )
            .expect(2)
            .mount(&server)
            .await;

        let sender = WechatOfficialSender::new(config(&server.uri())).unwrap();
        assert!(sender.send("openid-1", "free game").await.success);
        assert!(sender.send("openid-1", "free game").await.success);
    }

    #[tokio::test]
    async fn api_error_becomes_failed_outcome() {
        let server = MockServer::start().await;
        mount_token(&server, "tok-1", 1).await;
        Mock::given(method("POST"))
            .and(path("/cgi-bin/message/custom/send"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "errcode": 45015,
                "errmsg": "response out of time limit"
            })))
            .mount(&server)
            .await;

        let sender = WechatOfficialSender::new(config(&server.uri())).unwrap();
        let outcome = sender.send("openid-1", "hi").await;
        assert!(!outcome.success);
        assert!(outcome.error_detail.unwrap().contains("45015"));
    }

    #[tokio::test]
    async fn invalid_token_is_evicted() {
        let server = MockServer::start().await;
        mount_token(&server, "tok-1", 2).await;
        Mock::given(method("POST"))
            .and(path("/cgi-bin/message/custom/send"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "errcode": 40001,
                "errmsg": "invalid credential"
            })))
            .mount(&server)
            .await;

        let sender = WechatOfficialSender::new(config(&server.uri())).unwrap();
        assert!(!sender.send("openid-1", "hi").await.success);
        // Second send must fetch a fresh token.
        assert!(!sender.send("openid-1", "hi").await.success);
    }

    #[tokio::test]
    async fn token_failure_is_a_send_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cgi-bin/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "errcode": 40013,
                "errmsg": "invalid appid"
            })))
            .mount(&server)
            .await;

        let sender = WechatOfficialSender::new(config(&server.uri())).unwrap();
        let outcome = sender.send("openid-1", "hi").await;
        assert!(!outcome.success);
        assert!(outcome.error_detail.unwrap().contains("40013"));
    }

    #[tokio::test]
    async fn unreachable_api_is_a_send_failure() {
        let sender = WechatOfficialSender::new(config("http://127.0.0.1:9")).unwrap();
        assert!(!sender.send("openid-1", "hi").await.success);
    }
}
