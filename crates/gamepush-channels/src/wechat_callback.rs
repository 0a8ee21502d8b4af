// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plaintext-mode callback protocol of the WeChat official account platform.
//!
//! The platform signs every callback with `sha1(sort(token, timestamp, nonce))`
//! and expects a passive reply in the same XML envelope it posts.

use serde::Deserialize;
use sha1::{Digest, Sha1};

/// Check a callback signature against the configured server token.
pub fn verify_signature(token: &str, signature: &str, timestamp: &str, nonce: &str) -> bool {
    let mut parts = [token, timestamp, nonce];
    parts.sort_unstable();
    let digest = Sha1::digest(parts.concat().as_bytes());
    hex::encode(digest).eq_ignore_ascii_case(signature)
}

/// One message pushed to the callback URL.
///
/// Only the fields the notifier reacts to are kept; `MsgId`, media ids and
/// the like are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CallbackMessage {
    /// The official account's original id.
    #[serde(rename = "ToUserName")]
    pub to_user_name: String,
    /// The sender's openid, which is the subscriber's contact id.
    #[serde(rename = "FromUserName")]
    pub from_user_name: String,
    #[serde(rename = "CreateTime", default)]
    pub create_time: i64,
    #[serde(rename = "MsgType")]
    pub msg_type: String,
    #[serde(rename = "Content", default)]
    pub content: Option<String>,
    #[serde(rename = "Event", default)]
    pub event: Option<String>,
}

/// What a callback message asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackKind<'a> {
    Text(&'a str),
    /// The contact followed the account.
    Subscribe,
    Other,
}

impl CallbackMessage {
    pub fn parse(xml: &str) -> Result<Self, quick_xml::de::DeError> {
        quick_xml::de::from_str(xml)
    }

    pub fn kind(&self) -> CallbackKind<'_> {
        match (self.msg_type.as_str(), &self.content, &self.event) {
            ("text", Some(content), _) => CallbackKind::Text(content),
            ("event", _, Some(event)) if event.eq_ignore_ascii_case("subscribe") => {
                CallbackKind::Subscribe
            }
            _ => CallbackKind::Other,
        }
    }

    /// Passive text reply addressed back to the sender.
    pub fn text_reply(&self, content: &str, create_time: i64) -> String {
        format!(
            "<xml>\
             <ToUserName><![CDATA[{to}]]></ToUserName>\
             <FromUserName><![CDATA[{from}]]></FromUserName>\
             <CreateTime>{create_time}</CreateTime>\
             <MsgType><![CDATA[text]]></MsgType>\
             <Content><![CDATA[{content}]]></Content>\
             </xml>",
            to = cdata(&self.from_user_name),
            from = cdata(&self.to_user_name),
            content = cdata(content),
        )
    }
}

/// Split any `]]>` so the text cannot close its CDATA section early.
fn cdata(text: &str) -> String {
    text.replace("]]>", "]]]]><![CDATA[>")
}
