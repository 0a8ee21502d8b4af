// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword replies from messaging channels.

use gamepush_core::{ConfirmAction, ContactType, GamepushError};
use gamepush_storage::Database;
use gamepush_storage::queries::subscribers;
use serde::Serialize;
use tracing::debug;

use crate::confirmation::{ConfirmOutcome, ConfirmationStateMachine};

const CONFIRM_KEYWORDS: &[&str] = &["确认", "confirm"];
const CLAIM_KEYWORDS: &[&str] = &["领取", "claim"];

/// Greeting sent when a contact follows the official account.
pub const WELCOME_TEXT: &str =
    "欢迎关注 Epic 免费游戏助手！\n我们会每周推送免费游戏信息。\n回复「确认」或「领取」与我们互动。";

/// Map a free-text reply to a confirmation action.
///
/// The whole trimmed message must be a keyword; matching ignores ASCII case.
pub fn parse_reply(text: &str) -> Option<ConfirmAction> {
    let text = text.trim();
    let matches = |keywords: &[&str]| keywords.iter().any(|k| k.eq_ignore_ascii_case(text));
    if matches(CONFIRM_KEYWORDS) {
        Some(ConfirmAction::Confirmed)
    } else if matches(CLAIM_KEYWORDS) {
        Some(ConfirmAction::Claimed)
    } else {
        None
    }
}

/// What an inbound reply resulted in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum InboundOutcome {
    /// The contact is not registered as a subscriber.
    Unbound,
    Applied {
        action: ConfirmAction,
        push_log_id: i64,
        game_title: String,
    },
    NothingPending { action: ConfirmAction },
    /// The text is not a known keyword.
    Unrecognized,
}

/// Outcome plus the text to send back to the contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InboundReply {
    pub outcome: InboundOutcome,
    pub reply_text: String,
}

/// Resolves the replying contact and applies the keyword to its latest
/// eligible push log.
#[derive(Clone)]
pub struct InboundReplyHandler {
    db: Database,
    confirmations: ConfirmationStateMachine,
}

impl InboundReplyHandler {
    pub fn new(db: Database, confirmations: ConfirmationStateMachine) -> Self {
        Self { db, confirmations }
    }

    pub async fn handle(
        &self,
        contact_type: ContactType,
        contact_id: &str,
        text: &str,
    ) -> Result<InboundReply, GamepushError> {
        let Some(subscriber) = subscribers::find_by_contact(&self.db, contact_type, contact_id).await?
        else {
            debug!(%contact_type, contact_id, "reply from unbound contact");
            return Ok(reply(InboundOutcome::Unbound));
        };

        let Some(action) = parse_reply(text) else {
            debug!(subscriber_id = subscriber.id, "unrecognized reply");
            return Ok(reply(InboundOutcome::Unrecognized));
        };

        let outcome = match self.confirmations.apply_latest(subscriber.id, action).await? {
            ConfirmOutcome::Applied(row) => InboundOutcome::Applied {
                action,
                push_log_id: row.id,
                game_title: row.game_title,
            },
            ConfirmOutcome::NothingPending => InboundOutcome::NothingPending { action },
        };
        Ok(reply(outcome))
    }
}

fn reply(outcome: InboundOutcome) -> InboundReply {
    let reply_text = match &outcome {
        InboundOutcome::Unbound => "您还没有订阅免费游戏提醒，请先绑定 Epic 账号。".to_string(),
        InboundOutcome::Applied {
            action: ConfirmAction::Confirmed,
            game_title,
            ..
        } => format!("已确认收到《{game_title}》的提醒，领取后请回复「领取」。"),
        InboundOutcome::Applied {
            action: ConfirmAction::Claimed,
            game_title,
            ..
        } => format!("已记录您领取了《{game_title}》，祝游戏愉快！"),
        InboundOutcome::NothingPending {
            action: ConfirmAction::Confirmed,
        } => "当前没有待确认的游戏提醒。".to_string(),
        InboundOutcome::NothingPending {
            action: ConfirmAction::Claimed,
        } => "当前没有待领取的游戏提醒。".to_string(),
        InboundOutcome::Unrecognized => {
            "回复「确认」表示已收到提醒，回复「领取」表示已领取游戏。".to_string()
        }
    };
    InboundReply {
        outcome,
        reply_text,
    }
}
