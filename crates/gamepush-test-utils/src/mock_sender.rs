// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel sender for deterministic testing.
//!
//! `MockSender` implements `ChannelSender` with a queue of scripted outcomes
//! and captures every send for assertion in tests.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use gamepush_core::{ChannelSender, ContactType, DeliveryOutcome};

/// One captured call to `send()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub contact_id: String,
    pub message: String,
}

/// A mock sender for one contact type.
///
/// Outcomes are taken from the scripted queue first; once it is empty the
/// fallback outcome applies (success unless changed with `fail_all`).
/// Captured sends include failed ones.
pub struct MockSender {
    contact_type: ContactType,
    scripted: Arc<Mutex<VecDeque<DeliveryOutcome>>>,
    fallback: Arc<Mutex<DeliveryOutcome>>,
    sent: Arc<Mutex<Vec<SentMessage>>>,
}

impl MockSender {
    /// A sender that delivers everything.
    pub fn new(contact_type: ContactType) -> Self {
        Self {
            contact_type,
            scripted: Arc::new(Mutex::new(VecDeque::new())),
            fallback: Arc::new(Mutex::new(DeliveryOutcome::delivered())),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue the outcome of the next unscripted send.
    pub async fn push_outcome(&self, outcome: DeliveryOutcome) {
        self.scripted.lock().await.push_back(outcome);
    }

    /// Make every unscripted send fail with `detail`.
    pub async fn fail_all(&self, detail: &str) {
        *self.fallback.lock().await = DeliveryOutcome::failed(detail);
    }

    /// Make every unscripted send succeed.
    pub async fn succeed_all(&self) {
        *self.fallback.lock().await = DeliveryOutcome::delivered();
    }

    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }
}

#[async_trait]
impl ChannelSender for MockSender {
    fn contact_type(&self) -> ContactType {
        self.contact_type
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn send(&self, contact_id: &str, message: &str) -> DeliveryOutcome {
        self.sent.lock().await.push(SentMessage {
            contact_id: contact_id.to_string(),
            message: message.to_string(),
        });
        match self.scripted.lock().await.pop_front() {
            Some(outcome) => outcome,
            None => self.fallback.lock().await.clone(),
        }
    }
}
