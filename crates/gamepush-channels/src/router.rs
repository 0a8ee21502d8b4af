// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Picks the sender for a subscriber's contact type.

use std::collections::HashMap;
use std::sync::Arc;

use gamepush_core::{ChannelSender, ContactType, DeliveryOutcome, HealthStatus};
use tracing::warn;

/// Registry of channel senders keyed by contact type.
#[derive(Clone, Default)]
pub struct ChannelRouter {
    senders: HashMap<ContactType, Arc<dyn ChannelSender>>,
}

impl ChannelRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sender under its own contact type, replacing any previous one.
    pub fn register(&mut self, sender: Arc<dyn ChannelSender>) {
        self.senders.insert(sender.contact_type(), sender);
    }

    pub fn with(mut self, sender: Arc<dyn ChannelSender>) -> Self {
        self.register(sender);
        self
    }

    pub fn get(&self, contact_type: ContactType) -> Option<&Arc<dyn ChannelSender>> {
        self.senders.get(&contact_type)
    }

    /// Send through the matching sender. A missing sender is a failed outcome.
    pub async fn send(
        &self,
        contact_type: ContactType,
        contact_id: &str,
        message: &str,
    ) -> DeliveryOutcome {
        match self.senders.get(&contact_type) {
            Some(sender) => sender.send(contact_id, message).await,
            None => {
                warn!(%contact_type, "no sender registered for contact type");
                DeliveryOutcome::failed(format!("no sender registered for {contact_type}"))
            }
        }
    }

    /// Health of every registered sender, ordered by contact type label.
    pub fn health(&self) -> Vec<(ContactType, HealthStatus)> {
        let mut report: Vec<_> = self
            .senders
            .iter()
            .map(|(contact_type, sender)| (*contact_type, sender.health()))
            .collect();
        report.sort_by_key(|(contact_type, _)| contact_type.as_str());
        report
    }
}
