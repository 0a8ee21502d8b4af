// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound messaging capability, one implementation per channel.

use async_trait::async_trait;

use crate::types::{ContactType, DeliveryOutcome, HealthStatus};

/// Sends a text message to one contact on one messaging channel.
///
/// Implementations must not fail past this boundary: transport errors,
/// token acquisition errors, and remote API errors are all folded into a
/// failed [`DeliveryOutcome`]. A sender without credentials returns a failed
/// outcome immediately, without network I/O.
#[async_trait]
pub trait ChannelSender: Send + Sync + 'static {
    /// The contact type this sender delivers to.
    fn contact_type(&self) -> ContactType;

    /// Whether the sender has the credentials it needs.
    fn is_configured(&self) -> bool;

    /// Delivers `message` to `contact_id`.
    async fn send(&self, contact_id: &str, message: &str) -> DeliveryOutcome;

    /// Reports configuration health without touching the network.
    fn health(&self) -> HealthStatus {
        if self.is_configured() {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded(format!("{} channel is not configured", self.contact_type()))
        }
    }
}
