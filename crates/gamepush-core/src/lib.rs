// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the gamepush free-game notifier.
//!
//! This crate provides the error type, the shared data model, and the seam
//! traits (channel senders, catalog sources, key-value stores) that every
//! other gamepush crate builds on.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::GamepushError;
pub use types::{
    Catalog, ConfirmAction, ConfirmationStatus, ContactType, DeliveryOutcome, DeliveryStatus,
    GameInfo, HealthStatus, NewPushLog, NewSubscriber, PromotionWindow, PushLog, Subscriber,
};

pub use traits::{CatalogSource, ChannelSender, KvStore};

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn error_variants_render() {
        let storage = GamepushError::storage(std::io::Error::other("disk full"));
        assert_eq!(storage.to_string(), "storage error: disk full");
        assert!(storage.is_persistence());

        let cache = GamepushError::cache("connection refused", None);
        assert!(cache.is_persistence());

        let not_found = GamepushError::NotFound {
            entity: "subscriber",
            id: "42".into(),
        };
        assert_eq!(not_found.to_string(), "subscriber not found: 42");
        assert!(!not_found.is_persistence());
        assert!(!GamepushError::Cancelled.is_persistence());
    }

    #[test]
    fn enums_use_snake_case_labels() {
        assert_eq!(ContactType::WechatOfficial.to_string(), "wechat_official");
        assert_eq!(ContactType::from_str("qq").unwrap(), ContactType::Qq);
        assert_eq!(PromotionWindow::Next.to_string(), "next");
        assert_eq!(
            ConfirmationStatus::from_str("claimed").unwrap(),
            ConfirmationStatus::Claimed
        );
        assert!(ContactType::from_str("sms").is_err());

        let json = serde_json::to_string(&DeliveryStatus::Failed).unwrap();
        assert_eq!(json, "\"failed\"");
    }

    #[test]
    fn window_maps_to_is_next_week() {
        for window in PromotionWindow::ALL {
            assert_eq!(
                PromotionWindow::from_is_next_week(window.is_next_week()),
                window
            );
            assert_eq!(window.as_str(), window.to_string());
        }
    }

    #[test]
    fn confirm_action_transition_table() {
        assert_eq!(
            ConfirmAction::Confirmed.source_states(),
            &[ConfirmationStatus::Pending]
        );
        assert!(
            ConfirmAction::Claimed
                .source_states()
                .contains(&ConfirmationStatus::Confirmed)
        );
        // Nothing may leave claimed.
        for action in [ConfirmAction::Confirmed, ConfirmAction::Claimed] {
            assert!(
                !action
                    .source_states()
                    .contains(&ConfirmationStatus::Claimed)
            );
        }
    }

    #[test]
    fn failed_rows_have_no_confirmation_state() {
        let row = NewPushLog {
            subscriber_id: 1,
            game_slug: "g1".into(),
            game_title: "Game One".into(),
            contact_type: ContactType::Qq,
            contact_id: "10001".into(),
            delivery_status: DeliveryStatus::Failed,
            message_body: "hi".into(),
            error_message: Some("timeout".into()),
            is_next_week: false,
        };
        assert_eq!(row.initial_confirmation(), None);

        let ok = NewPushLog {
            delivery_status: DeliveryStatus::Success,
            error_message: None,
            ..row
        };
        assert_eq!(ok.initial_confirmation(), Some(ConfirmationStatus::Pending));
    }

    #[test]
    fn delivery_outcome_status() {
        assert_eq!(DeliveryOutcome::delivered().status(), DeliveryStatus::Success);
        let failed = DeliveryOutcome::failed("errcode 45015");
        assert_eq!(failed.status(), DeliveryStatus::Failed);
        assert_eq!(failed.error_detail.as_deref(), Some("errcode 45015"));
    }

    #[test]
    fn catalog_selects_window() {
        let game = GameInfo {
            title: "Game One".into(),
            slug: "g1".into(),
            url: "https://store.example/p/g1".into(),
            start_date: None,
            end_date: None,
            thumbnail: None,
        };
        let catalog = Catalog {
            current: vec![game.clone()],
            upcoming: vec![],
        };
        assert_eq!(catalog.for_window(PromotionWindow::Current), &[game]);
        assert!(catalog.for_window(PromotionWindow::Next).is_empty());
    }
}
