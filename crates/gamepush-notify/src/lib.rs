// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification dispatch and state tracking.
//!
//! - [`NotificationDispatcher`] fans cached promotions out to subscribers,
//!   exactly once per `(window, game, subscriber)` epoch.
//! - [`ConfirmationStateMachine`] moves delivered rows through
//!   `pending -> confirmed -> claimed`.
//! - [`RetryReconciler`] re-sends rows whose delivery failed.
//! - [`CatalogRefresher`] replaces cached windows from the catalog source.
//! - [`InboundReplyHandler`] turns channel replies into confirmation actions.

pub mod confirmation;
pub mod dispatcher;
pub mod inbound;
pub mod message;
pub mod refresh;
pub mod retry;

pub use confirmation::{ConfirmOutcome, ConfirmationStateMachine};
pub use dispatcher::{DispatchReport, NotificationDispatcher, SingleDispatch};
pub use inbound::{InboundOutcome, InboundReply, InboundReplyHandler, WELCOME_TEXT, parse_reply};
pub use refresh::{CatalogRefresher, RefreshReport};
pub use retry::{RetryReconciler, RetryReport};
