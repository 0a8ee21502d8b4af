// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the gamepush notifier.

use thiserror::Error;

/// Boxed error source carried by the storage, cache, and channel variants.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The primary error type used across gamepush crates.
///
/// Channel send failures never surface as this type past a
/// [`ChannelSender`](crate::ChannelSender); they are normalized into a
/// [`DeliveryOutcome`](crate::types::DeliveryOutcome) instead.
#[derive(Debug, Error)]
pub enum GamepushError {
    /// Configuration errors (invalid TOML, missing credentials, bad cron expressions).
    #[error("configuration error: {0}")]
    Config(String),

    /// Durable store errors (connection, query, commit failure).
    #[error("storage error: {source}")]
    Storage { source: BoxError },

    /// Key-value cache errors.
    #[error("cache error: {message}")]
    Cache {
        message: String,
        source: Option<BoxError>,
    },

    /// Outbound transport errors. Only used inside channel adapters.
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<BoxError>,
    },

    /// The storefront catalog returned malformed or unexpected data.
    #[error("upstream data error: {message}")]
    Upstream {
        message: String,
        source: Option<BoxError>,
    },

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A uniqueness constraint would be violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The operation was aborted by a shutdown request before committing.
    #[error("operation cancelled before commit")]
    Cancelled,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GamepushError {
    /// Wraps any error as a storage failure.
    pub fn storage(source: impl Into<BoxError>) -> Self {
        Self::Storage {
            source: source.into(),
        }
    }

    /// Builds a cache failure from a message and optional source.
    pub fn cache(message: impl Into<String>, source: Option<BoxError>) -> Self {
        Self::Cache {
            message: message.into(),
            source,
        }
    }

    /// True for errors that make a whole job invocation fatal (persistence).
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::Cache { .. })
    }
}
