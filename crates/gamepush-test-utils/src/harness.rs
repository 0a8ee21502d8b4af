// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the notify core against a temp SQLite database,
//! mock senders for both channels, and a static catalog source.

use std::sync::Arc;

use gamepush_cache::{MemoryKv, PromotionCache, SqliteKv};
use gamepush_channels::ChannelRouter;
use gamepush_core::{
    ContactType, GameInfo, GamepushError, KvStore, NewSubscriber, PromotionWindow, Subscriber,
};
use gamepush_notify::{
    CatalogRefresher, ConfirmationStateMachine, InboundReplyHandler, NotificationDispatcher,
    RetryReconciler,
};
use gamepush_storage::Database;
use gamepush_storage::queries::subscribers;
use tokio_util::sync::CancellationToken;

use crate::mock_catalog::StaticCatalog;
use crate::mock_sender::MockSender;

/// Build a game with a predictable URL and promotion period.
pub fn game(slug: &str, title: &str) -> GameInfo {
    GameInfo {
        title: title.to_string(),
        slug: slug.to_string(),
        url: format!("https://store.epicgames.com/zh-CN/p/{slug}"),
        start_date: Some("2026-10-15 15:00:00".to_string()),
        end_date: Some("2026-10-22 15:00:00".to_string()),
        thumbnail: None,
    }
}

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    memory_kv: bool,
    mark_notified_on_recovery: bool,
    catalog: StaticCatalog,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            memory_kv: false,
            mark_notified_on_recovery: false,
            catalog: StaticCatalog::default(),
        }
    }

    /// Back the promotion cache with `MemoryKv` instead of SQLite tables.
    pub fn with_memory_kv(mut self) -> Self {
        self.memory_kv = true;
        self
    }

    pub fn with_mark_notified_on_recovery(mut self, enabled: bool) -> Self {
        self.mark_notified_on_recovery = enabled;
        self
    }

    /// Use `catalog` as the refresher's source.
    pub fn with_catalog(mut self, catalog: StaticCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, GamepushError> {
        let temp_dir = tempfile::TempDir::new().map_err(GamepushError::storage)?;
        let db_path = temp_dir.path().join("test.db");
        let db = Database::open(&db_path.to_string_lossy()).await?;

        let kv: Arc<dyn KvStore> = if self.memory_kv {
            Arc::new(MemoryKv::new())
        } else {
            Arc::new(SqliteKv::new(db.clone()))
        };
        let cache = PromotionCache::new(kv);

        let wechat = Arc::new(MockSender::new(ContactType::WechatOfficial));
        let qq = Arc::new(MockSender::new(ContactType::Qq));
        let router = ChannelRouter::new().with(wechat.clone()).with(qq.clone());

        let catalog = Arc::new(self.catalog);
        let shutdown = CancellationToken::new();

        let dispatcher = NotificationDispatcher::new(
            db.clone(),
            cache.clone(),
            router.clone(),
            shutdown.clone(),
        );
        let confirmations = ConfirmationStateMachine::new(db.clone(), cache.clone());
        let retry = RetryReconciler::new(db.clone(), cache.clone(), router.clone(), shutdown.clone())
            .with_mark_notified_on_recovery(self.mark_notified_on_recovery);
        let refresher = CatalogRefresher::new(catalog.clone(), cache.clone());
        let inbound = InboundReplyHandler::new(db.clone(), confirmations.clone());

        Ok(TestHarness {
            db,
            cache,
            router,
            wechat,
            qq,
            catalog,
            dispatcher,
            confirmations,
            retry,
            refresher,
            inbound,
            shutdown,
            _temp_dir: temp_dir,
        })
    }
}

/// A fully wired notify core for integration tests.
///
/// Fields are public so tests can reach any component directly.
pub struct TestHarness {
    pub db: Database,
    pub cache: PromotionCache,
    pub router: ChannelRouter,
    pub wechat: Arc<MockSender>,
    pub qq: Arc<MockSender>,
    pub catalog: Arc<StaticCatalog>,
    pub dispatcher: NotificationDispatcher,
    pub confirmations: ConfirmationStateMachine,
    pub retry: RetryReconciler,
    pub refresher: CatalogRefresher,
    pub inbound: InboundReplyHandler,
    pub shutdown: CancellationToken,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Register a subscriber.
    pub async fn subscribe(
        &self,
        epic_account: &str,
        contact_type: ContactType,
        contact_id: &str,
    ) -> Result<Subscriber, GamepushError> {
        subscribers::create_subscriber(
            &self.db,
            &NewSubscriber {
                epic_account: epic_account.to_string(),
                contact_type,
                contact_id: contact_id.to_string(),
            },
        )
        .await
    }

    /// Replace a window's cached games directly, bypassing the catalog.
    pub async fn seed_games(
        &self,
        window: PromotionWindow,
        games: &[GameInfo],
    ) -> Result<(), GamepushError> {
        self.cache.replace(window, games).await
    }

    /// The sender registered for `contact_type`.
    pub fn sender(&self, contact_type: ContactType) -> &MockSender {
        match contact_type {
            ContactType::WechatOfficial => self.wechat.as_ref(),
            ContactType::Qq => self.qq.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builds_with_both_backends() {
        for memory in [false, true] {
            let builder = TestHarness::builder();
            let builder = if memory { builder.with_memory_kv() } else { builder };
            let harness = builder.build().await.unwrap();
            harness
                .seed_games(PromotionWindow::Current, &[game("g1", "Game One")])
                .await
                .unwrap();
            let cached = harness.cache.list(PromotionWindow::Current).await.unwrap();
            assert_eq!(cached.len(), 1);
        }
    }

    #[tokio::test]
    async fn subscribe_persists() {
        let harness = TestHarness::builder().build().await.unwrap();
        let s = harness
            .subscribe("epic-1", ContactType::Qq, "10001")
            .await
            .unwrap();
        let found = subscribers::get_subscriber(&harness.db, s.id).await.unwrap();
        assert_eq!(found, Some(s));
    }
}
