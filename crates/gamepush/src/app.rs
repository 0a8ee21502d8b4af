// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Composition root: builds every component once from the loaded config.

use std::sync::Arc;

use gamepush_cache::{MemoryKv, PromotionCache, SqliteKv};
use gamepush_catalog::EpicCatalog;
use gamepush_channels::{ChannelRouter, QqSender, WechatOfficialSender};
use gamepush_config::GamepushConfig;
use gamepush_config::model::CacheBackend;
use gamepush_core::{CatalogSource, GamepushError, KvStore};
use gamepush_notify::{
    CatalogRefresher, ConfirmationStateMachine, InboundReplyHandler, NotificationDispatcher,
    RetryReconciler,
};
use gamepush_scheduler::JobScheduler;
use gamepush_storage::Database;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Every long-lived component, wired together.
#[derive(Clone)]
pub struct App {
    pub db: Database,
    pub cache: PromotionCache,
    pub router: ChannelRouter,
    pub dispatcher: NotificationDispatcher,
    pub confirmations: ConfirmationStateMachine,
    pub retry: RetryReconciler,
    pub refresher: CatalogRefresher,
    pub inbound: InboundReplyHandler,
    pub scheduler: JobScheduler,
    /// Server token for WeChat callback signatures; empty disables the callback.
    pub wechat_token: String,
}

impl App {
    pub async fn build(
        config: &GamepushConfig,
        shutdown: CancellationToken,
    ) -> Result<Self, GamepushError> {
        let db = Database::from_config(&config.storage).await?;
        info!(path = %config.storage.database_path, "database opened");

        let kv: Arc<dyn KvStore> = match config.cache.backend {
            CacheBackend::Sqlite => Arc::new(SqliteKv::new(db.clone())),
            CacheBackend::Memory => Arc::new(MemoryKv::new()),
        };
        let cache = PromotionCache::new(kv);

        let router = ChannelRouter::new()
            .with(Arc::new(WechatOfficialSender::new(config.wechat.clone())?))
            .with(Arc::new(QqSender::new(config.qq.clone())?));
        for (contact_type, health) in router.health() {
            info!(%contact_type, status = health.label(), "channel registered");
        }

        let catalog: Arc<dyn CatalogSource> = Arc::new(EpicCatalog::new(config.catalog.clone())?);

        let dispatcher = NotificationDispatcher::new(
            db.clone(),
            cache.clone(),
            router.clone(),
            shutdown.clone(),
        );
        let confirmations = ConfirmationStateMachine::new(db.clone(), cache.clone());
        let retry = RetryReconciler::new(db.clone(), cache.clone(), router.clone(), shutdown.clone())
            .with_mark_notified_on_recovery(config.retry.mark_notified_on_recovery);
        let refresher = CatalogRefresher::new(catalog, cache.clone());
        let inbound = InboundReplyHandler::new(db.clone(), confirmations.clone());

        let scheduler = JobScheduler::new(config.service.utc_offset_hours, shutdown)?
            .with_notify_jobs(
                &config.schedule,
                refresher.clone(),
                dispatcher.clone(),
                retry.clone(),
            )?;

        Ok(Self {
            db,
            cache,
            router,
            dispatcher,
            confirmations,
            retry,
            refresher,
            inbound,
            scheduler,
            wechat_token: config.wechat.token.clone(),
        })
    }
}
