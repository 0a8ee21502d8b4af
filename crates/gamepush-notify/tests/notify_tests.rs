// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dispatch, confirmation, and retry behaviour against a real SQLite store.

use gamepush_core::{
    ConfirmAction, ConfirmationStatus, ContactType, DeliveryOutcome, DeliveryStatus,
    GamepushError, PromotionWindow,
};
use gamepush_notify::{ConfirmOutcome, InboundOutcome, SingleDispatch};
use gamepush_storage::PushLogFilter;
use gamepush_storage::queries::push_logs;
use gamepush_test_utils::{StaticCatalog, TestHarness, game};

const CURRENT: PromotionWindow = PromotionWindow::Current;

async fn all_logs(h: &TestHarness) -> Vec<gamepush_core::PushLog> {
    push_logs::list_push_logs(&h.db, &PushLogFilter::default())
        .await
        .unwrap()
}

#[tokio::test]
async fn dispatch_confirm_claim_then_redispatch_is_noop() {
    let h = TestHarness::builder().build().await.unwrap();
    h.seed_games(CURRENT, &[game("g1", "Game One")]).await.unwrap();
    let s1 = h
        .subscribe("epic-s1", ContactType::WechatOfficial, "openid-s1")
        .await
        .unwrap();

    let report = h.dispatcher.dispatch(CURRENT).await.unwrap();
    assert_eq!((report.attempted, report.succeeded), (1, 1));

    let logs = all_logs(&h).await;
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].delivery_status, DeliveryStatus::Success);
    assert_eq!(logs[0].confirmation_status, Some(ConfirmationStatus::Pending));
    assert!(!logs[0].is_next_week);
    assert!(h.cache.is_notified(CURRENT, "g1", s1.id).await.unwrap());
    assert_eq!(
        h.cache.get_status(CURRENT, "g1", s1.id).await.unwrap().as_deref(),
        Some("pending")
    );

    let confirmed = h
        .confirmations
        .apply(s1.id, "g1", ConfirmAction::Confirmed)
        .await
        .unwrap();
    let ConfirmOutcome::Applied(row) = confirmed else {
        panic!("expected confirmation to apply");
    };
    assert_eq!(row.confirmation_status, Some(ConfirmationStatus::Confirmed));
    assert!(row.confirmation_time.is_some());

    let claimed = h
        .confirmations
        .apply(s1.id, "g1", ConfirmAction::Claimed)
        .await
        .unwrap();
    let ConfirmOutcome::Applied(row) = claimed else {
        panic!("expected claim to apply");
    };
    assert_eq!(row.confirmation_status, Some(ConfirmationStatus::Claimed));
    assert_eq!(
        h.cache.get_status(CURRENT, "g1", s1.id).await.unwrap().as_deref(),
        Some("claimed")
    );

    let again = h.dispatcher.dispatch(CURRENT).await.unwrap();
    assert_eq!((again.attempted, again.succeeded), (0, 0));
    assert_eq!(h.wechat.sent_count().await, 1);
}

#[tokio::test]
async fn dispatch_is_idempotent_across_subscribers_and_games() {
    let h = TestHarness::builder().with_memory_kv().build().await.unwrap();
    h.seed_games(CURRENT, &[game("g1", "Game One"), game("g2", "Game Two")])
        .await
        .unwrap();
    h.subscribe("a", ContactType::WechatOfficial, "wx-a").await.unwrap();
    h.subscribe("b", ContactType::Qq, "10002").await.unwrap();

    let first = h.dispatcher.dispatch(CURRENT).await.unwrap();
    assert_eq!((first.attempted, first.succeeded), (4, 4));

    for _ in 0..3 {
        let next = h.dispatcher.dispatch(CURRENT).await.unwrap();
        assert_eq!(next.succeeded, 0);
        assert_eq!(next.attempted, 0);
    }
    assert_eq!(all_logs(&h).await.len(), 4);
}

#[tokio::test]
async fn empty_catalog_attempts_nothing() {
    let h = TestHarness::builder().build().await.unwrap();
    h.subscribe("a", ContactType::Qq, "10001").await.unwrap();

    let report = h.dispatcher.dispatch(CURRENT).await.unwrap();
    assert_eq!((report.attempted, report.succeeded), (0, 0));
    assert_eq!(h.qq.sent_count().await, 0);
    assert!(all_logs(&h).await.is_empty());
}

#[tokio::test]
async fn failed_send_is_logged_and_loop_continues() {
    let h = TestHarness::builder().build().await.unwrap();
    h.seed_games(CURRENT, &[game("g1", "Game One")]).await.unwrap();
    let s1 = h.subscribe("a", ContactType::WechatOfficial, "wx-a").await.unwrap();
    let s2 = h.subscribe("b", ContactType::Qq, "10002").await.unwrap();
    h.qq.fail_all("connection refused").await;

    let report = h.dispatcher.dispatch(CURRENT).await.unwrap();
    assert_eq!((report.attempted, report.succeeded), (2, 1));

    let logs = all_logs(&h).await;
    let failed: Vec<_> = logs
        .iter()
        .filter(|l| l.delivery_status == DeliveryStatus::Failed)
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].subscriber_id, s2.id);
    assert_eq!(failed[0].error_message.as_deref(), Some("connection refused"));
    assert_eq!(failed[0].confirmation_status, None);

    assert!(h.cache.is_notified(CURRENT, "g1", s1.id).await.unwrap());
    assert!(!h.cache.is_notified(CURRENT, "g1", s2.id).await.unwrap());
    assert_eq!(h.cache.get_status(CURRENT, "g1", s2.id).await.unwrap(), None);
}

#[tokio::test]
async fn retry_recovers_but_dispatch_still_attempts_by_default() {
    let h = TestHarness::builder().build().await.unwrap();
    h.seed_games(CURRENT, &[game("g1", "Game One")]).await.unwrap();
    let s2 = h.subscribe("b", ContactType::Qq, "10002").await.unwrap();
    h.qq.fail_all("timeout").await;
    h.dispatcher.dispatch(CURRENT).await.unwrap();

    h.qq.succeed_all().await;
    let report = h.retry.retry_failed().await.unwrap();
    assert_eq!((report.attempted, report.recovered), (1, 1));

    let logs = all_logs(&h).await;
    assert_eq!(logs[0].delivery_status, DeliveryStatus::Success);
    assert_eq!(logs[0].error_message, None);
    assert_eq!(logs[0].confirmation_status, None);
    assert!(!h.cache.is_notified(CURRENT, "g1", s2.id).await.unwrap());

    let sent = h.qq.sent_messages().await;
    assert_eq!(sent[0].message, sent[1].message, "retry resends the stored body");

    let again = h.dispatcher.dispatch(CURRENT).await.unwrap();
    assert_eq!((again.attempted, again.succeeded), (1, 1));
}

#[tokio::test]
async fn retry_marks_notified_when_enabled() {
    let h = TestHarness::builder()
        .with_mark_notified_on_recovery(true)
        .build()
        .await
        .unwrap();
    h.seed_games(CURRENT, &[game("g1", "Game One")]).await.unwrap();
    let s2 = h.subscribe("b", ContactType::Qq, "10002").await.unwrap();
    h.qq.fail_all("timeout").await;
    h.dispatcher.dispatch(CURRENT).await.unwrap();

    h.qq.succeed_all().await;
    h.retry.retry_failed().await.unwrap();
    assert!(h.cache.is_notified(CURRENT, "g1", s2.id).await.unwrap());

    let again = h.dispatcher.dispatch(CURRENT).await.unwrap();
    assert_eq!(again.attempted, 0);
}

#[tokio::test]
async fn retry_only_touches_failed_rows() {
    let h = TestHarness::builder().build().await.unwrap();
    h.seed_games(CURRENT, &[game("g1", "Game One")]).await.unwrap();
    let s1 = h.subscribe("a", ContactType::WechatOfficial, "wx-a").await.unwrap();
    h.subscribe("b", ContactType::Qq, "10002").await.unwrap();
    h.qq.fail_all("timeout").await;
    h.dispatcher.dispatch(CURRENT).await.unwrap();
    h.confirmations
        .apply(s1.id, "g1", ConfirmAction::Confirmed)
        .await
        .unwrap();
    let before: Vec<_> = all_logs(&h)
        .await
        .into_iter()
        .filter(|l| l.subscriber_id == s1.id)
        .collect();

    h.qq.fail_all("still down").await;
    let report = h.retry.retry_failed().await.unwrap();
    assert_eq!((report.attempted, report.recovered), (1, 0));

    let after = all_logs(&h).await;
    let s1_after: Vec<_> = after.iter().filter(|l| l.subscriber_id == s1.id).cloned().collect();
    assert_eq!(before, s1_after);
    let failed = after.iter().find(|l| l.subscriber_id != s1.id).unwrap();
    assert_eq!(failed.delivery_status, DeliveryStatus::Failed);
    assert_eq!(failed.error_message.as_deref(), Some("still down"));
    assert_eq!(h.wechat.sent_count().await, 1);
}

#[tokio::test]
async fn refresh_clears_dedup_for_returning_slug() {
    let catalog = StaticCatalog::default();
    let h = TestHarness::builder().with_catalog(catalog).build().await.unwrap();
    h.catalog.set(vec![game("g1", "Game One")], vec![]).await;
    let s1 = h.subscribe("a", ContactType::Qq, "10001").await.unwrap();

    h.refresher.refresh_all().await.unwrap();
    h.dispatcher.dispatch(CURRENT).await.unwrap();
    assert!(h.cache.is_notified(CURRENT, "g1", s1.id).await.unwrap());

    let report = h.refresher.refresh(CURRENT).await.unwrap();
    assert_eq!(report, 1);
    assert!(!h.cache.is_notified(CURRENT, "g1", s1.id).await.unwrap());
    assert_eq!(h.cache.get_status(CURRENT, "g1", s1.id).await.unwrap(), None);

    let again = h.dispatcher.dispatch(CURRENT).await.unwrap();
    assert_eq!(again.succeeded, 1);
}

#[tokio::test]
async fn failing_catalog_yields_empty_windows() {
    let h = TestHarness::builder()
        .with_catalog(StaticCatalog::failing())
        .build()
        .await
        .unwrap();
    h.seed_games(CURRENT, &[game("stale", "Stale")]).await.unwrap();

    let report = h.refresher.refresh_all().await.unwrap();
    assert_eq!((report.current, report.upcoming), (0, 0));
    assert!(h.cache.list(CURRENT).await.unwrap().is_empty());
}

#[tokio::test]
async fn confirmed_after_claimed_is_noop() {
    let h = TestHarness::builder().build().await.unwrap();
    h.seed_games(CURRENT, &[game("g1", "Game One")]).await.unwrap();
    let s1 = h.subscribe("a", ContactType::Qq, "10001").await.unwrap();
    h.dispatcher.dispatch(CURRENT).await.unwrap();

    let ConfirmOutcome::Applied(claimed) = h
        .confirmations
        .apply(s1.id, "g1", ConfirmAction::Claimed)
        .await
        .unwrap()
    else {
        panic!("pending -> claimed should apply");
    };

    let outcome = h
        .confirmations
        .apply(s1.id, "g1", ConfirmAction::Confirmed)
        .await
        .unwrap();
    assert_eq!(outcome, ConfirmOutcome::NothingPending);

    let row = push_logs::get_push_log(&h.db, claimed.id).await.unwrap().unwrap();
    assert_eq!(row.confirmation_status, Some(ConfirmationStatus::Claimed));
    assert_eq!(row.confirmation_time, claimed.confirmation_time);
}

#[tokio::test]
async fn failed_rows_are_not_confirmable() {
    let h = TestHarness::builder().build().await.unwrap();
    h.seed_games(CURRENT, &[game("g1", "Game One")]).await.unwrap();
    let s2 = h.subscribe("b", ContactType::Qq, "10002").await.unwrap();
    h.qq.fail_all("timeout").await;
    h.dispatcher.dispatch(CURRENT).await.unwrap();

    for action in [ConfirmAction::Confirmed, ConfirmAction::Claimed] {
        let outcome = h.confirmations.apply(s2.id, "g1", action).await.unwrap();
        assert_eq!(outcome, ConfirmOutcome::NothingPending);
    }
}

#[tokio::test]
async fn cancelled_dispatch_commits_nothing() {
    let h = TestHarness::builder().build().await.unwrap();
    h.seed_games(CURRENT, &[game("g1", "Game One")]).await.unwrap();
    let s1 = h.subscribe("a", ContactType::Qq, "10001").await.unwrap();
    h.shutdown.cancel();

    let err = h.dispatcher.dispatch(CURRENT).await.unwrap_err();
    assert!(matches!(err, GamepushError::Cancelled));
    assert!(all_logs(&h).await.is_empty());
    assert!(!h.cache.is_notified(CURRENT, "g1", s1.id).await.unwrap());
}

async fn exec(h: &TestHarness, sql: &'static str) {
    h.db.connection()
        .call(move |conn| conn.execute_batch(sql))
        .await
        .unwrap();
}

#[tokio::test]
async fn failed_commit_leaves_no_cache_marks_and_rerun_delivers() {
    let h = TestHarness::builder().build().await.unwrap();
    h.seed_games(CURRENT, &[game("g1", "Game One")]).await.unwrap();
    let s1 = h.subscribe("a", ContactType::Qq, "10001").await.unwrap();
    exec(
        &h,
        "CREATE TRIGGER reject_push_logs BEFORE INSERT ON push_logs \
         BEGIN SELECT RAISE(ABORT, 'disk full'); END;",
    )
    .await;

    let err = h.dispatcher.dispatch(CURRENT).await.unwrap_err();
    assert!(matches!(err, GamepushError::Storage { .. }));
    assert!(err.is_persistence());
    assert_eq!(h.qq.sent_count().await, 1);
    assert!(all_logs(&h).await.is_empty());
    assert!(!h.cache.is_notified(CURRENT, "g1", s1.id).await.unwrap());
    assert_eq!(h.cache.get_status(CURRENT, "g1", s1.id).await.unwrap(), None);

    exec(&h, "DROP TRIGGER reject_push_logs;").await;
    let report = h.dispatcher.dispatch(CURRENT).await.unwrap();
    assert_eq!((report.attempted, report.succeeded), (1, 1));
    // The lost commit costs a duplicate send, never a lost one.
    assert_eq!(h.qq.sent_count().await, 2);
    let logs = all_logs(&h).await;
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].delivery_status, DeliveryStatus::Success);
    assert!(h.cache.is_notified(CURRENT, "g1", s1.id).await.unwrap());
}

#[tokio::test]
async fn next_window_logs_are_flagged() {
    let h = TestHarness::builder().build().await.unwrap();
    h.seed_games(PromotionWindow::Next, &[game("g9", "Game Nine")])
        .await
        .unwrap();
    let s1 = h.subscribe("a", ContactType::WechatOfficial, "wx-a").await.unwrap();

    h.dispatcher.dispatch(PromotionWindow::Next).await.unwrap();
    let logs = all_logs(&h).await;
    assert!(logs[0].is_next_week);
    assert!(!logs[0].message_body.contains("href"));
    assert!(h.cache.is_notified(PromotionWindow::Next, "g9", s1.id).await.unwrap());
    assert!(!h.cache.is_notified(CURRENT, "g9", s1.id).await.unwrap());
}

#[tokio::test]
async fn dispatch_one_honours_dedup() {
    let h = TestHarness::builder().build().await.unwrap();
    h.seed_games(CURRENT, &[game("g1", "Game One")]).await.unwrap();
    let s1 = h.subscribe("a", ContactType::Qq, "10001").await.unwrap();
    h.qq.push_outcome(DeliveryOutcome::failed("busy")).await;

    let first = h.dispatcher.dispatch_one(CURRENT, s1.id, "g1").await.unwrap();
    let SingleDispatch::Attempted { outcome, .. } = first else {
        panic!("first push should be attempted");
    };
    assert!(!outcome.success);

    let second = h.dispatcher.dispatch_one(CURRENT, s1.id, "g1").await.unwrap();
    assert!(matches!(
        second,
        SingleDispatch::Attempted { ref outcome, .. } if outcome.success
    ));

    let third = h.dispatcher.dispatch_one(CURRENT, s1.id, "g1").await.unwrap();
    assert_eq!(third, SingleDispatch::AlreadyNotified);
}

#[tokio::test]
async fn dispatch_one_reports_missing_entities() {
    let h = TestHarness::builder().build().await.unwrap();
    h.seed_games(CURRENT, &[game("g1", "Game One")]).await.unwrap();
    let s1 = h.subscribe("a", ContactType::Qq, "10001").await.unwrap();

    let err = h.dispatcher.dispatch_one(CURRENT, 999, "g1").await.unwrap_err();
    assert!(matches!(err, GamepushError::NotFound { entity: "subscriber", .. }));

    let err = h
        .dispatcher
        .dispatch_one(CURRENT, s1.id, "nope")
        .await
        .unwrap_err();
    assert!(matches!(err, GamepushError::NotFound { entity: "game", .. }));
}

#[tokio::test]
async fn inbound_replies_drive_the_state_machine() {
    let h = TestHarness::builder().build().await.unwrap();
    h.seed_games(CURRENT, &[game("g1", "Game One")]).await.unwrap();
    h.subscribe("a", ContactType::WechatOfficial, "wx-a").await.unwrap();
    h.dispatcher.dispatch(CURRENT).await.unwrap();

    let unbound = h
        .inbound
        .handle(ContactType::WechatOfficial, "stranger", "确认")
        .await
        .unwrap();
    assert_eq!(unbound.outcome, InboundOutcome::Unbound);

    let hint = h
        .inbound
        .handle(ContactType::WechatOfficial, "wx-a", "hello")
        .await
        .unwrap();
    assert_eq!(hint.outcome, InboundOutcome::Unrecognized);

    let confirmed = h
        .inbound
        .handle(ContactType::WechatOfficial, "wx-a", " 确认 ")
        .await
        .unwrap();
    assert!(matches!(
        confirmed.outcome,
        InboundOutcome::Applied { action: ConfirmAction::Confirmed, ref game_title, .. }
            if game_title == "Game One"
    ));

    let again = h
        .inbound
        .handle(ContactType::WechatOfficial, "wx-a", "confirm")
        .await
        .unwrap();
    assert_eq!(
        again.outcome,
        InboundOutcome::NothingPending {
            action: ConfirmAction::Confirmed
        }
    );

    let claimed = h
        .inbound
        .handle(ContactType::WechatOfficial, "wx-a", "领取")
        .await
        .unwrap();
    assert!(matches!(
        claimed.outcome,
        InboundOutcome::Applied { action: ConfirmAction::Claimed, .. }
    ));
}
