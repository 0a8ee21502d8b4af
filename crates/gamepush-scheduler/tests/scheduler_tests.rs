// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notify jobs driven through the scheduler.

use gamepush_config::model::ScheduleConfig;
use gamepush_core::{ContactType, PromotionWindow};
use gamepush_scheduler::{JobId, JobScheduler, TriggerOutcome};
use gamepush_test_utils::{TestHarness, game};
use tokio_util::sync::CancellationToken;

async fn scheduler_for(h: &TestHarness) -> JobScheduler {
    JobScheduler::new(8, CancellationToken::new())
        .unwrap()
        .with_notify_jobs(
            &ScheduleConfig::default(),
            h.refresher.clone(),
            h.dispatcher.clone(),
            h.retry.clone(),
        )
        .unwrap()
}

fn summary(outcome: TriggerOutcome) -> String {
    match outcome {
        TriggerOutcome::Completed { summary } => summary,
        TriggerOutcome::Busy => panic!("job unexpectedly busy"),
    }
}

#[tokio::test]
async fn registers_all_notify_jobs() {
    let h = TestHarness::builder().build().await.unwrap();
    let scheduler = scheduler_for(&h).await;
    assert_eq!(scheduler.job_ids(), JobId::ALL.to_vec());
    for id in JobId::ALL {
        assert!(scheduler.next_run(id).is_some(), "{id} has no next run");
    }
}

#[tokio::test]
async fn refresh_then_dispatch_then_retry() {
    let h = TestHarness::builder().build().await.unwrap();
    h.catalog
        .set(vec![game("g1", "Game One")], vec![game("g2", "Game Two")])
        .await;
    h.subscribe("a", ContactType::WechatOfficial, "wx-a").await.unwrap();
    h.subscribe("b", ContactType::Qq, "10002").await.unwrap();
    h.qq.fail_all("timeout").await;
    let scheduler = scheduler_for(&h).await;

    let refreshed = summary(scheduler.trigger(JobId::Refresh).await.unwrap());
    assert_eq!(refreshed, "current=1 upcoming=1");

    let current = summary(scheduler.trigger(JobId::DispatchCurrent).await.unwrap());
    assert_eq!(current, "attempted=2 succeeded=1");

    let next = summary(scheduler.trigger(JobId::DispatchNext).await.unwrap());
    assert_eq!(next, "attempted=2 succeeded=1");
    assert_eq!(h.cache.list(PromotionWindow::Next).await.unwrap().len(), 1);

    h.qq.succeed_all().await;
    let retried = summary(scheduler.trigger(JobId::Retry).await.unwrap());
    assert_eq!(retried, "attempted=2 recovered=2");
}
