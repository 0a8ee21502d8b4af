// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cron scheduler with per-job non-overlap and cooperative shutdown.
//!
//! Each job owns a lock. A scheduled tick or a manual [`JobScheduler::trigger`]
//! takes it with `try_lock`; when the job is already running the new run is
//! skipped rather than queued. Jobs with different ids never wait on each
//! other, so refresh and dispatch must be scheduled far enough apart.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, FixedOffset, Utc};
use croner::Cron;
use gamepush_config::model::ScheduleConfig;
use gamepush_core::{GamepushError, PromotionWindow};
use gamepush_notify::{CatalogRefresher, NotificationDispatcher, RetryReconciler};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::job::{DispatchJob, Job, JobId, RefreshJob, RetryJob};

/// Result of a manual trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum TriggerOutcome {
    Completed { summary: String },
    /// Another run of the same job is in flight; nothing was started.
    Busy,
}

/// Snapshot of one registered job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobStatus {
    pub id: JobId,
    pub schedule: String,
    pub next_run: Option<String>,
    pub running: bool,
    pub last_run: Option<LastRun>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LastRun {
    pub finished_at: String,
    pub ok: bool,
    pub detail: String,
}

struct Entry {
    id: JobId,
    expr: String,
    cron: Cron,
    task: Arc<dyn Job>,
    lock: Mutex<()>,
    last: Mutex<Option<LastRun>>,
}

impl Entry {
    /// Run the task unless it is already running. `None` means skipped.
    async fn run_guarded(&self) -> Option<Result<String, GamepushError>> {
        let Ok(_guard) = self.lock.try_lock() else {
            return None;
        };
        info!(job = %self.id, "job started");
        let started = Instant::now();
        let result = self.task.run().await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let last = match &result {
            Ok(summary) => {
                info!(job = %self.id, elapsed_ms, summary = %summary, "job finished");
                LastRun {
                    finished_at: Utc::now().to_rfc3339(),
                    ok: true,
                    detail: summary.clone(),
                }
            }
            Err(e) => {
                error!(job = %self.id, elapsed_ms, error = %e, "job failed");
                LastRun {
                    finished_at: Utc::now().to_rfc3339(),
                    ok: false,
                    detail: e.to_string(),
                }
            }
        };
        *self.last.lock().await = Some(last);
        Some(result)
    }
}

/// Registry of cron jobs evaluated at a fixed UTC offset.
#[derive(Clone)]
pub struct JobScheduler {
    entries: BTreeMap<JobId, Arc<Entry>>,
    offset: FixedOffset,
    shutdown: CancellationToken,
}

impl JobScheduler {
    pub fn new(utc_offset_hours: i32, shutdown: CancellationToken) -> Result<Self, GamepushError> {
        let offset = FixedOffset::east_opt(utc_offset_hours * 3600).ok_or_else(|| {
            GamepushError::Config(format!("invalid UTC offset: {utc_offset_hours} hours"))
        })?;
        Ok(Self {
            entries: BTreeMap::new(),
            offset,
            shutdown,
        })
    }

    /// Register the four notify jobs with their configured cadence.
    pub fn with_notify_jobs(
        mut self,
        schedule: &ScheduleConfig,
        refresher: CatalogRefresher,
        dispatcher: NotificationDispatcher,
        retry: RetryReconciler,
    ) -> Result<Self, GamepushError> {
        self.register(JobId::Refresh, &schedule.refresh, Arc::new(RefreshJob(refresher)))?;
        self.register(
            JobId::DispatchCurrent,
            &schedule.dispatch_current,
            Arc::new(DispatchJob {
                dispatcher: dispatcher.clone(),
                window: PromotionWindow::Current,
            }),
        )?;
        self.register(
            JobId::DispatchNext,
            &schedule.dispatch_next,
            Arc::new(DispatchJob {
                dispatcher,
                window: PromotionWindow::Next,
            }),
        )?;
        self.register(JobId::Retry, &schedule.retry, Arc::new(RetryJob(retry)))?;
        Ok(self)
    }

    /// Register `task` under `id`, replacing any previous registration.
    pub fn register(
        &mut self,
        id: JobId,
        expr: &str,
        task: Arc<dyn Job>,
    ) -> Result<(), GamepushError> {
        let cron = expr.parse::<Cron>().map_err(|e| {
            GamepushError::Config(format!("job {id}: invalid cron expression `{expr}`: {e}"))
        })?;
        self.entries.insert(
            id,
            Arc::new(Entry {
                id,
                expr: expr.to_string(),
                cron,
                task,
                lock: Mutex::new(()),
                last: Mutex::new(None),
            }),
        );
        Ok(())
    }

    pub fn job_ids(&self) -> Vec<JobId> {
        self.entries.keys().copied().collect()
    }

    /// First fire time of `id` strictly after `after`.
    pub fn next_after(&self, id: JobId, after: DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
        let entry = self.entries.get(&id)?;
        entry
            .cron
            .find_next_occurrence(&after.with_timezone(&self.offset), false)
            .ok()
    }

    pub fn next_run(&self, id: JobId) -> Option<DateTime<FixedOffset>> {
        self.next_after(id, self.now())
    }

    /// Run a job immediately, unless it is already running.
    ///
    /// Job failures are returned as errors; a busy job is not an error.
    pub async fn trigger(&self, id: JobId) -> Result<TriggerOutcome, GamepushError> {
        let entry = self.entry(id)?;
        match entry.run_guarded().await {
            Some(result) => Ok(TriggerOutcome::Completed { summary: result? }),
            None => {
                warn!(job = %id, "manual trigger rejected, job already running");
                Ok(TriggerOutcome::Busy)
            }
        }
    }

    /// Run `work` while holding the lock of job `id`.
    ///
    /// Used by manual operations that touch the same state as a job, such as
    /// a single-pair push during a dispatch run. `Ok(None)` means the job was
    /// busy and `work` was dropped without being polled.
    pub async fn run_exclusive<F, T>(&self, id: JobId, work: F) -> Result<Option<T>, GamepushError>
    where
        F: Future<Output = T>,
    {
        let entry = self.entry(id)?;
        let Ok(_guard) = entry.lock.try_lock() else {
            warn!(job = %id, "manual operation rejected, job already running");
            return Ok(None);
        };
        Ok(Some(work.await))
    }

    fn entry(&self, id: JobId) -> Result<&Arc<Entry>, GamepushError> {
        self.entries.get(&id).ok_or_else(|| GamepushError::NotFound {
            entity: "job",
            id: id.to_string(),
        })
    }

    /// Status of every registered job, in id order.
    pub async fn status(&self) -> Vec<JobStatus> {
        let now = self.now();
        let mut out = Vec::with_capacity(self.entries.len());
        for entry in self.entries.values() {
            out.push(JobStatus {
                id: entry.id,
                schedule: entry.expr.clone(),
                next_run: self.next_after(entry.id, now).map(|t| t.to_rfc3339()),
                running: entry.lock.try_lock().is_err(),
                last_run: entry.last.lock().await.clone(),
            });
        }
        out
    }

    /// Spawn one loop per registered job. Loops exit when the shutdown
    /// token is cancelled; a run in progress finishes first.
    pub fn start(&self) -> Vec<JoinHandle<()>> {
        self.entries
            .values()
            .map(|entry| {
                let entry = Arc::clone(entry);
                let offset = self.offset;
                let shutdown = self.shutdown.clone();
                tokio::spawn(run_loop(entry, offset, shutdown))
            })
            .collect()
    }

    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }
}

async fn run_loop(entry: Arc<Entry>, offset: FixedOffset, shutdown: CancellationToken) {
    info!(job = %entry.id, schedule = %entry.expr, "job loop started");
    loop {
        let now = Utc::now().with_timezone(&offset);
        let next = match entry.cron.find_next_occurrence(&now, false) {
            Ok(next) => next,
            Err(e) => {
                error!(job = %entry.id, error = %e, "no next fire time, job loop stopping");
                return;
            }
        };
        let wait = (next - now).to_std().unwrap_or_default();
        debug!(job = %entry.id, next = %next, "waiting for next run");

        tokio::select! {
            _ = shutdown.cancelled() => {
                info!(job = %entry.id, "job loop stopping");
                return;
            }
            _ = tokio::time::sleep(wait) => {}
        }

        if entry.run_guarded().await.is_none() {
            info!(job = %entry.id, "previous run still in progress, skipped");
        }
    }
}
