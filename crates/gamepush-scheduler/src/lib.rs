// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cron-driven background jobs.
//!
//! Jobs are registered with a [`JobScheduler`] by the composition root. Each
//! registered job gets its own loop and its own lock, so a job never overlaps
//! with itself while distinct jobs run independently.

pub mod job;
pub mod scheduler;

pub use job::{DispatchJob, Job, JobId, RefreshJob, RetryJob};
pub use scheduler::{JobScheduler, JobStatus, TriggerOutcome};
