// SPDX-License-Identifier: MIT

//! Invocation pipeline: guard, task run, re-arm, backup
//!
//! A single invocation holds a wake guard for its whole duration, runs
//! the opaque task, and for rescheduling kinds arms the next occurrence
//! plus the anti-freeze backup before the guard is released. Task errors
//! are recorded, never propagated; the chain survives a failing task.

use crate::scheduler::SchedulerInner;
use crate::traits::{DurableBackend, IntervalSource, TaskRunner, WakeSource};
use rearm_core::{plan_rearm, Backend, Clock, TaskError, TaskKind, TimerId};
use std::time::Duration;

/// Outcome of one invocation, for observability and tests
#[derive(Debug)]
pub struct InvocationReport {
    pub kind: TaskKind,
    pub id: TimerId,
    pub task: Result<(), TaskError>,
    /// Backend the next primary occurrence landed on, if one was armed
    pub next: Option<Backend>,
    /// Backend the anti-freeze backup landed on, if one was armed
    pub backup: Option<Backend>,
    /// Whether this invocation was a backup fire recovering the chain
    pub recovery: bool,
}

impl<D, W, T, I, C> SchedulerInner<D, W, T, I, C>
where
    D: DurableBackend,
    W: WakeSource,
    T: TaskRunner,
    I: IntervalSource,
    C: Clock,
{
    pub(crate) async fn run_invocation(
        &self,
        kind: TaskKind,
        id: TimerId,
        recovery: bool,
    ) -> InvocationReport {
        let started = self.clock.now();

        if recovery {
            // The primary re-arm for this cycle never fired; this run is
            // resurrecting a possibly-dead chain.
            tracing::warn!(%kind, %id, "backup fired, recovering possibly-dead chain");
        }

        let guard = self.wake.acquire(self.config.guard_timeout).await;
        if guard.is_none() {
            // Proceed unguarded rather than drop the occurrence; a missed
            // run would stall the chain until the backup fires.
            tracing::warn!(%kind, %id, "wake guard unavailable, running unguarded");
        }

        tracing::info!(%kind, %id, "task starting");
        let task = self.task.run().await;
        if let Err(err) = &task {
            tracing::error!(%kind, %id, error = %err, "task failed");
        }

        let (next, backup) = if kind.reschedules_on_completion() {
            self.rearm(kind).await
        } else {
            (None, None)
        };

        drop(guard);
        tracing::info!(
            %kind,
            %id,
            elapsed = %humantime::format_duration(elapsed_since(&self.clock, started)),
            "invocation finished"
        );

        InvocationReport {
            kind,
            id,
            task,
            next,
            backup,
            recovery,
        }
    }

    /// Arm the next primary occurrence and, under `Hybrid`, the backup
    ///
    /// The interval is read fresh on every re-arm so configuration changes
    /// take effect at the next cycle. No interval means the chain ends
    /// here deliberately.
    async fn rearm(&self, kind: TaskKind) -> (Option<Backend>, Option<Backend>) {
        let strategy = self.strategy();
        let interval = self.intervals.check_interval();
        let plan = plan_rearm(kind, strategy, interval, self.config.backup_multiplier);
        if plan.is_empty() {
            tracing::info!(%kind, "no interval configured, chain not re-armed");
            return (None, None);
        }

        let mut next = None;
        if let Some(delay) = plan.next {
            next = Some(self.schedule_with_kind(TaskKind::Delayed, delay).await);
        }

        let mut backup = None;
        if let Some(delay) = plan.backup {
            backup = Some(self.schedule_backup(delay).await);
        }

        (next, backup)
    }

    /// Arm the anti-freeze backup, preferring the durable backend
    ///
    /// Bypasses the selector: the backup exists to survive exactly the
    /// conditions that kill fast timers, so it only lands on one when the
    /// durable backend refuses.
    async fn schedule_backup(&self, delay: Duration) -> Backend {
        if self.durable.schedule_at(delay).await {
            tracing::info!(
                delay = %humantime::format_duration(delay),
                "backup armed on durable backend"
            );
            return Backend::Durable;
        }

        let id = self.arm_fast_backup(TaskKind::Delayed, delay);
        tracing::warn!(
            %id,
            delay = %humantime::format_duration(delay),
            "durable backup refused, armed fast-timer backup"
        );
        Backend::FastTimer
    }
}

fn elapsed_since<C: Clock>(clock: &C, started: std::time::Instant) -> Duration {
    clock.now().saturating_duration_since(started)
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
