// SPDX-License-Identifier: MIT

//! Scheduler facade and cooperative dispatch loop
//!
//! `HybridScheduler` owns the process-wide scheduling state: current
//! strategy, the fast-timer registry, and the initialization flag. Every
//! public entry point degrades on failure instead of returning an error;
//! the only caller-visible signal is which backend ended up armed.

use crate::dispatch::InvocationReport;
use crate::traits::{DurableBackend, IntervalSource, TaskRunner, WakeSource};
use chrono::{DateTime, Utc};
use rearm_core::{
    select_backend, Backend, Clock, SchedulerConfig, StatusSnapshot, Strategy, SystemClock,
    TaskKind, TimerId, TimerRegistry,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{Notify, Semaphore};

pub(crate) struct SchedulerInner<D, W, T, I, C> {
    pub(crate) durable: D,
    pub(crate) wake: W,
    pub(crate) task: T,
    pub(crate) intervals: I,
    pub(crate) clock: C,
    pub(crate) config: SchedulerConfig,
    pub(crate) registry: Mutex<TimerRegistry>,
    strategy: Mutex<Strategy>,
    initialized: AtomicBool,
    /// Wakes the dispatch loop when the earliest deadline may have changed
    pub(crate) rearmed: Notify,
    manual_slots: Arc<Semaphore>,
}

/// Process-wide hybrid scheduler
///
/// Cheap to clone; clones share one underlying state.
pub struct HybridScheduler<D, W, T, I, C: Clock = SystemClock> {
    inner: Arc<SchedulerInner<D, W, T, I, C>>,
}

impl<D, W, T, I, C: Clock> Clone for HybridScheduler<D, W, T, I, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D, W, T, I> HybridScheduler<D, W, T, I, SystemClock>
where
    D: DurableBackend,
    W: WakeSource,
    T: TaskRunner,
    I: IntervalSource,
{
    pub fn new(durable: D, wake: W, task: T, intervals: I, config: SchedulerConfig) -> Self {
        Self::with_clock(durable, wake, task, intervals, config, SystemClock)
    }
}

impl<D, W, T, I, C> HybridScheduler<D, W, T, I, C>
where
    D: DurableBackend,
    W: WakeSource,
    T: TaskRunner,
    I: IntervalSource,
    C: Clock + 'static,
{
    pub fn with_clock(
        durable: D,
        wake: W,
        task: T,
        intervals: I,
        config: SchedulerConfig,
        clock: C,
    ) -> Self {
        let manual_slots = Arc::new(Semaphore::new(config.manual_workers.max(1)));
        Self {
            inner: Arc::new(SchedulerInner {
                durable,
                wake,
                task,
                intervals,
                clock,
                config,
                registry: Mutex::new(TimerRegistry::new()),
                strategy: Mutex::new(Strategy::default()),
                initialized: AtomicBool::new(false),
                rearmed: Notify::new(),
                manual_slots,
            }),
        }
    }

    /// Schedule a delayed occurrence of the recurring task
    pub async fn schedule_delayed(&self, delay: Duration) -> Backend {
        self.inner.ensure_initialized();
        self.inner.schedule_with_kind(TaskKind::Delayed, delay).await
    }

    /// Schedule an occurrence at an exact wall-clock time
    ///
    /// Exactness requires the durable backend, so it is tried first
    /// regardless of strategy; the fallback is a fast-timer entry armed
    /// for `delay`.
    pub async fn schedule_exact(&self, delay: Duration, at: DateTime<Utc>) -> Backend {
        self.inner.ensure_initialized();

        if self.inner.durable.schedule_exact_at(at).await {
            tracing::info!(at = %at, "exact occurrence armed on durable backend");
            return Backend::Durable;
        }

        let id = self.inner.arm_fast(TaskKind::Periodic, delay);
        tracing::warn!(
            %id,
            delay = %humantime::format_duration(delay),
            "durable exact scheduling failed, armed fast timer"
        );
        Backend::FastTimer
    }

    /// Schedule a single-shot wakeup at a wall-clock target
    ///
    /// Returns `None` without arming anything when the target has already
    /// passed; callers wanting an immediate run use
    /// [`execute_delayed_now`](Self::execute_delayed_now).
    pub async fn schedule_wakeup(&self, trigger_at: DateTime<Utc>, label: &str) -> Option<Backend> {
        self.inner.ensure_initialized();

        let Some(delay) = rearm_core::delay_until(trigger_at, Utc::now()) else {
            tracing::info!(label, trigger_at = %trigger_at, "wakeup window already passed, skipping");
            return None;
        };

        tracing::info!(
            label,
            delay = %humantime::format_duration(delay),
            "scheduling wakeup"
        );
        Some(self.inner.schedule_with_kind(TaskKind::Wakeup, delay).await)
    }

    /// Run a manual invocation immediately; never re-arms
    pub fn execute_manual_now(&self) {
        self.inner.ensure_initialized();
        self.spawn_immediate(TaskKind::Manual);
    }

    /// Run a delayed invocation immediately, resuming the recurring chain
    ///
    /// Used when an exact-time target has already elapsed by the time the
    /// process resumes.
    pub fn execute_delayed_now(&self) {
        self.inner.ensure_initialized();
        self.spawn_immediate(TaskKind::Delayed);
    }

    /// Cancel every armed entry on both backends; idempotent
    pub async fn cancel_all(&self) {
        let dropped = self
            .inner
            .registry
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .cancel_all();
        self.inner.durable.cancel_all().await;
        self.inner.rearmed.notify_one();
        tracing::info!(dropped, "cancelled all scheduled occurrences");
    }

    /// Change the backend-selection strategy
    ///
    /// Takes effect on the next scheduling decision; already-armed
    /// occurrences are untouched.
    pub fn set_strategy(&self, strategy: Strategy) {
        *self
            .inner
            .strategy
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = strategy;
        tracing::info!(%strategy, "strategy changed");
    }

    pub fn strategy(&self) -> Strategy {
        self.inner.strategy()
    }

    /// Read-only snapshot of scheduler state
    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            initialized: self.inner.initialized.load(Ordering::SeqCst),
            strategy: self.inner.strategy(),
            active_fast_timers: self
                .inner
                .registry
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .len(),
            durable_available: self.inner.durable.is_available(),
        }
    }

    /// Log the current status snapshot
    pub fn log_status(&self) {
        let snapshot = self.status();
        let rendered = serde_json::to_string(&snapshot)
            .unwrap_or_else(|_| "<unserializable>".to_string());
        tracing::info!(status = %rendered, "scheduler status");
    }

    /// Cooperative dispatch loop for fast-timer entries
    ///
    /// Fires due entries sequentially on the calling task; they never
    /// overlap each other. Runs until the owning future is dropped.
    pub async fn run(&self) {
        loop {
            let deadline = self
                .inner
                .registry
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .next_deadline();

            match deadline {
                None => self.inner.rearmed.notified().await,
                Some(at) => {
                    let now = self.inner.clock.now();
                    if at > now {
                        tokio::select! {
                            _ = tokio::time::sleep(at - now) => {}
                            // A new entry may have an earlier deadline;
                            // recompute before sleeping again.
                            _ = self.inner.rearmed.notified() => continue,
                        }
                    }

                    let due = self
                        .inner
                        .registry
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .poll(self.inner.clock.now());
                    for entry in due {
                        self.inner
                            .run_invocation(entry.kind, entry.id, entry.backup)
                            .await;
                    }
                }
            }
        }
    }

    /// Run one invocation directly, bypassing the timers
    ///
    /// Durable-backend fires re-enter the scheduler through this method.
    pub async fn run_invocation(&self, kind: TaskKind, id: TimerId) -> InvocationReport {
        self.inner.ensure_initialized();
        self.inner.run_invocation(kind, id, false).await
    }

    fn spawn_immediate(&self, kind: TaskKind) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            // Bounded concurrency; a burst of triggers queues behind the
            // slots instead of being dropped.
            let Ok(_permit) = Arc::clone(&inner.manual_slots).acquire_owned().await else {
                return;
            };
            inner.run_invocation(kind, TimerId(0), false).await;
        });
    }
}

impl<D, W, T, I, C> SchedulerInner<D, W, T, I, C>
where
    D: DurableBackend,
    W: WakeSource,
    T: TaskRunner,
    I: IntervalSource,
    C: Clock,
{
    pub(crate) fn strategy(&self) -> Strategy {
        *self.strategy.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// First-use initialization: probe the durable backend and log
    ///
    /// Idempotent; a failed or absent durable backend is non-fatal, the
    /// selector routes around it for as long as the probe stays false.
    pub(crate) fn ensure_initialized(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return;
        }
        let durable_available = self.durable.is_available();
        tracing::info!(
            strategy = %self.strategy(),
            durable_available,
            "hybrid scheduler initialized"
        );
    }

    /// Route one scheduling request through the selector and arm it
    pub(crate) async fn schedule_with_kind(&self, kind: TaskKind, delay: Duration) -> Backend {
        let strategy = self.strategy();
        let active = self
            .registry
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len();
        let durable_available = self.durable.is_available();
        let picked = select_backend(
            strategy,
            delay,
            active,
            durable_available,
            &self.config.tuning,
        );

        if picked == Backend::Durable {
            if self.durable.schedule_at(delay).await {
                tracing::info!(
                    %kind,
                    delay = %humantime::format_duration(delay),
                    "armed on durable backend"
                );
                return Backend::Durable;
            }
            tracing::warn!(%kind, "durable scheduling failed, falling back to fast timer");
        }

        let id = self.arm_fast(kind, delay);
        tracing::info!(
            %kind,
            %id,
            delay = %humantime::format_duration(delay),
            "armed on fast timer"
        );
        Backend::FastTimer
    }

    /// Arm a fast-timer entry and wake the dispatch loop
    pub(crate) fn arm_fast(&self, kind: TaskKind, delay: Duration) -> TimerId {
        let id = self
            .registry
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .arm(kind, delay, &self.clock);
        self.rearmed.notify_one();
        id
    }

    /// Arm a fast-timer backup entry and wake the dispatch loop
    pub(crate) fn arm_fast_backup(&self, kind: TaskKind, delay: Duration) -> TimerId {
        let id = self
            .registry
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .arm_backup(kind, delay, &self.clock);
        self.rearmed.notify_one();
        id
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
