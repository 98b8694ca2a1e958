// SPDX-License-Identifier: MIT

//! Collaborator contracts for the scheduler
//!
//! The scheduler orchestrates *when and via which backend* the task runs;
//! everything it runs against lives behind these traits. None of the
//! durable-backend operations may error across the boundary: a `false`
//! return is the failure signal and the caller falls back to the fast
//! timer within the same call.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rearm_core::TaskError;
use std::time::Duration;

/// OS-level job scheduling facility that can fire even after process death
#[async_trait]
pub trait DurableBackend: Send + Sync + 'static {
    /// Enqueue a job to fire after `delay`; false on any failure to enqueue
    async fn schedule_at(&self, delay: Duration) -> bool;

    /// Enqueue a job to fire at an exact wall-clock time
    async fn schedule_exact_at(&self, at: DateTime<Utc>) -> bool;

    /// Drop every pending job owned by this scheduler
    async fn cancel_all(&self);

    /// Cheap, side-effect-free, non-blocking capability probe
    fn is_available(&self) -> bool;
}

/// Source of an exclusive wake-preventing resource
///
/// The guard is scoped: releasing happens on drop, so it cannot leak past
/// an invocation regardless of how the invocation exits.
#[async_trait]
pub trait WakeSource: Send + Sync + 'static {
    type Guard: Send;

    /// Acquire the guard, holding it for at most `timeout`
    ///
    /// `None` means the guard could not be obtained; execution proceeds
    /// unguarded rather than skipping the task.
    async fn acquire(&self, timeout: Duration) -> Option<Self::Guard>;
}

/// The opaque business task this scheduler keeps alive
///
/// Implementations must tolerate being invoked more than once in quick
/// succession: a durable fire may race a fast-timer fire.
#[async_trait]
pub trait TaskRunner: Send + Sync + 'static {
    async fn run(&self) -> Result<(), TaskError>;
}

/// Live check-interval configuration
pub trait IntervalSource: Send + Sync + 'static {
    /// Current interval between recurring runs, read fresh on every
    /// re-arm; `None` when configuration is unavailable
    fn check_interval(&self) -> Option<Duration>;
}
