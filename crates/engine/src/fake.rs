// SPDX-License-Identifier: MIT

//! Fake collaborators for testing
//!
//! Record every call and expose knobs for availability and failure
//! injection. Clones share state so a test can keep a handle while the
//! scheduler owns another.

use crate::traits::{DurableBackend, IntervalSource, TaskRunner, WakeSource};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rearm_core::TaskError;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A call recorded by [`FakeDurable`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DurableCall {
    At(Duration),
    ExactAt(DateTime<Utc>),
}

#[derive(Default)]
struct DurableState {
    available: AtomicBool,
    accepting: AtomicBool,
    calls: Mutex<Vec<DurableCall>>,
    cancel_alls: AtomicUsize,
}

/// Recording fake for the durable backend
#[derive(Clone, Default)]
pub struct FakeDurable {
    state: Arc<DurableState>,
}

impl FakeDurable {
    /// An available backend that accepts every request
    pub fn available() -> Self {
        let fake = Self::default();
        fake.state.available.store(true, Ordering::SeqCst);
        fake.state.accepting.store(true, Ordering::SeqCst);
        fake
    }

    /// A backend whose capability probe reports unavailable
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// An available backend that rejects every enqueue
    pub fn rejecting() -> Self {
        let fake = Self::default();
        fake.state.available.store(true, Ordering::SeqCst);
        fake
    }

    pub fn set_available(&self, available: bool) {
        self.state.available.store(available, Ordering::SeqCst);
    }

    pub fn set_accepting(&self, accepting: bool) {
        self.state.accepting.store(accepting, Ordering::SeqCst);
    }

    /// Every schedule call recorded so far
    pub fn calls(&self) -> Vec<DurableCall> {
        self.state
            .calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn cancel_all_count(&self) -> usize {
        self.state.cancel_alls.load(Ordering::SeqCst)
    }

    fn record(&self, call: DurableCall) -> bool {
        let accepted = self.state.accepting.load(Ordering::SeqCst);
        if accepted {
            self.state
                .calls
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(call);
        }
        accepted
    }
}

#[async_trait]
impl DurableBackend for FakeDurable {
    async fn schedule_at(&self, delay: Duration) -> bool {
        self.record(DurableCall::At(delay))
    }

    async fn schedule_exact_at(&self, at: DateTime<Utc>) -> bool {
        self.record(DurableCall::ExactAt(at))
    }

    async fn cancel_all(&self) {
        self.state.cancel_alls.fetch_add(1, Ordering::SeqCst);
    }

    fn is_available(&self) -> bool {
        self.state.available.load(Ordering::SeqCst)
    }
}

/// Counting fake for the wake-guard source
#[derive(Clone, Default)]
pub struct FakeWake {
    acquired: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
    deny: Arc<AtomicBool>,
}

/// Guard handle that counts its own release on drop
pub struct FakeWakeGuard {
    released: Arc<AtomicUsize>,
}

impl Drop for FakeWakeGuard {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl FakeWake {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every acquisition fail
    pub fn deny(&self) {
        self.deny.store(true, Ordering::SeqCst);
    }

    pub fn acquired_count(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released_count(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WakeSource for FakeWake {
    type Guard = FakeWakeGuard;

    async fn acquire(&self, _timeout: Duration) -> Option<FakeWakeGuard> {
        if self.deny.load(Ordering::SeqCst) {
            return None;
        }
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Some(FakeWakeGuard {
            released: self.released.clone(),
        })
    }
}

/// Counting fake for the business task
#[derive(Clone, Default)]
pub struct FakeTask {
    runs: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
}

impl FakeTask {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every run return an error
    pub fn fail(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn run_count(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskRunner for FakeTask {
    async fn run(&self) -> Result<(), TaskError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            Err(TaskError::Failed("induced failure".to_string()))
        } else {
            Ok(())
        }
    }
}

/// Interval source backed by a settable value
#[derive(Clone)]
pub struct FixedInterval {
    interval: Arc<Mutex<Option<Duration>>>,
}

impl FixedInterval {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: Arc::new(Mutex::new(Some(interval))),
        }
    }

    /// A source with no interval to give (configuration unavailable)
    pub fn unavailable() -> Self {
        Self {
            interval: Arc::new(Mutex::new(None)),
        }
    }

    /// Change the interval a later re-arm will observe
    pub fn set(&self, interval: Duration) {
        *self.interval.lock().unwrap_or_else(|e| e.into_inner()) = Some(interval);
    }
}

impl IntervalSource for FixedInterval {
    fn check_interval(&self) -> Option<Duration> {
        *self.interval.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
