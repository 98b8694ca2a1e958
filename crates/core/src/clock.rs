// SPDX-License-Identifier: MIT

//! Clock abstraction for testable time handling

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// A clock that provides the current monotonic time
pub trait Clock: Clone + Send + Sync {
    fn now(&self) -> Instant;
}

/// Real system clock
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Fake clock for testing with controllable time
#[derive(Clone)]
pub struct FakeClock {
    current: Arc<Mutex<Instant>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            current: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Advance the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current += duration;
    }

    /// Advance the clock by a number of milliseconds
    ///
    /// Scheduling requests are expressed in milliseconds, so tests mostly
    /// step time at that granularity.
    pub fn advance_millis(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Delay from `now` until a wall-clock target, or `None` if the target has
/// already passed.
///
/// Wakeup and exact-time scheduling take wall-clock targets; a target in
/// the past means the window was missed and arming would be wrong.
pub fn delay_until(target: DateTime<Utc>, now: DateTime<Utc>) -> Option<Duration> {
    (target - now).to_std().ok().filter(|d| !d.is_zero())
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
