// SPDX-License-Identifier: MIT

//! Fast-timer registry
//!
//! Tracks armed in-process timer entries keyed by a monotonic numeric id.
//! An id present in the registry has not fired and has not been cancelled;
//! `poll` removes due entries before handing them back, so a callback that
//! re-arms itself never self-cancels.

use crate::clock::Clock;
use crate::task::TaskKind;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

/// Unique identifier for an armed fast-timer entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u32);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An armed fast-timer entry
#[derive(Debug, Clone)]
pub struct ScheduledEntry {
    pub id: TimerId,
    pub kind: TaskKind,
    pub fire_at: Instant,
    /// Marks the anti-freeze backup; a fire means the primary chain may
    /// have died and this entry is resurrecting it
    pub backup: bool,
}

/// Registry of armed fast-timer entries
///
/// Ids are assigned from a shared monotonic counter and never reused while
/// live. The registry is insertion-order agnostic; firing order comes from
/// `fire_at` at poll time.
#[derive(Debug)]
pub struct TimerRegistry {
    entries: HashMap<TimerId, ScheduledEntry>,
    counter: AtomicU32,
}

impl Default for TimerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            counter: AtomicU32::new(1000),
        }
    }

    /// Arm an entry to fire after `delay`, returning its id
    pub fn arm(&mut self, kind: TaskKind, delay: Duration, clock: &impl Clock) -> TimerId {
        self.insert(kind, delay, false, clock)
    }

    /// Arm an anti-freeze backup entry to fire after `delay`
    pub fn arm_backup(&mut self, kind: TaskKind, delay: Duration, clock: &impl Clock) -> TimerId {
        self.insert(kind, delay, true, clock)
    }

    fn insert(
        &mut self,
        kind: TaskKind,
        delay: Duration,
        backup: bool,
        clock: &impl Clock,
    ) -> TimerId {
        let id = TimerId(self.counter.fetch_add(1, Ordering::Relaxed) + 1);
        let entry = ScheduledEntry {
            id,
            kind,
            fire_at: clock.now() + delay,
            backup,
        };
        self.entries.insert(id, entry);
        id
    }

    /// Cancel a single armed entry; returns false if the id is not live
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Cancel every armed entry, returning how many were dropped
    ///
    /// Safe to call with zero pending entries.
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        if dropped > 0 {
            tracing::debug!(dropped, "cancelled all fast-timer entries");
        }
        dropped
    }

    /// Remove and return all entries due at or before `now`, earliest first
    ///
    /// Entries with equal deadlines come back in id order, which matches
    /// arming order because ids are monotonic.
    pub fn poll(&mut self, now: Instant) -> Vec<ScheduledEntry> {
        let due: Vec<TimerId> = self
            .entries
            .values()
            .filter(|e| e.fire_at <= now)
            .map(|e| e.id)
            .collect();

        let mut fired: Vec<ScheduledEntry> = due
            .into_iter()
            .filter_map(|id| self.entries.remove(&id))
            .collect();
        fired.sort_by_key(|e| (e.fire_at, e.id));
        fired
    }

    /// The earliest deadline among armed entries
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.values().map(|e| e.fire_at).min()
    }

    /// Look up a live entry
    pub fn get(&self, id: TimerId) -> Option<&ScheduledEntry> {
        self.entries.get(&id)
    }

    /// Number of armed entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
