// SPDX-License-Identifier: MIT

//! Read-only status snapshot of the scheduler

use crate::strategy::Strategy;
use serde::Serialize;

/// A point-in-time view of scheduler state, for logging and inspection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    /// Whether first-use initialization has completed
    pub initialized: bool,
    /// The strategy scheduling decisions are currently made under
    pub strategy: Strategy,
    /// Number of armed fast-timer entries
    pub active_fast_timers: usize,
    /// Whether the durable backend reports itself usable
    pub durable_available: bool,
}
