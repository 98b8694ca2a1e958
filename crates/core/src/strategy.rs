// SPDX-License-Identifier: MIT

//! Backend selection strategy
//!
//! `select_backend` is the single decision point for routing a scheduling
//! request to the fast in-process timer or the durable OS-level backend.
//! It is pure and total over its inputs so every branch and boundary can
//! be unit tested directly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Policy governing backend selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Always use the fast timer; accurate while the process lives
    HandlerOnly,
    /// Prefer the durable backend whenever it is available
    DurableOnly,
    /// Short delays on the fast timer, long delays on the durable backend,
    /// load-based tie-break in between
    #[default]
    Hybrid,
    /// Delay- and load-driven selection without the mid-band tie-break
    Auto,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::HandlerOnly => write!(f, "handler-only"),
            Strategy::DurableOnly => write!(f, "durable-only"),
            Strategy::Hybrid => write!(f, "hybrid"),
            Strategy::Auto => write!(f, "auto"),
        }
    }
}

/// The scheduling backend a request is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// In-process timer registry; fast, dies with the process
    FastTimer,
    /// OS-level job scheduling; survives process death
    Durable,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::FastTimer => write!(f, "fast-timer"),
            Backend::Durable => write!(f, "durable"),
        }
    }
}

/// Thresholds steering the selection bands
///
/// These are tuning choices, not correctness requirements; the defaults
/// are the values the scheduler has been run with in production.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorTuning {
    /// Hybrid: delays below this always take the fast timer
    #[serde(with = "humantime_serde")]
    pub fast_band_max: Duration,
    /// Hybrid: delays above this always take the durable backend
    #[serde(with = "humantime_serde")]
    pub durable_band_min: Duration,
    /// Hybrid: in the middle band, go durable once more than this many
    /// fast timers are armed
    pub hybrid_load_threshold: usize,
    /// Auto: delays above this always take the durable backend
    #[serde(with = "humantime_serde")]
    pub auto_durable_min: Duration,
    /// Auto: delays above this take the durable backend under load
    #[serde(with = "humantime_serde")]
    pub auto_load_band_min: Duration,
    /// Auto: load level that pushes mid-band delays durable
    pub auto_load_threshold: usize,
}

impl Default for SelectorTuning {
    fn default() -> Self {
        Self {
            fast_band_max: Duration::from_secs(30),
            durable_band_min: Duration::from_secs(300),
            hybrid_load_threshold: 2,
            auto_durable_min: Duration::from_secs(120),
            auto_load_band_min: Duration::from_secs(30),
            auto_load_threshold: 3,
        }
    }
}

/// Choose the backend for a scheduling request (pure function)
///
/// `active_fast_timers` is the number of currently armed fast-timer
/// entries; it only influences the mid-band decisions.
pub fn select_backend(
    strategy: Strategy,
    delay: Duration,
    active_fast_timers: usize,
    durable_available: bool,
    tuning: &SelectorTuning,
) -> Backend {
    match strategy {
        Strategy::HandlerOnly => Backend::FastTimer,

        Strategy::DurableOnly => {
            if durable_available {
                Backend::Durable
            } else {
                Backend::FastTimer
            }
        }

        Strategy::Hybrid => {
            if !durable_available {
                return Backend::FastTimer;
            }
            // Short delays favor responsiveness, long delays favor
            // resilience against process freeze.
            if delay < tuning.fast_band_max {
                Backend::FastTimer
            } else if delay > tuning.durable_band_min {
                Backend::Durable
            } else if active_fast_timers > tuning.hybrid_load_threshold {
                Backend::Durable
            } else {
                Backend::FastTimer
            }
        }

        Strategy::Auto => {
            if !durable_available {
                return Backend::FastTimer;
            }
            let over_long = delay > tuning.auto_durable_min;
            let loaded_mid = delay > tuning.auto_load_band_min
                && active_fast_timers > tuning.auto_load_threshold;
            if over_long || loaded_mid {
                Backend::Durable
            } else {
                Backend::FastTimer
            }
        }
    }
}

#[cfg(test)]
#[path = "strategy_tests.rs"]
mod tests;
