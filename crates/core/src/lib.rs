// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rearm-core: pure scheduling logic for the rearm hybrid scheduler
//!
//! This crate provides:
//! - Task kinds and scheduling strategies
//! - The pure backend-selection function
//! - The fast-timer registry (armed entries keyed by monotonic id)
//! - Pure re-arm planning for the dispatcher
//! - Configuration and status snapshots
//!
//! Nothing here performs I/O or holds an async runtime; the `rearm-engine`
//! crate executes these decisions against real collaborators.

pub mod clock;
pub mod config;
pub mod error;
pub mod rearm;
pub mod status;
pub mod strategy;
pub mod task;
pub mod timer;

pub use clock::{delay_until, Clock, FakeClock, SystemClock};
pub use config::{ConfigError, SchedulerConfig};
pub use error::TaskError;
pub use rearm::{plan_rearm, RearmPlan};
pub use status::StatusSnapshot;
pub use strategy::{select_backend, Backend, SelectorTuning, Strategy};
pub use task::TaskKind;
pub use timer::{ScheduledEntry, TimerId, TimerRegistry};
