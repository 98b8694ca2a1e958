// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rearm-engine: orchestration for the rearm hybrid scheduler
//!
//! Wires the pure decisions from `rearm-core` to real collaborators: the
//! durable OS-level backend, the wake-guard source, the business task, and
//! the check-interval configuration. The `HybridScheduler` facade owns the
//! process-wide state and the cooperative dispatch loop.

pub mod fake;
mod dispatch;
mod scheduler;
mod traits;

pub use dispatch::InvocationReport;
pub use scheduler::HybridScheduler;
pub use traits::{DurableBackend, IntervalSource, TaskRunner, WakeSource};
