// SPDX-License-Identifier: MIT

//! Pure re-arm planning
//!
//! After an invocation completes, the dispatcher must decide whether to arm
//! the next primary occurrence and whether to arm the anti-freeze backup.
//! That decision is pure; executing it against the backends is the engine's
//! job.

use crate::strategy::Strategy;
use crate::task::TaskKind;
use std::time::Duration;

/// What to arm after an invocation completes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RearmPlan {
    /// Delay for the next primary occurrence, if any
    pub next: Option<Duration>,
    /// Delay for the redundant backup occurrence, if any
    pub backup: Option<Duration>,
}

impl RearmPlan {
    pub fn is_empty(&self) -> bool {
        self.next.is_none() && self.backup.is_none()
    }
}

/// Plan the re-arm for a completed invocation (pure function)
///
/// Single-shot kinds never re-arm. The backup is only armed under the
/// `Hybrid` strategy; it fires at `interval * backup_multiplier` so that a
/// primary chain that silently died gets resurrected one cycle later.
/// `interval` is `None` when the check interval could not be read, which
/// drops the whole plan.
pub fn plan_rearm(
    kind: TaskKind,
    strategy: Strategy,
    interval: Option<Duration>,
    backup_multiplier: u32,
) -> RearmPlan {
    if !kind.reschedules_on_completion() {
        return RearmPlan::default();
    }
    let Some(interval) = interval else {
        return RearmPlan::default();
    };

    let backup = if strategy == Strategy::Hybrid {
        Some(interval * backup_multiplier)
    } else {
        None
    };

    RearmPlan {
        next: Some(interval),
        backup,
    }
}

#[cfg(test)]
#[path = "rearm_tests.rs"]
mod tests;
