// SPDX-License-Identifier: MIT

//! Error types shared across the scheduler

use thiserror::Error;

/// Failure reported by the business task
///
/// Task failures are recorded and logged by the dispatcher; they never
/// propagate to a caller and never prevent re-arming or guard release.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("task failed: {0}")]
    Failed(String),
    #[error("task exceeded its deadline")]
    TimedOut,
}
