// SPDX-License-Identifier: MIT

//! Task kinds dispatched by the scheduler
//!
//! A task kind determines what happens after an invocation completes:
//! `Periodic` and `Delayed` re-arm the next occurrence, `Wakeup` and
//! `Manual` are single-shot.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a scheduled invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Recurring task; re-arms the next occurrence on completion
    Periodic,
    /// Delayed one-off that resumes the recurring chain on completion
    Delayed,
    /// Fires once at a wall-clock target; does not re-arm
    Wakeup,
    /// User-triggered immediate run; does not re-arm
    Manual,
}

impl TaskKind {
    /// Whether completing an invocation of this kind arms the next one
    pub fn reschedules_on_completion(&self) -> bool {
        match self {
            TaskKind::Periodic | TaskKind::Delayed => true,
            TaskKind::Wakeup | TaskKind::Manual => false,
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Periodic => write!(f, "periodic"),
            TaskKind::Delayed => write!(f, "delayed"),
            TaskKind::Wakeup => write!(f, "wakeup"),
            TaskKind::Manual => write!(f, "manual"),
        }
    }
}

impl std::str::FromStr for TaskKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "periodic" => Ok(TaskKind::Periodic),
            "delayed" => Ok(TaskKind::Delayed),
            "wakeup" => Ok(TaskKind::Wakeup),
            "manual" => Ok(TaskKind::Manual),
            _ => Err(format!("unknown task kind: {}", s)),
        }
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
