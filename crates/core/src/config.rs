// SPDX-License-Identifier: MIT

//! Scheduler configuration
//!
//! Operational constants for the dispatcher and facade. All values have
//! defaults suitable for a check interval in the minutes range; they can
//! be overridden from a TOML document.

use crate::strategy::SelectorTuning;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors loading a configuration document
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Configuration for the hybrid scheduler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Hard timeout on holding the wake guard around one invocation
    #[serde(with = "humantime_serde")]
    pub guard_timeout: Duration,
    /// Backup occurrences fire at check-interval times this factor
    pub backup_multiplier: u32,
    /// Bound on concurrently running manual/immediate invocations
    pub manual_workers: usize,
    /// Backend selection thresholds
    pub tuning: SelectorTuning,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            guard_timeout: Duration::from_secs(10 * 60),
            backup_multiplier: 2,
            manual_workers: 2,
            tuning: SelectorTuning::default(),
        }
    }
}

impl SchedulerConfig {
    /// Parse a configuration from a TOML document
    pub fn from_toml(doc: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(doc)?)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
