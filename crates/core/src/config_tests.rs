// SPDX-License-Identifier: MIT

use super::*;
use std::time::Duration;

#[test]
fn defaults_carry_the_operational_constants() {
    let config = SchedulerConfig::default();

    assert_eq!(config.guard_timeout, Duration::from_secs(600));
    assert_eq!(config.backup_multiplier, 2);
    assert_eq!(config.manual_workers, 2);
    assert_eq!(config.tuning.fast_band_max, Duration::from_secs(30));
    assert_eq!(config.tuning.durable_band_min, Duration::from_secs(300));
    assert_eq!(config.tuning.hybrid_load_threshold, 2);
}

#[test]
fn parses_partial_toml_over_defaults() {
    let config = SchedulerConfig::from_toml(
        r#"
        guard_timeout = "5m"
        backup_multiplier = 3

        [tuning]
        fast_band_max = "10s"
        "#,
    )
    .unwrap();

    assert_eq!(config.guard_timeout, Duration::from_secs(300));
    assert_eq!(config.backup_multiplier, 3);
    assert_eq!(config.tuning.fast_band_max, Duration::from_secs(10));
    // Unspecified fields keep their defaults.
    assert_eq!(config.manual_workers, 2);
    assert_eq!(config.tuning.durable_band_min, Duration::from_secs(300));
}

#[test]
fn rejects_malformed_durations() {
    let result = SchedulerConfig::from_toml(r#"guard_timeout = "soon""#);
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}
