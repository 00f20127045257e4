// src/utils/config.rs
//! Engine configuration
//!
//! Layered configuration: serde defaults, then an optional `airside` config
//! file in the working directory, then `AIRSIDE__`-prefixed environment
//! variables (e.g. `AIRSIDE__RESOURCES__RUNWAYS=1`).

use crate::utils::errors::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Airport resource counts
    pub resources: ResourceConfig,

    /// Allocator behavior (attempts, aging, deadlines)
    pub allocation: AllocationConfig,

    /// Simulation window and stage occupancy durations
    pub timing: TimingConfig,

    /// Arrival generation
    pub arrivals: ArrivalConfig,
}

/// Fixed resource counts for the simulated airport
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Number of runways (exclusive units)
    pub runways: usize,

    /// Number of gates (exclusive units)
    pub gates: usize,

    /// Concurrent tower clearances (counting resource)
    pub tower_capacity: u32,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            runways: 3,
            gates: 5,
            tower_capacity: 2,
        }
    }
}

/// Allocator tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    /// Allocation attempts before a flight abandons (go-around)
    pub max_attempts: u32,

    /// Bounded wait between allocation attempts, in milliseconds
    pub retry_wait_ms: u64,

    /// Priority increment applied on every failed attempt
    pub aging_step: u32,

    /// One-time priority boost when a flight enters the critical wait state
    pub critical_boost: u32,

    /// Seconds of waiting before a flight is flagged critical
    pub critical_after_secs: u64,

    /// Seconds of waiting before a flight crashes
    pub crash_after_secs: u64,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            retry_wait_ms: 2_000,
            aging_step: 1,
            critical_boost: 5,
            critical_after_secs: 60,
            crash_after_secs: 90,
        }
    }
}

/// Simulation window and stage durations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Length of the arrival window, in seconds
    pub simulation_secs: u64,

    /// Grace period after the window for in-flight pipelines to finish
    pub drain_secs: u64,

    /// Interval between interim reports, in seconds
    pub report_interval_secs: u64,

    /// Runway occupancy while landing, in milliseconds
    pub landing_ms: u64,

    /// Gate occupancy while deplaning, in milliseconds
    pub deplaning_ms: u64,

    /// Extra gate time after the tower is released post-deplaning
    pub gate_turnaround_ms: u64,

    /// Runway occupancy while taking off, in milliseconds
    pub takeoff_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            simulation_secs: 300,
            drain_secs: 30,
            report_interval_secs: 10,
            landing_ms: 2_000,
            deplaning_ms: 3_000,
            gate_turnaround_ms: 1_000,
            takeoff_ms: 2_000,
        }
    }
}

impl TimingConfig {
    /// Runway occupancy while landing
    pub fn landing(&self) -> Duration {
        Duration::from_millis(self.landing_ms)
    }

    /// Gate occupancy while deplaning
    pub fn deplaning(&self) -> Duration {
        Duration::from_millis(self.deplaning_ms)
    }

    /// Gate time between deplaning and the takeoff request
    pub fn gate_turnaround(&self) -> Duration {
        Duration::from_millis(self.gate_turnaround_ms)
    }

    /// Runway occupancy while taking off
    pub fn takeoff(&self) -> Duration {
        Duration::from_millis(self.takeoff_ms)
    }

    /// Interval between interim reports
    pub fn report_interval(&self) -> Duration {
        Duration::from_secs(self.report_interval_secs)
    }
}

/// Arrival generation tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrivalConfig {
    /// Minimum interval between arrivals, in milliseconds
    pub min_interval_ms: u64,

    /// Maximum interval between arrivals, in milliseconds
    pub max_interval_ms: u64,

    /// Probability that a new flight is international (0.0–1.0)
    pub international_ratio: f64,
}

impl Default for ArrivalConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: 1_000,
            max_interval_ms: 5_000,
            international_ratio: 0.5,
        }
    }
}

impl EngineConfig {
    /// Load configuration from defaults, optional file, and environment
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("airside").required(false))
            .add_source(
                config::Environment::with_prefix("AIRSIDE")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let cfg: EngineConfig = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate resource counts and thresholds
    pub fn validate(&self) -> Result<()> {
        if self.resources.runways == 0 {
            return Err(EngineError::InvalidConfig(
                "runway count cannot be 0".into(),
            ));
        }
        if self.resources.gates == 0 {
            return Err(EngineError::InvalidConfig("gate count cannot be 0".into()));
        }
        if self.resources.tower_capacity == 0 {
            return Err(EngineError::InvalidConfig(
                "tower capacity cannot be 0".into(),
            ));
        }
        if self.allocation.max_attempts == 0 {
            return Err(EngineError::InvalidConfig(
                "max_attempts cannot be 0".into(),
            ));
        }
        if self.allocation.critical_after_secs >= self.allocation.crash_after_secs {
            return Err(EngineError::InvalidConfig(format!(
                "critical threshold ({}s) must be below crash threshold ({}s)",
                self.allocation.critical_after_secs, self.allocation.crash_after_secs
            )));
        }
        if self.arrivals.min_interval_ms > self.arrivals.max_interval_ms {
            return Err(EngineError::InvalidConfig(
                "arrival min_interval_ms exceeds max_interval_ms".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.arrivals.international_ratio) {
            return Err(EngineError::InvalidConfig(
                "international_ratio must be within 0.0..=1.0".into(),
            ));
        }
        Ok(())
    }

    /// Bounded wait between allocation attempts
    pub fn retry_wait(&self) -> Duration {
        Duration::from_millis(self.allocation.retry_wait_ms)
    }

    /// Wait before the critical flag is raised
    pub fn critical_after(&self) -> Duration {
        Duration::from_secs(self.allocation.critical_after_secs)
    }

    /// Wait before a flight crashes
    pub fn crash_after(&self) -> Duration {
        Duration::from_secs(self.allocation.crash_after_secs)
    }

    /// Length of the arrival window
    pub fn simulation_window(&self) -> Duration {
        Duration::from_secs(self.timing.simulation_secs)
    }

    /// Drain period after the arrival window closes
    pub fn drain_period(&self) -> Duration {
        Duration::from_secs(self.timing.drain_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.resources.runways, 3);
        assert_eq!(cfg.resources.gates, 5);
        assert_eq!(cfg.resources.tower_capacity, 2);
        assert_eq!(cfg.allocation.max_attempts, 10);
        assert_eq!(cfg.allocation.critical_boost, 5);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_zero_runways_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.resources.runways = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.allocation.critical_after_secs = 90;
        cfg.allocation.crash_after_secs = 60;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_bad_arrival_range_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.arrivals.min_interval_ms = 10_000;
        cfg.arrivals.max_interval_ms = 1_000;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_duration_helpers() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.retry_wait(), Duration::from_millis(2_000));
        assert_eq!(cfg.crash_after(), Duration::from_secs(90));
    }
}
