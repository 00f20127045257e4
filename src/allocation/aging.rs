// src/allocation/aging.rs
//! Aging / timeout monitor
//!
//! Classifies how long a flight has been waiting for its current stage:
//! past the critical threshold the flight earns a one-time priority boost,
//! past the crash threshold it fails permanently. The check itself is pure;
//! the allocator applies the effects. Idempotence over a wait period comes
//! from the caller passing back the already-critical flag, so repeated calls
//! cannot double-boost.

use std::time::Duration;

/// Outcome of a wait-state check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitState {
    /// Within tolerable bounds
    Ok,
    /// Crossed the critical threshold for the first time this wait period
    Critical,
    /// Crossed the hard deadline; the flight is lost
    Crashed,
}

/// Wait-time classifier with fixed thresholds
#[derive(Debug, Clone, Copy)]
pub struct WaitMonitor {
    critical_after: Duration,
    crash_after: Duration,
}

impl WaitMonitor {
    pub fn new(critical_after: Duration, crash_after: Duration) -> Self {
        Self {
            critical_after,
            crash_after,
        }
    }

    /// Classify a wait. `already_critical` suppresses repeat critical reports
    /// within the same wait period.
    pub fn check(&self, waited: Duration, already_critical: bool) -> WaitState {
        if waited >= self.crash_after {
            WaitState::Crashed
        } else if waited >= self.critical_after && !already_critical {
            WaitState::Critical
        } else {
            WaitState::Ok
        }
    }
}

impl Default for WaitMonitor {
    fn default() -> Self {
        Self {
            critical_after: Duration::from_secs(60),
            crash_after: Duration::from_secs(90),
        }
    }
}
