// src/flight/model.rs
//! Flight state
//!
//! A [`Flight`] is mutated only by its own pipeline task (single-writer).
//! Everything other tasks need to see travels through [`FlightSnapshot`]
//! copies published to the registry at each transition.

use serde::Serialize;
use std::fmt;
use std::time::Instant;

/// Sequential flight identifier
pub type FlightId = u32;

/// Flight class; affects only the order in which a stage claims the tower
/// versus the stage-specific resource, never the allocation guarantees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightClass {
    Domestic,
    International,
}

impl fmt::Display for FlightClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlightClass::Domestic => write!(f, "DOM"),
            FlightClass::International => write!(f, "INT"),
        }
    }
}

/// Lifecycle state of one flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightState {
    Arrived,
    WaitingLand,
    Landing,
    WaitingDeplane,
    Deplaning,
    WaitingTakeoff,
    Takeoff,
    Completed,
    Crashed,
    GoAround,
}

impl FlightState {
    /// Terminal states end the pipeline
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FlightState::Completed | FlightState::Crashed | FlightState::GoAround
        )
    }

    /// Waiting states are where the aging clock runs
    pub fn is_waiting(&self) -> bool {
        matches!(
            self,
            FlightState::WaitingLand | FlightState::WaitingDeplane | FlightState::WaitingTakeoff
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FlightState::Arrived => "arrived",
            FlightState::WaitingLand => "waiting_land",
            FlightState::Landing => "landing",
            FlightState::WaitingDeplane => "waiting_deplane",
            FlightState::Deplaning => "deplaning",
            FlightState::WaitingTakeoff => "waiting_takeoff",
            FlightState::Takeoff => "takeoff",
            FlightState::Completed => "completed",
            FlightState::Crashed => "crashed",
            FlightState::GoAround => "go_around",
        }
    }
}

/// One simulated flight
#[derive(Debug)]
pub struct Flight {
    /// Identifier assigned by the arrival generator
    pub id: FlightId,

    /// Domestic or international
    pub class: FlightClass,

    /// Current lifecycle state
    pub state: FlightState,

    /// Held runway unit, if any
    pub runway: Option<usize>,

    /// Held gate unit, if any
    pub gate: Option<usize>,

    /// Stages completed so far (0–3)
    pub stages_completed: u8,

    /// Current priority; non-decreasing within a wait period
    pub priority: u32,

    /// Cumulative failed allocation attempts
    pub failed_attempts: u32,

    /// When the current wait period began
    pub wait_started: Instant,

    /// Whether the critical boost was applied this wait period
    pub critical: bool,
}

impl Flight {
    pub fn new(id: FlightId, class: FlightClass) -> Self {
        Self {
            id,
            class,
            state: FlightState::Arrived,
            runway: None,
            gate: None,
            stages_completed: 0,
            priority: 0,
            failed_attempts: 0,
            wait_started: Instant::now(),
            critical: false,
        }
    }

    /// Enter a waiting state: restart the aging clock and clear the
    /// once-per-wait-period critical flag
    pub fn begin_wait(&mut self, state: FlightState) {
        debug_assert!(state.is_waiting());
        self.state = state;
        self.wait_started = Instant::now();
        self.critical = false;
    }

    /// Read-only view for the registry and reports
    pub fn snapshot(&self) -> FlightSnapshot {
        FlightSnapshot {
            id: self.id,
            class: self.class,
            state: self.state,
            stages_completed: self.stages_completed,
            priority: self.priority,
            failed_attempts: self.failed_attempts,
        }
    }
}

/// Reporting view of one flight
#[derive(Debug, Clone, Serialize)]
pub struct FlightSnapshot {
    pub id: FlightId,
    pub class: FlightClass,
    pub state: FlightState,
    pub stages_completed: u8,
    pub priority: u32,
    pub failed_attempts: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_new_flight_defaults() {
        let flight = Flight::new(1, FlightClass::Domestic);
        assert_eq!(flight.state, FlightState::Arrived);
        assert_eq!(flight.stages_completed, 0);
        assert_eq!(flight.priority, 0);
        assert!(flight.runway.is_none());
        assert!(flight.gate.is_none());
    }

    #[test]
    fn test_begin_wait_resets_clock_and_flag() {
        let mut flight = Flight::new(1, FlightClass::International);
        flight.critical = true;
        std::thread::sleep(Duration::from_millis(5));

        flight.begin_wait(FlightState::WaitingDeplane);
        assert_eq!(flight.state, FlightState::WaitingDeplane);
        assert!(!flight.critical);
        assert!(flight.wait_started.elapsed() < Duration::from_millis(5));
    }

    #[test]
    fn test_terminal_and_waiting_classification() {
        assert!(FlightState::Completed.is_terminal());
        assert!(FlightState::Crashed.is_terminal());
        assert!(FlightState::GoAround.is_terminal());
        assert!(!FlightState::Landing.is_terminal());
        assert!(FlightState::WaitingTakeoff.is_waiting());
        assert!(!FlightState::Takeoff.is_waiting());
    }

    #[test]
    fn test_snapshot_mirrors_fields() {
        let mut flight = Flight::new(9, FlightClass::International);
        flight.priority = 7;
        flight.stages_completed = 2;
        let snap = flight.snapshot();
        assert_eq!(snap.id, 9);
        assert_eq!(snap.priority, 7);
        assert_eq!(snap.stages_completed, 2);
        assert_eq!(snap.class, FlightClass::International);
    }
}
