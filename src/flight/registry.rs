// src/flight/registry.rs
//! Shared flight registry
//!
//! Concurrent map from flight id to the latest published snapshot. Pipelines
//! publish after every transition; the reporter reads without blocking any
//! writer. Terminal snapshots are retained so the final report covers the
//! whole simulation, not just the flights still in the air.

use crate::flight::model::{Flight, FlightId, FlightSnapshot, FlightState};
use dashmap::DashMap;

/// Concurrent registry of flight snapshots
#[derive(Debug, Default)]
pub struct FlightRegistry {
    flights: DashMap<FlightId, FlightSnapshot>,
}

impl FlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish the flight's current state, replacing any previous snapshot
    pub fn publish(&self, flight: &Flight) {
        self.flights.insert(flight.id, flight.snapshot());
    }

    /// Latest snapshot for one flight, if it was ever published
    pub fn get(&self, id: FlightId) -> Option<FlightSnapshot> {
        self.flights.get(&id).map(|entry| entry.value().clone())
    }

    /// All snapshots ordered by flight id
    pub fn list_sorted(&self) -> Vec<FlightSnapshot> {
        let mut snapshots: Vec<FlightSnapshot> = self
            .flights
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        snapshots
    }

    /// Flights currently in a non-terminal state
    pub fn active_count(&self) -> usize {
        self.flights
            .iter()
            .filter(|entry| !entry.value().state.is_terminal())
            .count()
    }

    /// Total flights ever published
    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    /// Snapshots currently in `state`
    pub fn count_in_state(&self, state: FlightState) -> usize {
        self.flights
            .iter()
            .filter(|entry| entry.value().state == state)
            .count()
    }
}
