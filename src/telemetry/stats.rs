// src/telemetry/stats.rs
//! Simulation counters
//!
//! One stats object behind its own lock, deliberately separate from the
//! allocator core lock so reporting never contends with the allocation hot
//! path. Writers get increment methods; readers get a consistent snapshot.

use parking_lot::Mutex;
use serde::Serialize;

#[derive(Debug, Default, Clone)]
struct Counters {
    created: u64,
    completed: u64,
    crashed: u64,
    go_arounds: u64,
    starvation_events: u64,
    grants: u64,
    releases: u64,
}

/// Shared simulation counters
#[derive(Debug, Default)]
pub struct SimStats {
    inner: Mutex<Counters>,
}

impl SimStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new flight entered the system
    pub fn incr_created(&self) {
        self.inner.lock().created += 1;
    }

    /// A flight finished all three stages
    pub fn incr_completed(&self) {
        self.inner.lock().completed += 1;
    }

    /// A flight exceeded the hard wait deadline
    pub fn incr_crashed(&self) {
        self.inner.lock().crashed += 1;
    }

    /// A flight exhausted its allocation attempts
    pub fn incr_go_around(&self) {
        self.inner.lock().go_arounds += 1;
    }

    /// A flight entered the critical wait state
    pub fn incr_starvation(&self) {
        self.inner.lock().starvation_events += 1;
    }

    /// The allocator granted a resource set
    pub fn incr_grant(&self) {
        self.inner.lock().grants += 1;
    }

    /// A flight returned some resource set
    pub fn incr_release(&self) {
        self.inner.lock().releases += 1;
    }

    /// Consistent read of all counters
    pub fn snapshot(&self) -> StatsSnapshot {
        let c = self.inner.lock();
        StatsSnapshot {
            created: c.created,
            completed: c.completed,
            crashed: c.crashed,
            go_arounds: c.go_arounds,
            starvation_events: c.starvation_events,
            grants: c.grants,
            releases: c.releases,
        }
    }
}

/// Point-in-time view of the simulation counters
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    /// Flights spawned by the arrival generator
    pub created: u64,

    /// Flights that completed landing, deplaning, and takeoff
    pub completed: u64,

    /// Flights lost to the hard wait deadline
    pub crashed: u64,

    /// Flights that abandoned after exhausting allocation attempts
    pub go_arounds: u64,

    /// Critical-wait-state entries across all flights
    pub starvation_events: u64,

    /// Successful resource grants
    pub grants: u64,

    /// Resource release calls
    pub releases: u64,
}

impl StatsSnapshot {
    /// Completed flights as a fraction of created, in percent
    pub fn success_rate(&self) -> f64 {
        if self.created == 0 {
            0.0
        } else {
            self.completed as f64 / self.created as f64 * 100.0
        }
    }

    /// Flights that reached a terminal state
    pub fn terminal(&self) -> u64 {
        self.completed + self.crashed + self.go_arounds
    }
}
