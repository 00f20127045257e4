// src/allocation/allocator.rs
//! Atomic multi-resource allocator
//!
//! The single arbitration point for runways, gates, and tower clearances.
//! One lock guards the pools and the request ledger; allocation decisions are
//! serialized under it and tasks only ever suspend *outside* it, waiting on a
//! shared [`Notify`] with a bounded timeout.
//!
//! # Protocol
//!
//! ```text
//! acquire_all(flight, needs)
//! ├─ insert request into ledger (priority, monotonic seq)
//! ├─ loop (bounded by max_attempts):
//! │   ├─ head-only rule: non-head requests do not attempt allocation
//! │   ├─ check ALL needed kinds free before acquiring ANY (all-or-nothing)
//! │   ├─ grant → exit with held units
//! │   └─ denial → aging (+1), critical boost (+5, once), crash check,
//! │                re-sort, timed wait on the notify
//! └─ remove request (idempotent), broadcast, return outcome
//! ```
//!
//! No flight ever holds one needed resource while blocked on another, so
//! circular wait is impossible by construction. Priority aging bounds waiting
//! in practice; the crash deadline and the attempt budget bound it absolutely.

use crate::allocation::aging::{WaitMonitor, WaitState};
use crate::allocation::ledger::{RequestLedger, ResourceNeeds};
use crate::allocation::pools::{ResourceKind, TowerChannel, UnitPool};
use crate::flight::model::{Flight, FlightClass, FlightId};
use crate::telemetry::{EventLog, SimEventKind, SimStats};
use crate::utils::config::EngineConfig;
use crate::utils::errors::Result;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, error, trace, warn};

/// Resources handed out by a successful allocation
#[derive(Debug, Clone, Default)]
pub struct ResourceGrant {
    /// Granted runway unit, if requested
    pub runway: Option<usize>,

    /// Granted gate unit, if requested
    pub gate: Option<usize>,

    /// Whether a tower clearance was granted
    pub tower: bool,
}

/// How an allocation request ended
#[derive(Debug)]
pub enum AcquireOutcome {
    /// All needed resources acquired atomically
    Granted(ResourceGrant),

    /// The wait exceeded the hard deadline; the flight is lost
    TimedOutCrashed,

    /// The attempt budget ran out; the flight abandons without a leak
    AbandonedGoAround,
}

/// Why an attempt did not produce a grant
#[derive(Debug, Clone, Copy)]
enum Denial {
    /// Another request is at the ledger head this round
    NotHead,

    /// A needed resource kind had no free capacity
    Unavailable(ResourceKind),

    /// Availability said yes but acquisition failed; rolled back.
    /// Indicates corrupted bookkeeping and is reported loudly.
    Inconsistent,
}

/// Read-only occupancy snapshot for reporting and tests
#[derive(Debug, Clone, Copy)]
pub struct PoolOccupancy {
    pub runways_in_use: usize,
    pub gates_in_use: usize,
    pub tower_in_use: u32,
    pub pending_requests: usize,
}

/// Allocator tuning, extracted from [`EngineConfig`]
#[derive(Debug, Clone)]
pub struct AllocatorSettings {
    pub runways: usize,
    pub gates: usize,
    pub tower_capacity: u32,
    pub max_attempts: u32,
    pub retry_wait: Duration,
    pub aging_step: u32,
    pub critical_boost: u32,
    pub critical_after: Duration,
    pub crash_after: Duration,
}

impl AllocatorSettings {
    pub fn from_config(cfg: &EngineConfig) -> Self {
        Self {
            runways: cfg.resources.runways,
            gates: cfg.resources.gates,
            tower_capacity: cfg.resources.tower_capacity,
            max_attempts: cfg.allocation.max_attempts,
            retry_wait: cfg.retry_wait(),
            aging_step: cfg.allocation.aging_step,
            critical_boost: cfg.allocation.critical_boost,
            critical_after: cfg.critical_after(),
            crash_after: cfg.crash_after(),
        }
    }
}

/// State guarded by the single allocation lock
struct AllocatorCore {
    runways: UnitPool,
    gates: UnitPool,
    tower: TowerChannel,
    ledger: RequestLedger,
}

impl AllocatorCore {
    /// One arbitration round for `flight_id`. Grants only when the request is
    /// the ledger head and every needed kind is free.
    fn grant_for(
        &mut self,
        flight_id: FlightId,
        class: FlightClass,
        needs: ResourceNeeds,
    ) -> std::result::Result<ResourceGrant, Denial> {
        match self.ledger.head() {
            Some(head) if head.flight_id == flight_id => {}
            _ => return Err(Denial::NotHead),
        }

        // Check every needed kind before acquiring any of them
        if needs.runway && self.runways.free_count() == 0 {
            return Err(Denial::Unavailable(ResourceKind::Runway));
        }
        if needs.gate && self.gates.free_count() == 0 {
            return Err(Denial::Unavailable(ResourceKind::Gate));
        }
        if needs.tower && !self.tower.has_capacity() {
            return Err(Denial::Unavailable(ResourceKind::Tower));
        }

        // Domestic flights clear with the tower before claiming units,
        // international flights the other way round. Under the single lock
        // the order carries no blocking semantics.
        let mut grant = ResourceGrant::default();
        let complete = match class {
            FlightClass::Domestic => {
                self.acquire_tower(needs, &mut grant) && self.acquire_units(flight_id, needs, &mut grant)
            }
            FlightClass::International => {
                self.acquire_units(flight_id, needs, &mut grant) && self.acquire_tower(needs, &mut grant)
            }
        };

        if !complete {
            error!(
                flight = flight_id,
                ?grant,
                "acquisition failed after availability check; rolling back"
            );
            self.rollback(&mut grant);
            return Err(Denial::Inconsistent);
        }

        Ok(grant)
    }

    fn acquire_units(&mut self, flight_id: FlightId, needs: ResourceNeeds, grant: &mut ResourceGrant) -> bool {
        if needs.runway {
            match self.runways.try_acquire(flight_id) {
                Some(index) => grant.runway = Some(index),
                None => return false,
            }
        }
        if needs.gate {
            match self.gates.try_acquire(flight_id) {
                Some(index) => grant.gate = Some(index),
                None => return false,
            }
        }
        true
    }

    fn acquire_tower(&mut self, needs: ResourceNeeds, grant: &mut ResourceGrant) -> bool {
        if needs.tower {
            if !self.tower.try_acquire() {
                return false;
            }
            grant.tower = true;
        }
        true
    }

    fn rollback(&mut self, grant: &mut ResourceGrant) {
        if let Some(index) = grant.runway.take() {
            if let Err(e) = self.runways.release(index) {
                error!(error = %e, "rollback of runway unit failed");
            }
        }
        if let Some(index) = grant.gate.take() {
            if let Err(e) = self.gates.release(index) {
                error!(error = %e, "rollback of gate unit failed");
            }
        }
        if grant.tower {
            grant.tower = false;
            if let Err(e) = self.tower.release() {
                error!(error = %e, "rollback of tower clearance failed");
            }
        }
    }
}

/// The shared arbitration engine
pub struct Allocator {
    core: Mutex<AllocatorCore>,
    wake: Notify,
    monitor: WaitMonitor,
    settings: AllocatorSettings,
    stats: Arc<SimStats>,
    events: Arc<EventLog>,
}

impl Allocator {
    pub fn new(settings: AllocatorSettings, stats: Arc<SimStats>, events: Arc<EventLog>) -> Self {
        let monitor = WaitMonitor::new(settings.critical_after, settings.crash_after);
        let core = AllocatorCore {
            runways: UnitPool::new(ResourceKind::Runway, settings.runways),
            gates: UnitPool::new(ResourceKind::Gate, settings.gates),
            tower: TowerChannel::new(settings.tower_capacity),
            ledger: RequestLedger::new(),
        };
        Self {
            core: Mutex::new(core),
            wake: Notify::new(),
            monitor,
            settings,
            stats,
            events,
        }
    }

    /// Acquire every resource kind in `needs` atomically, or fail permanently
    ///
    /// Blocks (yielding) until the request is granted, the flight crashes on
    /// the wait deadline, or the attempt budget is exhausted. Only the granted
    /// path leaves resources held.
    pub async fn acquire_all(&self, flight: &mut Flight, needs: ResourceNeeds) -> AcquireOutcome {
        {
            let mut core = self.core.lock();
            core.ledger.insert(flight.id, needs, flight.priority);
        }
        trace!(flight = flight.id, ?needs, "allocation request enqueued");

        let mut attempts: u32 = 0;
        let outcome = loop {
            // Register interest before re-checking state, so a broadcast
            // between the unlock and the await cannot be lost
            let notified = self.wake.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let verdict = {
                let mut core = self.core.lock();
                match core.grant_for(flight.id, flight.class, needs) {
                    Ok(grant) => Ok(grant),
                    Err(denial) => {
                        attempts += 1;
                        flight.failed_attempts += 1;
                        flight.priority += self.settings.aging_step;

                        let wait_state =
                            self.monitor.check(flight.wait_started.elapsed(), flight.critical);
                        if wait_state == WaitState::Critical {
                            flight.critical = true;
                            flight.priority += self.settings.critical_boost;
                        }
                        core.ledger.reprioritize(flight.id, flight.priority);
                        Err((denial, wait_state))
                    }
                }
            };

            match verdict {
                Ok(grant) => {
                    debug!(
                        flight = flight.id,
                        runway = ?grant.runway,
                        gate = ?grant.gate,
                        tower = grant.tower,
                        "resources granted"
                    );
                    self.stats.incr_grant();
                    self.events.push(
                        flight.id,
                        SimEventKind::ResourcesGranted {
                            runway: grant.runway,
                            gate: grant.gate,
                            tower: grant.tower,
                        },
                    );
                    break AcquireOutcome::Granted(grant);
                }
                Err((_, WaitState::Crashed)) => {
                    warn!(
                        flight = flight.id,
                        waited_ms = flight.wait_started.elapsed().as_millis() as u64,
                        "wait deadline exceeded"
                    );
                    break AcquireOutcome::TimedOutCrashed;
                }
                Err((denial, wait_state)) => {
                    if wait_state == WaitState::Critical {
                        self.stats.incr_starvation();
                        self.events.push(flight.id, SimEventKind::WentCritical);
                        warn!(
                            flight = flight.id,
                            priority = flight.priority,
                            "entered critical wait state"
                        );
                    }
                    if attempts >= self.settings.max_attempts {
                        debug!(flight = flight.id, attempts, "attempt budget exhausted");
                        break AcquireOutcome::AbandonedGoAround;
                    }
                    trace!(flight = flight.id, ?denial, attempts, "attempt denied");
                    let _ = tokio::time::timeout(self.settings.retry_wait, notified).await;
                }
            }
        };

        {
            let mut core = self.core.lock();
            core.ledger.remove(flight.id);
        }
        // Head or priorities changed; let blocked waiters re-evaluate
        self.wake.notify_waiters();
        outcome
    }

    /// Release whichever resource kinds the caller actually holds
    ///
    /// Any subset may be released (e.g. only the tower after deplaning while
    /// the gate is retained). Double releases and stale indices surface as
    /// errors.
    pub fn release(
        &self,
        flight_id: FlightId,
        runway: Option<usize>,
        gate: Option<usize>,
        tower: bool,
    ) -> Result<()> {
        {
            let mut core = self.core.lock();
            if let Some(index) = runway {
                core.runways.release(index)?;
            }
            if let Some(index) = gate {
                core.gates.release(index)?;
            }
            if tower {
                core.tower.release()?;
            }
        }
        self.stats.incr_release();
        self.events.push(
            flight_id,
            SimEventKind::ResourcesReleased { runway, gate, tower },
        );
        trace!(flight = flight_id, ?runway, ?gate, tower, "resources released");
        self.wake.notify_waiters();
        Ok(())
    }

    /// Point-in-time pool and ledger occupancy
    pub fn occupancy(&self) -> PoolOccupancy {
        let core = self.core.lock();
        PoolOccupancy {
            runways_in_use: core.runways.in_use(),
            gates_in_use: core.gates.in_use(),
            tower_in_use: core.tower.in_use(),
            pending_requests: core.ledger.len(),
        }
    }

    /// Allocator tuning in effect
    pub fn settings(&self) -> &AllocatorSettings {
        &self.settings
    }
}
