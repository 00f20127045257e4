// src/flight/pipeline.rs
//! Flight lifecycle pipeline
//!
//! One task per flight drives the three stages in order:
//!
//! ```text
//! waiting_land    --(runway + tower)-->  landing   (release both)
//! waiting_deplane --(gate + tower)--->   deplaning (release tower, keep gate)
//! waiting_takeoff --(runway + tower)->   takeoff   (release all, incl. gate)
//! ```
//!
//! The gate stays held from the deplaning grant until takeoff completes, so a
//! flight that crashes or goes around while waiting for takeoff must hand the
//! gate back before terminating.

use crate::allocation::allocator::AcquireOutcome;
use crate::allocation::ledger::ResourceNeeds;
use crate::flight::model::{Flight, FlightId, FlightState};
use crate::sim::SimContext;
use crate::telemetry::SimEventKind;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Drive one flight from arrival to a terminal state
pub async fn run(mut flight: Flight, ctx: Arc<SimContext>) {
    info!(flight = flight.id, class = %flight.class, "flight entering airspace");
    ctx.events.push(flight.id, SimEventKind::FlightCreated);
    ctx.registry.publish(&flight);

    // Stage 1: landing (runway + tower, both released after)
    flight.begin_wait(FlightState::WaitingLand);
    ctx.registry.publish(&flight);
    match ctx
        .allocator
        .acquire_all(&mut flight, ResourceNeeds::landing())
        .await
    {
        AcquireOutcome::Granted(grant) => {
            flight.runway = grant.runway;
            flight.state = FlightState::Landing;
            ctx.registry.publish(&flight);
            tokio::time::sleep(ctx.config.timing.landing()).await;

            flight.stages_completed = 1;
            let runway = flight.runway.take();
            release(&ctx, flight.id, runway, None, true);
            info!(flight = flight.id, "landed");
        }
        AcquireOutcome::TimedOutCrashed => return finish_crashed(flight, ctx),
        AcquireOutcome::AbandonedGoAround => return finish_go_around(flight, ctx),
    }

    // Stage 2: deplaning (gate + tower; tower released after, gate retained)
    flight.begin_wait(FlightState::WaitingDeplane);
    ctx.registry.publish(&flight);
    match ctx
        .allocator
        .acquire_all(&mut flight, ResourceNeeds::deplaning())
        .await
    {
        AcquireOutcome::Granted(grant) => {
            flight.gate = grant.gate;
            flight.state = FlightState::Deplaning;
            ctx.registry.publish(&flight);
            tokio::time::sleep(ctx.config.timing.deplaning()).await;

            flight.stages_completed = 2;
            release(&ctx, flight.id, None, None, true);
            info!(flight = flight.id, gate = ?flight.gate, "deplaned, holding gate");
            tokio::time::sleep(ctx.config.timing.gate_turnaround()).await;
        }
        AcquireOutcome::TimedOutCrashed => return finish_crashed(flight, ctx),
        AcquireOutcome::AbandonedGoAround => return finish_go_around(flight, ctx),
    }

    // Stage 3: takeoff (runway + tower, then everything back incl. the gate)
    flight.begin_wait(FlightState::WaitingTakeoff);
    ctx.registry.publish(&flight);
    match ctx
        .allocator
        .acquire_all(&mut flight, ResourceNeeds::takeoff())
        .await
    {
        AcquireOutcome::Granted(grant) => {
            flight.runway = grant.runway;
            flight.state = FlightState::Takeoff;
            ctx.registry.publish(&flight);
            tokio::time::sleep(ctx.config.timing.takeoff()).await;

            flight.stages_completed = 3;
            let runway = flight.runway.take();
            let gate = flight.gate.take();
            release(&ctx, flight.id, runway, gate, true);

            flight.state = FlightState::Completed;
            ctx.stats.incr_completed();
            ctx.events.push(flight.id, SimEventKind::Completed);
            ctx.registry.publish(&flight);
            info!(flight = flight.id, "departed");
        }
        AcquireOutcome::TimedOutCrashed => finish_crashed(flight, ctx),
        AcquireOutcome::AbandonedGoAround => finish_go_around(flight, ctx),
    }
}

/// Return a subset of held resources to the allocator
fn release(
    ctx: &SimContext,
    flight_id: FlightId,
    runway: Option<usize>,
    gate: Option<usize>,
    tower: bool,
) {
    if let Err(e) = ctx.allocator.release(flight_id, runway, gate, tower) {
        error!(flight = flight_id, error = %e, "resource release failed");
    }
}

/// Terminal path for a flight that exceeded the wait deadline
///
/// The allocator leaves nothing granted on this path; only a gate retained
/// from an earlier stage can still be held.
fn finish_crashed(mut flight: Flight, ctx: Arc<SimContext>) {
    return_retained_gate(&mut flight, &ctx);
    flight.state = FlightState::Crashed;
    ctx.stats.incr_crashed();
    ctx.events.push(flight.id, SimEventKind::Crashed);
    ctx.registry.publish(&flight);
    warn!(
        flight = flight.id,
        stages = flight.stages_completed,
        "flight lost to wait deadline"
    );
}

/// Terminal path for a flight that ran out of allocation attempts
fn finish_go_around(mut flight: Flight, ctx: Arc<SimContext>) {
    return_retained_gate(&mut flight, &ctx);
    flight.state = FlightState::GoAround;
    ctx.stats.incr_go_around();
    ctx.events.push(flight.id, SimEventKind::GoAround);
    ctx.registry.publish(&flight);
    warn!(
        flight = flight.id,
        stages = flight.stages_completed,
        attempts = flight.failed_attempts,
        "flight diverted after exhausting attempts"
    );
}

fn return_retained_gate(flight: &mut Flight, ctx: &SimContext) {
    if let Some(gate) = flight.gate.take() {
        if let Err(e) = ctx.allocator.release(flight.id, None, Some(gate), false) {
            error!(flight = flight.id, gate, error = %e, "gate return failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight::model::FlightClass;
    use crate::sim::SimContext;
    use crate::utils::config::EngineConfig;

    fn fast_config() -> EngineConfig {
        let mut cfg = EngineConfig::default();
        cfg.timing.landing_ms = 10;
        cfg.timing.deplaning_ms = 10;
        cfg.timing.gate_turnaround_ms = 5;
        cfg.timing.takeoff_ms = 10;
        cfg.allocation.retry_wait_ms = 10;
        cfg
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_single_flight_completes_all_stages() {
        let ctx = SimContext::new(fast_config());
        run(Flight::new(1, FlightClass::Domestic), Arc::clone(&ctx)).await;

        let snap = ctx.registry.get(1).expect("flight should be registered");
        assert_eq!(snap.state, FlightState::Completed);
        assert_eq!(snap.stages_completed, 3);
        assert_eq!(ctx.stats.snapshot().completed, 1);

        let occ = ctx.allocator.occupancy();
        assert_eq!(occ.runways_in_use, 0);
        assert_eq!(occ.gates_in_use, 0);
        assert_eq!(occ.tower_in_use, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_competing_flights_all_terminate_cleanly() {
        let mut cfg = fast_config();
        cfg.resources.runways = 1;
        cfg.resources.gates = 1;
        cfg.resources.tower_capacity = 1;
        let ctx = SimContext::new(cfg);

        let mut handles = vec![];
        for id in 1..=4u32 {
            let class = if id % 2 == 0 {
                FlightClass::International
            } else {
                FlightClass::Domestic
            };
            let ctx = Arc::clone(&ctx);
            handles.push(tokio::spawn(run(Flight::new(id, class), ctx)));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // Every flight reached a terminal state and nothing stayed held
        for snap in ctx.registry.list_sorted() {
            assert!(snap.state.is_terminal(), "flight {} not terminal", snap.id);
        }
        let stats = ctx.stats.snapshot();
        assert_eq!(stats.terminal(), 4);

        let occ = ctx.allocator.occupancy();
        assert_eq!(occ.runways_in_use, 0);
        assert_eq!(occ.gates_in_use, 0);
        assert_eq!(occ.tower_in_use, 0);
        assert_eq!(occ.pending_requests, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_takeoff_go_around_returns_gate() {
        // One runway held by an outside hog makes takeoff impossible, so the
        // flight lands, deplanes, and then must divert while holding its gate
        let mut cfg = fast_config();
        cfg.resources.runways = 2;
        cfg.resources.gates = 1;
        cfg.resources.tower_capacity = 2;
        cfg.allocation.max_attempts = 3;
        let ctx = SimContext::new(cfg);

        // Occupy both runways directly so the takeoff stage starves; landing
        // must happen first, so grab them after it finishes
        let ctx_clone = Arc::clone(&ctx);
        let pilot = tokio::spawn(run(Flight::new(1, FlightClass::Domestic), ctx_clone));

        // Wait until the flight is deplaning, then hog the runways
        let hogged = loop {
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
            if let Some(snap) = ctx.registry.get(1) {
                if snap.state == FlightState::Deplaning {
                    let mut hog_a = Flight::new(90, FlightClass::Domestic);
                    let mut hog_b = Flight::new(91, FlightClass::Domestic);
                    let needs = ResourceNeeds {
                        runway: true,
                        gate: false,
                        tower: false,
                    };
                    let a = ctx.allocator.acquire_all(&mut hog_a, needs).await;
                    let b = ctx.allocator.acquire_all(&mut hog_b, needs).await;
                    break matches!(a, AcquireOutcome::Granted(_))
                        && matches!(b, AcquireOutcome::Granted(_));
                }
                if snap.state.is_terminal() {
                    break false;
                }
            }
        };
        assert!(hogged, "runway hogs must win the race against takeoff");

        pilot.await.unwrap();
        let snap = ctx.registry.get(1).unwrap();
        assert_eq!(snap.state, FlightState::GoAround);
        assert_eq!(snap.stages_completed, 2);

        // The diverted flight returned its gate even though takeoff failed
        assert_eq!(ctx.allocator.occupancy().gates_in_use, 0);
        assert_eq!(ctx.stats.snapshot().go_arounds, 1);
    }
}
