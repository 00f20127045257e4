// src/sim/reporter.rs
//! Status reporting
//!
//! An interim report is logged on a fixed interval while the simulation runs;
//! a [`FinalReport`] is assembled once after the drain completes. The interim
//! loop also drains the event log so the bounded queue never backs up.

use crate::flight::model::FlightState;
use crate::sim::SimContext;
use crate::telemetry::StatsSnapshot;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// End-of-run summary, serializable for downstream tooling
#[derive(Debug, Clone, Serialize)]
pub struct FinalReport {
    /// When the report was assembled
    pub generated_at: DateTime<Utc>,

    /// Configuration the run executed with
    pub config: crate::utils::config::EngineConfig,

    /// Flight counters at the end of the run
    pub stats: StatsSnapshot,

    /// Flights still in a non-terminal state when the report was built
    pub active_flights: usize,

    /// Completed flights as a fraction of created, in percent
    pub success_rate: f64,

    /// Events accepted by the event log over the whole run
    pub events_recorded: u64,

    /// Events dropped by the event log over the whole run
    pub events_dropped: u64,

    /// Final snapshot of every flight seen, ordered by id
    pub flights: Vec<crate::flight::model::FlightSnapshot>,
}

/// Log interim reports until `shutdown` flips
pub async fn run_interim(ctx: Arc<SimContext>, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(ctx.config.timing.report_interval());
    // Swallow the immediate first tick; the first report comes one full
    // interval into the run
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => log_interim(&ctx),
            _ = shutdown.changed() => break,
        }
    }
}

fn log_interim(ctx: &SimContext) {
    let occ = ctx.allocator.occupancy();
    let stats = ctx.stats.snapshot();
    let settings = ctx.allocator.settings();

    info!(
        runways = format_args!("{}/{}", occ.runways_in_use, settings.runways),
        gates = format_args!("{}/{}", occ.gates_in_use, settings.gates),
        tower = format_args!("{}/{}", occ.tower_in_use, settings.tower_capacity),
        pending = occ.pending_requests,
        active = ctx.registry.active_count(),
        completed = stats.completed,
        crashed = stats.crashed,
        go_arounds = stats.go_arounds,
        "status"
    );

    let drained = ctx.events.drain();
    if !drained.is_empty() {
        debug!(count = drained.len(), "event batch drained");
    }
}

/// Assemble the end-of-run report
pub fn final_report(ctx: &SimContext) -> FinalReport {
    // Flush whatever the interim loop had not drained yet
    let _ = ctx.events.drain();

    let stats = ctx.stats.snapshot();
    FinalReport {
        generated_at: Utc::now(),
        config: ctx.config.clone(),
        success_rate: stats.success_rate(),
        active_flights: ctx.registry.active_count(),
        events_recorded: ctx.events.pushed(),
        events_dropped: ctx.events.dropped(),
        flights: ctx.registry.list_sorted(),
        stats,
    }
}

/// Log the final report in human-readable form
pub fn log_final(report: &FinalReport) {
    info!("simulation finished");
    info!(
        created = report.stats.created,
        completed = report.stats.completed,
        crashed = report.stats.crashed,
        go_arounds = report.stats.go_arounds,
        starvation_events = report.stats.starvation_events,
        success_rate = format_args!("{:.1}%", report.success_rate),
        "totals"
    );
    for snap in &report.flights {
        if snap.state != FlightState::Completed {
            info!(
                flight = snap.id,
                class = %snap.class,
                state = snap.state.as_str(),
                stages = snap.stages_completed,
                priority = snap.priority,
                "non-completed flight"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight::model::{Flight, FlightClass};
    use crate::utils::config::EngineConfig;

    #[tokio::test]
    async fn test_final_report_contents() {
        let ctx = SimContext::new(EngineConfig::default());
        ctx.stats.incr_created();
        ctx.stats.incr_created();
        ctx.stats.incr_completed();

        let mut flight = Flight::new(1, FlightClass::Domestic);
        flight.state = FlightState::Completed;
        flight.stages_completed = 3;
        ctx.registry.publish(&flight);

        let report = final_report(&ctx);
        assert_eq!(report.stats.created, 2);
        assert_eq!(report.stats.completed, 1);
        assert!((report.success_rate - 50.0).abs() < f64::EPSILON);
        assert_eq!(report.flights.len(), 1);
    }

    #[tokio::test]
    async fn test_final_report_serializes() {
        let ctx = SimContext::new(EngineConfig::default());
        let report = final_report(&ctx);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"success_rate\""));
        assert!(json.contains("\"flights\""));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_interim_loop_stops_on_shutdown() {
        let mut cfg = EngineConfig::default();
        cfg.timing.report_interval_secs = 1;
        let ctx = SimContext::new(cfg);

        let (tx, rx) = watch::channel(false);
        let reporter = tokio::spawn(run_interim(ctx, rx));
        tx.send(true).unwrap();
        tokio::time::timeout(std::time::Duration::from_secs(1), reporter)
            .await
            .expect("reporter should exit promptly")
            .unwrap();
    }
}
