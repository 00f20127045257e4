// src/sim/arrivals.rs
//! Arrival generator
//!
//! One task spawns a new flight pipeline at a random interval until the
//! arrival window closes. Flight ids are sequential; the class draw follows
//! the configured international ratio.

use crate::flight::model::{Flight, FlightClass, FlightId};
use crate::flight::pipeline;
use crate::sim::SimContext;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Generate arrivals until `shutdown` flips, returning the pipeline handles
pub async fn run(
    ctx: Arc<SimContext>,
    mut shutdown: watch::Receiver<bool>,
) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::new();
    let mut next_id: FlightId = 1;

    loop {
        // The rng handle is thread-local and must not live across an await
        let (interval, class) = {
            let mut rng = rand::thread_rng();
            let millis = rng.gen_range(
                ctx.config.arrivals.min_interval_ms..=ctx.config.arrivals.max_interval_ms,
            );
            let class = if rng.gen_bool(ctx.config.arrivals.international_ratio) {
                FlightClass::International
            } else {
                FlightClass::Domestic
            };
            (Duration::from_millis(millis), class)
        };

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown.changed() => {
                info!(spawned = handles.len(), "arrival window closed");
                break;
            }
        }

        let flight = Flight::new(next_id, class);
        debug!(flight = next_id, class = %class, "arrival generated");
        ctx.stats.incr_created();
        handles.push(tokio::spawn(pipeline::run(flight, Arc::clone(&ctx))));
        next_id += 1;
    }

    handles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config::EngineConfig;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_generator_spawns_until_shutdown() {
        let mut cfg = EngineConfig::default();
        cfg.arrivals.min_interval_ms = 1;
        cfg.arrivals.max_interval_ms = 3;
        cfg.timing.landing_ms = 1;
        cfg.timing.deplaning_ms = 1;
        cfg.timing.gate_turnaround_ms = 1;
        cfg.timing.takeoff_ms = 1;
        let ctx = SimContext::new(cfg);

        let (tx, rx) = watch::channel(false);
        let gen = tokio::spawn(run(Arc::clone(&ctx), rx));

        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(true).unwrap();

        let handles = gen.await.unwrap();
        assert!(!handles.is_empty(), "window long enough for arrivals");
        assert_eq!(ctx.stats.snapshot().created as usize, handles.len());

        for handle in handles {
            handle.await.unwrap();
        }
        // Sequential ids starting at 1
        let ids: Vec<_> = ctx.registry.list_sorted().iter().map(|s| s.id).collect();
        let expected: Vec<_> = (1..=ids.len() as u32).collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_shutdown_before_first_arrival_spawns_nothing() {
        let mut cfg = EngineConfig::default();
        cfg.arrivals.min_interval_ms = 5_000;
        cfg.arrivals.max_interval_ms = 5_000;
        let ctx = SimContext::new(cfg);

        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        let handles = run(ctx, rx).await;
        assert!(handles.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_class_ratio_extremes() {
        let mut cfg = EngineConfig::default();
        cfg.arrivals.min_interval_ms = 1;
        cfg.arrivals.max_interval_ms = 1;
        cfg.arrivals.international_ratio = 1.0;
        cfg.timing.landing_ms = 1;
        cfg.timing.deplaning_ms = 1;
        cfg.timing.gate_turnaround_ms = 1;
        cfg.timing.takeoff_ms = 1;
        let ctx = SimContext::new(cfg);

        let (tx, rx) = watch::channel(false);
        let gen = tokio::spawn(run(Arc::clone(&ctx), rx));
        tokio::time::sleep(Duration::from_millis(20)).await;
        tx.send(true).unwrap();

        for handle in gen.await.unwrap() {
            handle.await.unwrap();
        }
        for snap in ctx.registry.list_sorted() {
            assert_eq!(snap.class, FlightClass::International);
        }
    }
}
