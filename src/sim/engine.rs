// src/sim/engine.rs
//! Top-level simulation run loop
//!
//! ```text
//! run()
//! ├─ spawn interim reporter
//! ├─ spawn arrival generator
//! ├─ wait: arrival window elapses, or Ctrl-C closes it early
//! ├─ stop arrivals, drain in-flight pipelines (bounded by drain period)
//! ├─ stop reporter
//! └─ assemble and log the final report
//! ```

use crate::sim::reporter::{self, FinalReport};
use crate::sim::{arrivals, SimContext};
use crate::utils::config::EngineConfig;
use crate::utils::errors::Result;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// Owns the shared context and drives one simulation run
pub struct SimulationEngine {
    ctx: Arc<SimContext>,
}

impl SimulationEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            ctx: SimContext::new(config),
        })
    }

    /// Shared services, mainly for tests and embedding
    pub fn context(&self) -> &Arc<SimContext> {
        &self.ctx
    }

    /// Run the arrival window plus drain, returning the final report
    pub async fn run(&self) -> Result<FinalReport> {
        let cfg = &self.ctx.config;
        info!(
            runways = cfg.resources.runways,
            gates = cfg.resources.gates,
            tower_capacity = cfg.resources.tower_capacity,
            window_secs = cfg.timing.simulation_secs,
            "simulation starting"
        );

        let (arrivals_tx, arrivals_rx) = watch::channel(false);
        let (reporter_tx, reporter_rx) = watch::channel(false);
        let reporter_task = tokio::spawn(reporter::run_interim(
            Arc::clone(&self.ctx),
            reporter_rx,
        ));
        let generator = tokio::spawn(arrivals::run(Arc::clone(&self.ctx), arrivals_rx));

        tokio::select! {
            _ = tokio::time::sleep(cfg.simulation_window()) => {
                info!("arrival window elapsed");
            }
            _ = interrupt() => {
                info!("interrupt received; closing the arrival window early");
            }
        }
        let _ = arrivals_tx.send(true);
        let handles = generator.await?;

        info!(pipelines = handles.len(), "draining in-flight pipelines");
        let deadline = tokio::time::Instant::now() + cfg.drain_period();
        let mut aborted = 0usize;
        for handle in handles {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            let abort = handle.abort_handle();
            match tokio::time::timeout(remaining, handle).await {
                Ok(joined) => joined?,
                Err(_) => {
                    abort.abort();
                    aborted += 1;
                }
            }
        }
        if aborted > 0 {
            warn!(aborted, "drain period expired before all pipelines finished");
        }

        let _ = reporter_tx.send(true);
        reporter_task.await?;

        let report = reporter::final_report(&self.ctx);
        reporter::log_final(&report);
        Ok(report)
    }
}

/// Resolve on Ctrl-C; never resolve if the handler cannot be installed,
/// leaving the arrival window in charge
async fn interrupt() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
