// src/main.rs
//! Airside Engine
//!
//! Concurrent airport ground-operations simulation: flights compete for
//! runways, gates, and tower clearances through an atomic multi-resource
//! allocator with priority aging.

use airside_engine::sim::SimulationEngine;
use airside_engine::telemetry::init_tracing;
use airside_engine::utils::config::EngineConfig;
use anyhow::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    info!("Starting Airside Engine v{}", env!("CARGO_PKG_VERSION"));

    let config = EngineConfig::load()?;
    info!(
        runways = config.resources.runways,
        gates = config.resources.gates,
        tower_capacity = config.resources.tower_capacity,
        window_secs = config.timing.simulation_secs,
        "configuration loaded"
    );

    let engine = SimulationEngine::new(config)?;
    let report = engine.run().await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
