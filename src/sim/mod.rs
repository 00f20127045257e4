// src/sim/mod.rs
//! Simulation orchestration
//!
//! - [`SimContext`]: the shared services every task receives
//! - [`arrivals`]: the arrival generator spawning flight pipelines
//! - [`reporter`]: interim status reports and the final report
//! - [`engine`]: the top-level run loop (window, drain, shutdown)

pub mod arrivals;
pub mod engine;
pub mod reporter;

pub use engine::SimulationEngine;
pub use reporter::FinalReport;

use crate::allocation::allocator::{Allocator, AllocatorSettings};
use crate::flight::registry::FlightRegistry;
use crate::telemetry::{EventLog, SimStats};
use crate::utils::config::EngineConfig;
use std::sync::Arc;

/// Shared services handed to every simulation task
pub struct SimContext {
    pub config: EngineConfig,
    pub allocator: Arc<Allocator>,
    pub stats: Arc<SimStats>,
    pub events: Arc<EventLog>,
    pub registry: Arc<FlightRegistry>,
}

impl SimContext {
    /// Build the full service graph from one configuration
    pub fn new(config: EngineConfig) -> Arc<Self> {
        let stats = Arc::new(SimStats::new());
        let events = Arc::new(EventLog::default());
        let allocator = Arc::new(Allocator::new(
            AllocatorSettings::from_config(&config),
            Arc::clone(&stats),
            Arc::clone(&events),
        ));
        Arc::new(Self {
            config,
            allocator,
            stats,
            events,
            registry: Arc::new(FlightRegistry::new()),
        })
    }
}
