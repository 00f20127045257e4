// src/telemetry/mod.rs
//! Observability: structured logging, counters, and the event log

pub mod events;
pub mod stats;

pub use events::{EventLog, SimEvent, SimEventKind};
pub use stats::{SimStats, StatsSnapshot};

use crate::utils::errors::{EngineError, Result};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber
///
/// Respects `RUST_LOG`; defaults to `info` when unset.
pub fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| EngineError::Telemetry(e.to_string()))
}
