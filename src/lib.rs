// src/lib.rs
//! Airside Engine Library
//!
//! Concurrent airport ground-operations simulation built around an atomic
//! multi-resource allocator.
//!
//! # Architecture
//!
//! The engine is structured into several key modules:
//!
//! - **allocation**: resource pools, the request ledger, wait aging, and the
//!   all-or-nothing allocator
//! - **flight**: flight state, the per-flight lifecycle pipeline, and the
//!   shared snapshot registry
//! - **sim**: arrival generation, reporting, and the top-level run loop
//! - **telemetry**: structured logging, counters, and the event log
//! - **utils**: configuration and error types

// Public module exports
pub mod allocation;
pub mod flight;
pub mod sim;
pub mod telemetry;
pub mod utils;

// Re-export commonly used types
pub use allocation::allocator::{AcquireOutcome, Allocator, AllocatorSettings};
pub use flight::model::{Flight, FlightClass, FlightId, FlightState};
pub use sim::{FinalReport, SimulationEngine};
pub use utils::config::EngineConfig;
pub use utils::errors::{EngineError, Result};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
