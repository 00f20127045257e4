// src/allocation/mod.rs
//! Resource arbitration
//!
//! Everything that decides who gets runways, gates, and tower clearances:
//!
//! - [`pools`]: fixed-size unit pools and the counted tower channel
//! - [`ledger`]: the priority-ordered request queue
//! - [`aging`]: wait-time classification (ok / critical / crashed)
//! - [`allocator`]: the atomic all-or-nothing allocation engine

pub mod aging;
pub mod allocator;
pub mod ledger;
pub mod pools;

pub use aging::{WaitMonitor, WaitState};
pub use allocator::{AcquireOutcome, Allocator, AllocatorSettings, PoolOccupancy, ResourceGrant};
pub use ledger::{AllocationRequest, RequestLedger, ResourceNeeds};
pub use pools::{ResourceKind, TowerChannel, UnitPool};
