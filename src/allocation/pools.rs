// src/allocation/pools.rs
//! Airport resource pools
//!
//! Two pool shapes back every allocation decision:
//!
//! - [`UnitPool`]: a fixed set of interchangeable, exclusive units (runways,
//!   gates). A request never cares *which* unit it gets, only that one is
//!   free. Each unit records its holder so misuse is diagnosable.
//! - [`TowerChannel`]: a counting resource with fixed capacity; at most K
//!   flights hold a tower clearance at once.
//!
//! Pools never queue or block. All calls happen under the allocator core
//! lock; queueing and fairness live in the ledger and the allocator loop.

use crate::flight::model::FlightId;
use crate::utils::errors::{EngineError, Result};

/// Which resource kind a pool or grant refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Runway,
    Gate,
    Tower,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Runway => "runway",
            ResourceKind::Gate => "gate",
            ResourceKind::Tower => "tower",
        }
    }
}

/// Fixed-size pool of exclusive, interchangeable units
#[derive(Debug)]
pub struct UnitPool {
    kind: ResourceKind,
    units: Vec<Option<FlightId>>,
}

impl UnitPool {
    /// Create a pool with `size` free units
    pub fn new(kind: ResourceKind, size: usize) -> Self {
        Self {
            kind,
            units: vec![None; size],
        }
    }

    /// Claim the first free unit for `holder`, if any
    pub fn try_acquire(&mut self, holder: FlightId) -> Option<usize> {
        let index = self.units.iter().position(|u| u.is_none())?;
        self.units[index] = Some(holder);
        Some(index)
    }

    /// Free a held unit
    ///
    /// Releasing a unit that is free or out of range is a bookkeeping
    /// violation and returns an error rather than being ignored.
    pub fn release(&mut self, index: usize) -> Result<()> {
        let size = self.units.len();
        let slot = self
            .units
            .get_mut(index)
            .ok_or(EngineError::UnitOutOfRange {
                pool: self.kind.as_str(),
                index,
                size,
            })?;
        if slot.take().is_none() {
            return Err(EngineError::UnitNotHeld {
                pool: self.kind.as_str(),
                index,
            });
        }
        Ok(())
    }

    /// Number of free units
    pub fn free_count(&self) -> usize {
        self.units.iter().filter(|u| u.is_none()).count()
    }

    /// Number of held units
    pub fn in_use(&self) -> usize {
        self.units.len() - self.free_count()
    }

    /// Pool capacity
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// True when the pool has no units
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Holder of a unit, if held
    pub fn holder(&self, index: usize) -> Option<FlightId> {
        self.units.get(index).copied().flatten()
    }
}

/// Capacity-limited control-tower clearance channel
#[derive(Debug)]
pub struct TowerChannel {
    capacity: u32,
    in_use: u32,
}

impl TowerChannel {
    /// Create a channel allowing `capacity` concurrent clearances
    pub fn new(capacity: u32) -> Self {
        Self { capacity, in_use: 0 }
    }

    /// Claim a clearance if capacity remains
    pub fn try_acquire(&mut self) -> bool {
        if self.in_use < self.capacity {
            self.in_use += 1;
            true
        } else {
            false
        }
    }

    /// Return a clearance
    pub fn release(&mut self) -> Result<()> {
        if self.in_use == 0 {
            return Err(EngineError::TowerUnderflow);
        }
        self.in_use -= 1;
        Ok(())
    }

    /// True when at least one clearance is free
    pub fn has_capacity(&self) -> bool {
        self.in_use < self.capacity
    }

    /// Clearances currently held
    pub fn in_use(&self) -> u32 {
        self.in_use
    }

    /// Maximum concurrent clearances
    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}
