// src/allocation/ledger.rs
//! Request ledger: the priority-ordered set of pending allocation requests
//!
//! The ledger is the fairness mechanism of the allocator. Requests are kept
//! totally ordered by priority descending, then by a monotonic insertion
//! sequence ascending: exact FIFO among equal priorities, with no wall-clock
//! resolution hazards. Only the head of this order may attempt allocation in
//! any arbitration round; combined with all-or-nothing acquisition this is
//! what makes the protocol deadlock-free.
//!
//! All operations run under the allocator core lock. The bounded population
//! (at most one pending request per live flight) keeps the sort cheap.

use crate::flight::model::FlightId;

/// The resource kinds one allocation request needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceNeeds {
    pub runway: bool,
    pub gate: bool,
    pub tower: bool,
}

impl ResourceNeeds {
    /// Landing: a runway plus tower clearance
    pub fn landing() -> Self {
        Self {
            runway: true,
            gate: false,
            tower: true,
        }
    }

    /// Deplaning: a gate plus tower clearance
    pub fn deplaning() -> Self {
        Self {
            runway: false,
            gate: true,
            tower: true,
        }
    }

    /// Takeoff: a runway plus tower clearance (the gate is already held)
    pub fn takeoff() -> Self {
        Self {
            runway: true,
            gate: false,
            tower: true,
        }
    }
}

/// One flight's pending need at its current stage
#[derive(Debug, Clone)]
pub struct AllocationRequest {
    /// Requesting flight
    pub flight_id: FlightId,

    /// Resource kinds needed this stage
    pub needs: ResourceNeeds,

    /// Current priority; escalates while the flight waits
    pub priority: u32,

    /// Monotonic insertion sequence, the tie-break among equal priorities
    pub seq: u64,

    /// Failed allocation attempts for this request
    pub attempts: u32,
}

/// Ordered collection of pending allocation requests
#[derive(Debug, Default)]
pub struct RequestLedger {
    entries: Vec<AllocationRequest>,
    next_seq: u64,
}

impl RequestLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a request and restore the sort order. Returns the stamped sequence.
    pub fn insert(&mut self, flight_id: FlightId, needs: ResourceNeeds, priority: u32) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(AllocationRequest {
            flight_id,
            needs,
            priority,
            seq,
            attempts: 0,
        });
        self.sort();
        seq
    }

    /// Remove a flight's request. Idempotent: absent requests are a no-op.
    pub fn remove(&mut self, flight_id: FlightId) {
        self.entries.retain(|r| r.flight_id != flight_id);
    }

    /// The highest-priority, oldest pending request
    pub fn head(&self) -> Option<&AllocationRequest> {
        self.entries.first()
    }

    /// Update a request's priority, count the failed attempt, and re-sort
    pub fn reprioritize(&mut self, flight_id: FlightId, new_priority: u32) {
        if let Some(req) = self.entries.iter_mut().find(|r| r.flight_id == flight_id) {
            req.priority = new_priority;
            req.attempts += 1;
            self.sort();
        }
    }

    /// Pending request count
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no requests are pending
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when the flight has a pending request
    pub fn contains(&self, flight_id: FlightId) -> bool {
        self.entries.iter().any(|r| r.flight_id == flight_id)
    }

    fn sort(&mut self) {
        // seq is unique, so the order is total
        self.entries
            .sort_unstable_by(|a, b| b.priority.cmp(&a.priority).then(a.seq.cmp(&b.seq)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_head_orders_by_priority_then_arrival() {
        let mut ledger = RequestLedger::new();
        // A and B at priority 5, C at priority 3, arrival order A, B, C
        ledger.insert(1, ResourceNeeds::landing(), 5); // A
        ledger.insert(2, ResourceNeeds::landing(), 5); // B
        ledger.insert(3, ResourceNeeds::landing(), 3); // C

        assert_eq!(ledger.head().unwrap().flight_id, 1);
        ledger.remove(1);
        assert_eq!(ledger.head().unwrap().flight_id, 2);
        ledger.remove(2);
        assert_eq!(ledger.head().unwrap().flight_id, 3);
    }

    #[test]
    fn test_reprioritize_reorders() {
        let mut ledger = RequestLedger::new();
        ledger.insert(1, ResourceNeeds::landing(), 1);
        ledger.insert(2, ResourceNeeds::deplaning(), 1);
        assert_eq!(ledger.head().unwrap().flight_id, 1);

        ledger.reprioritize(2, 4);
        assert_eq!(ledger.head().unwrap().flight_id, 2);
        assert_eq!(ledger.head().unwrap().attempts, 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut ledger = RequestLedger::new();
        ledger.insert(1, ResourceNeeds::takeoff(), 0);
        ledger.remove(1);
        ledger.remove(1);
        assert!(ledger.is_empty());
        assert!(!ledger.contains(1));
    }

    #[test]
    fn test_seq_is_monotonic() {
        let mut ledger = RequestLedger::new();
        let a = ledger.insert(1, ResourceNeeds::landing(), 0);
        ledger.remove(1);
        let b = ledger.insert(2, ResourceNeeds::landing(), 0);
        assert!(b > a);
    }

    proptest! {
        /// The head is always a request of maximal priority, and the oldest
        /// insertion among that priority.
        #[test]
        fn prop_head_is_max_priority_oldest(priorities in prop::collection::vec(0u32..8, 1..32)) {
            let mut ledger = RequestLedger::new();
            for (i, p) in priorities.iter().enumerate() {
                ledger.insert(i as FlightId, ResourceNeeds::landing(), *p);
            }

            let head = ledger.head().unwrap();
            let max_priority = *priorities.iter().max().unwrap();
            prop_assert_eq!(head.priority, max_priority);

            let first_with_max = priorities.iter().position(|p| *p == max_priority).unwrap();
            prop_assert_eq!(head.flight_id, first_with_max as FlightId);
        }
    }
}
