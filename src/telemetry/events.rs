// src/telemetry/events.rs
//! Lock-free simulation event log
//!
//! Bounded MPMC queue of lifecycle and allocation events. Producers (the
//! allocator and flight pipelines) push without locking; the reporter drains
//! in batches. When the queue is full, events are counted as dropped rather
//! than blocking the allocation hot path.
//!
//! Besides reporting, the log doubles as the instrumentation hook for the
//! acquire/release-pairing and partial-holding test properties.

use crate::flight::model::FlightId;
use crossbeam::queue::ArrayQueue;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// What happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SimEventKind {
    FlightCreated,
    ResourcesGranted {
        runway: Option<usize>,
        gate: Option<usize>,
        tower: bool,
    },
    ResourcesReleased {
        runway: Option<usize>,
        gate: Option<usize>,
        tower: bool,
    },
    WentCritical,
    Crashed,
    GoAround,
    Completed,
}

/// One recorded event
#[derive(Debug, Clone, Serialize)]
pub struct SimEvent {
    /// Flight the event belongs to
    pub flight_id: FlightId,

    /// Event payload
    pub kind: SimEventKind,
}

/// Bounded lock-free event log
pub struct EventLog {
    queue: ArrayQueue<SimEvent>,
    push_count: AtomicU64,
    drop_count: AtomicU64,
}

impl EventLog {
    /// Create a log holding up to `capacity` undrained events
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: ArrayQueue::new(capacity),
            push_count: AtomicU64::new(0),
            drop_count: AtomicU64::new(0),
        }
    }

    /// Record an event; drops (and counts) when the queue is full
    pub fn push(&self, flight_id: FlightId, kind: SimEventKind) {
        let event = SimEvent { flight_id, kind };
        match self.queue.push(event) {
            Ok(()) => {
                self.push_count.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                self.drop_count.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Remove and return all currently queued events
    pub fn drain(&self) -> Vec<SimEvent> {
        let mut events = Vec::with_capacity(self.queue.len());
        while let Some(event) = self.queue.pop() {
            events.push(event);
        }
        events
    }

    /// Events currently queued
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True when nothing is queued
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Total events accepted
    pub fn pushed(&self) -> u64 {
        self.push_count.load(Ordering::Relaxed)
    }

    /// Total events dropped because the queue was full
    pub fn dropped(&self) -> u64 {
        self.drop_count.load(Ordering::Relaxed)
    }
}

impl Default for EventLog {
    fn default() -> Self {
        // Roomy enough that drops only happen under pathological backlogs
        Self::new(65_536)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_drain() {
        let log = EventLog::new(16);
        log.push(1, SimEventKind::FlightCreated);
        log.push(1, SimEventKind::Completed);
        assert_eq!(log.len(), 2);

        let events = log.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, SimEventKind::FlightCreated);
        assert_eq!(events[1].kind, SimEventKind::Completed);
        assert!(log.is_empty());
    }

    #[test]
    fn test_full_queue_counts_drops() {
        let log = EventLog::new(1);
        log.push(1, SimEventKind::FlightCreated);
        log.push(2, SimEventKind::FlightCreated);
        assert_eq!(log.pushed(), 1);
        assert_eq!(log.dropped(), 1);
    }

    #[test]
    fn test_grant_event_payload() {
        let log = EventLog::new(4);
        log.push(
            3,
            SimEventKind::ResourcesGranted {
                runway: Some(0),
                gate: None,
                tower: true,
            },
        );
        let events = log.drain();
        match &events[0].kind {
            SimEventKind::ResourcesGranted { runway, gate, tower } => {
                assert_eq!(*runway, Some(0));
                assert_eq!(*gate, None);
                assert!(*tower);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
