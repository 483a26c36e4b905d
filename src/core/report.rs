//! Reporting sink implementations.
//!
//! The scheduler calls into an injected [`ReportSink`]; statistics are derived
//! from the recorded events by the caller, never kept as scheduler state.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;

use crate::core::request::{ActorId, FlightAction, GateId, RequestId};
use crate::util::clock::now_ms;

/// What happened to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Request entered the scheduler mailbox.
    Submitted,
    /// Request was evaluated and denied for the first time.
    Deferred,
    /// Resources were committed and the actor woken.
    Granted,
}

/// Report event structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlightEvent {
    /// Request identifier.
    pub request: RequestId,
    /// Requesting aircraft.
    pub actor: ActorId,
    /// Requested operation.
    pub action: FlightAction,
    /// Event kind.
    pub kind: EventKind,
    /// Gate assigned at grant time.
    pub gate: Option<GateId>,
    /// Submission-to-grant wait, set on grants.
    pub waited_ms: Option<u128>,
    /// Timestamp milliseconds.
    pub at_ms: u128,
}

/// Report sink abstraction.
pub trait ReportSink: Send {
    /// Record a scheduler event.
    fn record(&mut self, event: FlightEvent);
}

/// In-memory report sink with a bounded buffer.
///
/// Clones share the same buffer, so a caller can keep one clone for reading
/// after handing another to the scheduler.
#[derive(Debug, Clone)]
pub struct InMemoryReportSink {
    events: Arc<Mutex<VecDeque<FlightEvent>>>,
    max_events: usize,
}

impl InMemoryReportSink {
    /// Create a new in-memory sink with a bounded buffer.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::with_capacity(max_events.min(1024)))),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    #[must_use]
    pub fn events(&self) -> Vec<FlightEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Granted events only, in grant order.
    #[must_use]
    pub fn grants(&self) -> Vec<FlightEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.kind == EventKind::Granted)
            .cloned()
            .collect()
    }
}

impl ReportSink for InMemoryReportSink {
    fn record(&mut self, event: FlightEvent) {
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event);
    }
}

/// Helper to build a report event stamped with the current time.
#[must_use]
pub fn build_flight_event(
    request: RequestId,
    actor: ActorId,
    action: FlightAction,
    kind: EventKind,
    gate: Option<GateId>,
    waited: Option<Duration>,
) -> FlightEvent {
    FlightEvent {
        request,
        actor,
        action,
        kind,
        gate,
        waited_ms: waited.map(|w| w.as_millis()),
        at_ms: now_ms(),
    }
}

/// End-of-run figures derived from granted events.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStatistics {
    /// Landing-class grants.
    pub landings: usize,
    /// Takeoff grants.
    pub takeoffs: usize,
    /// Mean submission-to-grant wait.
    pub average_wait_ms: f64,
    /// Longest wait.
    pub max_wait_ms: u128,
    /// Shortest wait that was not zero.
    pub min_nonzero_wait_ms: Option<u128>,
}

impl RunStatistics {
    /// Aggregate over the granted events in `events`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_events(events: &[FlightEvent]) -> Self {
        let grants: Vec<_> = events
            .iter()
            .filter(|e| e.kind == EventKind::Granted)
            .collect();
        let landings = grants.iter().filter(|e| e.action.needs_gate()).count();
        let waits: Vec<u128> = grants.iter().map(|e| e.waited_ms.unwrap_or(0)).collect();

        let average_wait_ms = if waits.is_empty() {
            0.0
        } else {
            waits.iter().sum::<u128>() as f64 / waits.len() as f64
        };

        Self {
            landings,
            takeoffs: grants.len() - landings,
            average_wait_ms,
            max_wait_ms: waits.iter().copied().max().unwrap_or(0),
            min_nonzero_wait_ms: waits.iter().copied().filter(|w| *w > 0).min(),
        }
    }
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "landed={} took_off={} avg_wait={:.2}ms max_wait={}ms min_nonzero_wait=",
            self.landings, self.takeoffs, self.average_wait_ms, self.max_wait_ms
        )?;
        match self.min_nonzero_wait_ms {
            Some(min) => write!(f, "{min}ms"),
            None => write!(f, "n/a"),
        }
    }
}
