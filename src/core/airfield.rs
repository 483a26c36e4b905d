//! Shared airfield resources and the actor-facing handle.
//!
//! Actors never touch the queue or the resources directly. They submit
//! requests through the scheduler mailbox and release what they were granted
//! through [`AirfieldHandle`].

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;
use parking_lot::Mutex;
use serde::Serialize;

use crate::core::gate::{Gate, GatePool};
use crate::core::report::{build_flight_event, EventKind, FlightEvent, ReportSink};
use crate::core::request::{ActorId, FlightAction, FlightRequest, GateId, GrantReceiver};
use crate::core::request_queue::{QueueSnapshot, RequestQueue};
use crate::core::runway::RunwayResource;
use crate::core::SchedulerError;

/// Report sink shared between the scheduler and the handles.
pub(crate) type SharedSink = Arc<Mutex<Box<dyn ReportSink>>>;

pub(crate) fn record(sink: Option<&SharedSink>, event: FlightEvent) {
    if let Some(sink) = sink {
        sink.lock().record(event);
    }
}

/// Messages delivered to the scheduler mailbox.
#[derive(Debug)]
pub(crate) enum Signal {
    /// A new request to append to the incoming tier.
    Submit(Submission),
    /// The runway or a gate was released.
    ResourcesReleased,
    /// An actor call broke a resource invariant; the run must abort.
    Fatal(String),
    /// Stop the scheduler loop.
    Shutdown,
}

/// A request travelling through the mailbox.
///
/// Counted as pending from creation until it is dropped, whether it was
/// absorbed into the queue or discarded with an undelivered message.
#[derive(Debug)]
pub(crate) struct Submission {
    request: Option<FlightRequest>,
    in_flight: Arc<AtomicUsize>,
}

impl Submission {
    fn new(request: FlightRequest, in_flight: Arc<AtomicUsize>) -> Self {
        in_flight.fetch_add(1, Ordering::AcqRel);
        Self {
            request: Some(request),
            in_flight,
        }
    }

    /// Take the request out; the submission still counts until dropped.
    pub(crate) fn take(&mut self) -> Option<FlightRequest> {
        self.request.take()
    }
}

impl Drop for Submission {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Resource and queue state. Lock order: `queue` before `gates`.
#[derive(Debug)]
pub(crate) struct AirfieldState {
    pub(crate) runway: RunwayResource,
    pub(crate) gates: Mutex<GatePool>,
    pub(crate) queue: Mutex<RequestQueue>,
    /// Submissions sent but not yet moved into the incoming tier.
    pub(crate) unabsorbed: Arc<AtomicUsize>,
}

impl AirfieldState {
    pub(crate) fn new(gate_count: usize) -> Self {
        Self {
            runway: RunwayResource::new(),
            gates: Mutex::new(GatePool::new(gate_count)),
            queue: Mutex::new(RequestQueue::new()),
            unabsorbed: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn sanity_check(&self) -> SanityReport {
        let queue = self.queue.lock();
        let gates = self.gates.lock();
        SanityReport {
            runway_free: self.runway.is_available(),
            busy_gates: gates.busy_gates(),
            pending_requests: queue.len() + self.unabsorbed.load(Ordering::Acquire),
        }
    }
}

/// Quiescence check result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SanityReport {
    /// Nobody holds the runway.
    pub runway_free: bool,
    /// Gates still reserved or occupied.
    pub busy_gates: Vec<GateId>,
    /// Requests in either tier or still in the mailbox.
    pub pending_requests: usize,
}

impl SanityReport {
    /// Runway free, every gate free, no pending request.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.runway_free && self.busy_gates.is_empty() && self.pending_requests == 0
    }
}

impl fmt::Display for SanityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "runway {}, {} pending request(s), ",
            if self.runway_free { "free" } else { "occupied" },
            self.pending_requests
        )?;
        if self.busy_gates.is_empty() {
            write!(f, "all gates free")
        } else {
            write!(f, "busy gates {:?}", self.busy_gates)
        }
    }
}

/// Cloneable handle through which aircraft talk to the scheduler.
#[derive(Clone)]
pub struct AirfieldHandle {
    state: Arc<AirfieldState>,
    mailbox: Sender<Signal>,
    next_request: Arc<AtomicU64>,
    sink: Option<SharedSink>,
}

impl fmt::Debug for AirfieldHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AirfieldHandle")
            .field("state", &self.state)
            .field("reporting", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}

impl AirfieldHandle {
    pub(crate) fn new(
        state: Arc<AirfieldState>,
        mailbox: Sender<Signal>,
        sink: Option<SharedSink>,
    ) -> Self {
        Self {
            state,
            mailbox,
            next_request: Arc::new(AtomicU64::new(1)),
            sink,
        }
    }

    /// Submit a runway request for `actor` and get its private grant receiver.
    ///
    /// An actor keeps at most one request pending at a time.
    pub fn request(
        &self,
        actor: ActorId,
        action: FlightAction,
    ) -> Result<GrantReceiver, SchedulerError> {
        let id = self.next_request.fetch_add(1, Ordering::Relaxed);
        let (request, receiver) = FlightRequest::new(id, actor, action);

        if action.is_emergency() {
            tracing::warn!("plane {} requesting EMERGENCY landing", actor);
        } else {
            tracing::info!("plane {} requesting {}", actor, action);
        }

        let submission = Submission::new(request, Arc::clone(&self.state.unabsorbed));
        // held across the send so the submission is recorded before its grant
        let mut sink = self.sink.as_ref().map(|sink| sink.lock());
        if self.mailbox.send(Signal::Submit(submission)).is_err() {
            return Err(SchedulerError::SchedulerStopped);
        }
        if let Some(sink) = sink.as_mut() {
            sink.record(build_flight_event(
                id,
                actor,
                action,
                EventKind::Submitted,
                None,
                None,
            ));
        }
        Ok(receiver)
    }

    /// Give the runway back after a landing roll-out or takeoff roll.
    pub fn release_runway(&self, actor: ActorId) -> Result<(), SchedulerError> {
        self.state
            .runway
            .release(actor)
            .inspect_err(|e| self.abort_on_violation("runway release", actor, e))?;
        self.notify_released();
        Ok(())
    }

    /// Mark the reserved gate occupied once `actor` has docked.
    pub fn dock(&self, actor: ActorId, gate: GateId) -> Result<(), SchedulerError> {
        self.state
            .gates
            .lock()
            .mark_occupied(gate, actor)
            .inspect_err(|e| self.abort_on_violation("docking", actor, e))?;
        tracing::info!("plane {} docked at gate {}", actor, gate);
        Ok(())
    }

    /// Free `gate` after `actor` has taken off from it.
    pub fn release_gate(&self, actor: ActorId, gate: GateId) -> Result<(), SchedulerError> {
        self.state
            .gates
            .lock()
            .release_gate(gate, actor)
            .inspect_err(|e| self.abort_on_violation("gate release", actor, e))?;
        tracing::debug!("gate {} released by plane {}", gate, actor);
        self.notify_released();
        Ok(())
    }

    /// Log a failed actor call; a broken invariant also aborts the run.
    fn abort_on_violation(&self, what: &str, actor: ActorId, err: &SchedulerError) {
        tracing::error!("{} by plane {} failed: {}", what, actor, err);
        if let SchedulerError::InvariantViolation(reason) = err {
            let _ = self.mailbox.send(Signal::Fatal(reason.clone()));
        }
    }

    fn notify_released(&self) {
        // a stopped scheduler has nothing left to wake
        let _ = self.mailbox.send(Signal::ResourcesReleased);
    }

    /// Both tiers empty, runway free, every gate free.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.sanity_check().is_clean()
    }

    /// Detailed quiescence report.
    #[must_use]
    pub fn sanity_check(&self) -> SanityReport {
        self.state.sanity_check()
    }

    /// Copy of both queue tiers.
    #[must_use]
    pub fn queue_snapshot(&self) -> QueueSnapshot {
        self.state.queue.lock().snapshot()
    }

    /// Current state of one gate.
    #[must_use]
    pub fn gate(&self, id: GateId) -> Option<Gate> {
        self.state.gates.lock().gate(id).cloned()
    }

    /// Aircraft currently holding the runway.
    #[must_use]
    pub fn runway_holder(&self) -> Option<ActorId> {
        self.state.runway.holder()
    }

    /// Interrupt the scheduler: blocked acquires fail and the loop exits.
    pub fn shutdown(&self) {
        tracing::info!("airfield shutdown requested");
        self.state.runway.shutdown();
        let _ = self.mailbox.send(Signal::Shutdown);
    }
}
