//! One scheduling step: SELECT, EVALUATE, then GRANT or DEFER.
//!
//! The arbitrator is the only writer of gate reservations and the only
//! acquirer of the runway. Every allocation decision goes through
//! [`Arbitrator::step`], so checking availability and committing it cannot
//! interleave with another decision.

use std::sync::Arc;

use crate::core::airfield::{record, AirfieldState, SharedSink};
use crate::core::report::{build_flight_event, EventKind};
use crate::core::request::{ActorId, FlightAction, FlightRequest, GateId, GrantedFlight, RequestId};
use crate::core::request_queue::{Candidate, Tier};
use crate::core::SchedulerError;

/// Result of a single scheduling step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Both tiers were empty.
    Idle,
    /// Resources committed and the owning actor woken.
    Granted(GrantedFlight),
    /// Resources unavailable; the request stays queued.
    Deferred(Candidate),
    /// The runway acquire was cancelled; nothing changed.
    Interrupted(Candidate),
}

/// Allocation policy and bookkeeping for the scheduler loop.
pub struct Arbitrator {
    state: Arc<AirfieldState>,
    sink: Option<SharedSink>,
    drain_incoming: bool,
    takeoff_priority_logged: bool,
    emergency_logged: Option<RequestId>,
    landings_granted: usize,
    takeoffs_granted: usize,
}

impl Arbitrator {
    pub(crate) fn new(
        state: Arc<AirfieldState>,
        sink: Option<SharedSink>,
        drain_incoming: bool,
    ) -> Self {
        Self {
            state,
            sink,
            drain_incoming,
            takeoff_priority_logged: false,
            emergency_logged: None,
            landings_granted: 0,
            takeoffs_granted: 0,
        }
    }

    /// Landing-class grants issued so far.
    #[must_use]
    pub const fn landings_granted(&self) -> usize {
        self.landings_granted
    }

    /// Takeoff grants issued so far.
    #[must_use]
    pub const fn takeoffs_granted(&self) -> usize {
        self.takeoffs_granted
    }

    /// Run one SELECT → EVALUATE → GRANT/DEFER step.
    ///
    /// Errors are invariant violations or an undeliverable grant; both abort
    /// the run.
    pub fn step(&mut self) -> Result<StepOutcome, SchedulerError> {
        let Some(candidate) = self.select() else {
            return Ok(StepOutcome::Idle);
        };

        let outcome = if self.resources_available(candidate.action) {
            self.grant(candidate)?
        } else {
            self.defer(candidate);
            StepOutcome::Deferred(candidate)
        };

        if self.drain_incoming && !matches!(outcome, StepOutcome::Interrupted(_)) {
            self.drain();
        }
        Ok(outcome)
    }

    fn select(&mut self) -> Option<Candidate> {
        let mut queue = self.state.queue.lock();
        tracing::debug!("queue dump (start): {}", queue.snapshot());

        let mut candidate = queue.select_next()?;
        if candidate.action.is_emergency() && self.emergency_logged != Some(candidate.id) {
            tracing::warn!(
                "EMERGENCY LANDING detected in {:?} tier, plane {} will be the next plane to land",
                candidate.tier,
                candidate.actor
            );
            self.emergency_logged = Some(candidate.id);
        }

        // takeoffs never need a gate; landings cannot be granted anyway
        let gate_free = self.state.gates.lock().find_free_gate().is_some();
        if gate_free {
            self.takeoff_priority_logged = false;
        } else {
            if !self.takeoff_priority_logged {
                tracing::info!("no free gates available, temporarily prioritizing takeoffs");
                self.takeoff_priority_logged = true;
            }
            if let Some(takeoff) = queue.first_takeoff() {
                candidate = takeoff;
            }
        }

        tracing::debug!(
            "queue dump (after select, plane {}): {}",
            candidate.actor,
            queue.snapshot()
        );
        Some(candidate)
    }

    fn resources_available(&self, action: FlightAction) -> bool {
        self.state.runway.is_available()
            && (!action.needs_gate() || self.state.gates.lock().find_free_gate().is_some())
    }

    fn grant(&mut self, candidate: Candidate) -> Result<StepOutcome, SchedulerError> {
        // gate first, so a plane is never cleared onto the runway without one
        let gate = if candidate.action.needs_gate() {
            let mut gates = self.state.gates.lock();
            let gate = gates.find_free_gate().ok_or_else(|| {
                SchedulerError::InvariantViolation(format!(
                    "free gate vanished before plane {} could reserve it",
                    candidate.actor
                ))
            })?;
            gates.reserve(gate, candidate.actor)?;
            Some(gate)
        } else {
            None
        };

        match self.state.runway.acquire(candidate.actor) {
            Ok(()) => {}
            Err(SchedulerError::Interrupted) => {
                if let Some(gate) = gate {
                    self.state.gates.lock().unreserve(gate)?;
                }
                tracing::warn!(
                    "runway acquire for plane {} interrupted, request left queued",
                    candidate.actor
                );
                return Ok(StepOutcome::Interrupted(candidate));
            }
            Err(e) => return Err(e),
        }

        let Some(request) = self.state.queue.lock().remove(candidate.id) else {
            self.rollback(candidate.actor, gate)?;
            return Err(SchedulerError::InvariantViolation(format!(
                "request {} of plane {} left the queue before its grant",
                candidate.id, candidate.actor
            )));
        };

        let granted = match request.grant(gate) {
            Ok(granted) => granted,
            Err(e) => {
                self.rollback(candidate.actor, gate)?;
                tracing::error!("{}", e);
                return Err(e);
            }
        };

        if granted.action.needs_gate() {
            self.landings_granted += 1;
            tracing::info!(
                "{} permission granted to plane {}, assigned gate {}",
                granted.action,
                granted.actor,
                gate.unwrap_or_default()
            );
        } else {
            self.takeoffs_granted += 1;
            tracing::info!("{} permission granted to plane {}", granted.action, granted.actor);
        }
        record(
            self.sink.as_ref(),
            build_flight_event(
                granted.id,
                granted.actor,
                granted.action,
                EventKind::Granted,
                granted.gate,
                Some(granted.waited),
            ),
        );
        Ok(StepOutcome::Granted(granted))
    }

    fn rollback(&self, actor: ActorId, gate: Option<GateId>) -> Result<(), SchedulerError> {
        self.state.runway.release(actor)?;
        if let Some(gate) = gate {
            self.state.gates.lock().unreserve(gate)?;
        }
        Ok(())
    }

    fn defer(&self, candidate: Candidate) {
        let mut queue = self.state.queue.lock();
        let first_denial = queue
            .get_mut(candidate.id)
            .is_some_and(FlightRequest::mark_deferred);
        if first_denial {
            tracing::info!(
                "{} permission denied to plane {}, runway or gates not available",
                candidate.action,
                candidate.actor
            );
            record(
                self.sink.as_ref(),
                build_flight_event(
                    candidate.id,
                    candidate.actor,
                    candidate.action,
                    EventKind::Deferred,
                    None,
                    None,
                ),
            );
        }
        if candidate.tier == Tier::Incoming {
            queue.demote(candidate.id);
        }
    }

    fn drain(&self) {
        let mut queue = self.state.queue.lock();
        for id in queue.drain_incoming() {
            if let Some(request) = queue.get_mut(id) {
                if request.mark_moved() {
                    tracing::debug!(
                        "plane {} moved to waiting queue, other planes are being processed",
                        request.actor()
                    );
                }
            }
        }
    }
}
