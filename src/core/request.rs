//! Flight requests, actions and the point-to-point grant signal.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::core::SchedulerError;

/// Identity of a requesting aircraft (its plane number).
pub type ActorId = u32;
/// Unique identifier of one submitted request.
pub type RequestId = u64;
/// Gate number; gates are numbered from 1.
pub type GateId = u32;

/// Runway operation an aircraft asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightAction {
    /// Normal landing; needs the runway and a gate.
    Land,
    /// Emergency landing; needs the runway and a gate, overtakes normal traffic.
    EmergencyLand,
    /// Takeoff; needs the runway only.
    Takeoff,
}

impl FlightAction {
    /// Landing-class actions need a gate in addition to the runway.
    #[must_use]
    pub const fn needs_gate(self) -> bool {
        matches!(self, Self::Land | Self::EmergencyLand)
    }

    /// Whether this action is promoted ahead of everything else.
    #[must_use]
    pub const fn is_emergency(self) -> bool {
        matches!(self, Self::EmergencyLand)
    }
}

impl fmt::Display for FlightAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Land => write!(f, "Landing"),
            Self::EmergencyLand => write!(f, "Emergency Landing"),
            Self::Takeoff => write!(f, "Takeoff"),
        }
    }
}

/// Payload delivered to exactly one actor when its request is granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// Assigned gate; present iff the request was landing-class.
    pub gate: Option<GateId>,
}

/// One actor's pending need for the runway (and possibly a gate).
///
/// Owned by the request queue from submission until it is granted, at which
/// point it is consumed by [`FlightRequest::grant`].
#[derive(Debug)]
pub struct FlightRequest {
    id: RequestId,
    actor: ActorId,
    action: FlightAction,
    arrived_at: Instant,
    deferred_logged: bool,
    moved_logged: bool,
    signal: oneshot::Sender<Grant>,
}

impl FlightRequest {
    /// Create a request and the receiving end its actor waits on.
    #[must_use]
    pub fn new(id: RequestId, actor: ActorId, action: FlightAction) -> (Self, GrantReceiver) {
        let (tx, rx) = oneshot::channel();
        let request = Self {
            id,
            actor,
            action,
            arrived_at: Instant::now(),
            deferred_logged: false,
            moved_logged: false,
            signal: tx,
        };
        (request, GrantReceiver { actor, rx })
    }

    /// Request identifier.
    #[must_use]
    pub const fn id(&self) -> RequestId {
        self.id
    }

    /// Requesting aircraft.
    #[must_use]
    pub const fn actor(&self) -> ActorId {
        self.actor
    }

    /// Requested runway operation.
    #[must_use]
    pub const fn action(&self) -> FlightAction {
        self.action
    }

    /// When the request was submitted.
    #[must_use]
    pub const fn arrived_at(&self) -> Instant {
        self.arrived_at
    }

    /// Marks the first denial; returns `true` only the first time.
    pub fn mark_deferred(&mut self) -> bool {
        !std::mem::replace(&mut self.deferred_logged, true)
    }

    /// Marks the first drain into the waiting tier; returns `true` only the first time.
    pub fn mark_moved(&mut self) -> bool {
        !std::mem::replace(&mut self.moved_logged, true)
    }

    /// Whether the request has been denied at least once.
    #[must_use]
    pub const fn was_deferred(&self) -> bool {
        self.deferred_logged
    }

    /// Consume the request and wake its actor.
    ///
    /// On failure the actor is gone and the caller still owns the resources
    /// it committed for this grant.
    pub fn grant(self, gate: Option<GateId>) -> Result<GrantedFlight, SchedulerError> {
        let granted_at = Instant::now();
        let granted = GrantedFlight {
            id: self.id,
            actor: self.actor,
            action: self.action,
            gate,
            waited: granted_at.saturating_duration_since(self.arrived_at),
        };
        self.signal
            .send(Grant { gate })
            .map_err(|_| SchedulerError::GrantUndeliverable(self.actor))?;
        Ok(granted)
    }
}

/// Record of a delivered grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrantedFlight {
    /// Request identifier.
    pub id: RequestId,
    /// Aircraft that was woken.
    pub actor: ActorId,
    /// Granted operation.
    pub action: FlightAction,
    /// Gate reserved for a landing.
    pub gate: Option<GateId>,
    /// Time between submission and grant.
    pub waited: Duration,
}

/// Per-request wait handle held by the submitting actor.
#[derive(Debug)]
pub struct GrantReceiver {
    actor: ActorId,
    rx: oneshot::Receiver<Grant>,
}

impl GrantReceiver {
    /// Aircraft this receiver belongs to.
    #[must_use]
    pub const fn actor(&self) -> ActorId {
        self.actor
    }

    /// Wait asynchronously for the grant.
    pub async fn wait(self) -> Result<Grant, SchedulerError> {
        self.rx.await.map_err(|_| SchedulerError::SchedulerStopped)
    }

    /// Block the current thread until the grant arrives.
    ///
    /// Must not be called from inside an async runtime.
    pub fn blocking_wait(self) -> Result<Grant, SchedulerError> {
        self.rx
            .blocking_recv()
            .map_err(|_| SchedulerError::SchedulerStopped)
    }

    /// Non-blocking check; returns the receiver back if nothing arrived yet.
    pub fn try_wait(mut self) -> Result<Result<Grant, Self>, SchedulerError> {
        match self.rx.try_recv() {
            Ok(grant) => Ok(Ok(grant)),
            Err(oneshot::error::TryRecvError::Empty) => Ok(Err(self)),
            Err(oneshot::error::TryRecvError::Closed) => Err(SchedulerError::SchedulerStopped),
        }
    }
}
