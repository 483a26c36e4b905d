//! Gates and the fixed gate pool.

use serde::{Deserialize, Serialize};

use crate::core::request::{ActorId, GateId};
use crate::core::SchedulerError;

/// A docking position with independent reservation and occupancy.
///
/// `reserved` is the exclusion flag set by the scheduler at grant time;
/// `occupied` only flips once the aircraft has physically docked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gate {
    /// Gate number.
    pub id: GateId,
    /// Claimed by a granted landing.
    pub reserved: bool,
    /// An aircraft is docked.
    pub occupied: bool,
    /// Aircraft the reservation belongs to.
    pub assigned_to: Option<ActorId>,
}

impl Gate {
    fn new(id: GateId) -> Self {
        Self {
            id,
            reserved: false,
            occupied: false,
            assigned_to: None,
        }
    }

    /// Neither reserved nor occupied.
    #[must_use]
    pub const fn is_free(&self) -> bool {
        !self.reserved && !self.occupied
    }
}

/// Fixed array of gates, numbered `1..=len`.
///
/// Carries no locking of its own; callers serialize access.
#[derive(Debug, Clone)]
pub struct GatePool {
    gates: Vec<Gate>,
}

impl GatePool {
    /// Create `count` free gates.
    #[must_use]
    pub fn new(count: usize) -> Self {
        let gates = (1..=count)
            .map(|n| Gate::new(GateId::try_from(n).unwrap_or(GateId::MAX)))
            .collect();
        Self { gates }
    }

    /// Number of gates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// Whether the pool has no gates at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Lookup by gate number.
    #[must_use]
    pub fn gate(&self, id: GateId) -> Option<&Gate> {
        self.gates.iter().find(|g| g.id == id)
    }

    /// All gates in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &Gate> {
        self.gates.iter()
    }

    fn gate_mut(&mut self, id: GateId) -> Result<&mut Gate, SchedulerError> {
        self.gates
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or(SchedulerError::UnknownGate(id))
    }

    /// First unreserved gate in ascending order.
    #[must_use]
    pub fn find_free_gate(&self) -> Option<GateId> {
        self.gates.iter().find(|g| !g.reserved).map(|g| g.id)
    }

    /// Claim `id` for `actor`. Double reservation is an invariant violation.
    pub fn reserve(&mut self, id: GateId, actor: ActorId) -> Result<(), SchedulerError> {
        let gate = self.gate_mut(id)?;
        if gate.reserved {
            return Err(SchedulerError::InvariantViolation(format!(
                "gate {id} already reserved for plane {:?}, requested by plane {actor}",
                gate.assigned_to
            )));
        }
        gate.reserved = true;
        gate.assigned_to = Some(actor);
        Ok(())
    }

    /// Roll back a reservation that never reached docking.
    pub fn unreserve(&mut self, id: GateId) -> Result<(), SchedulerError> {
        let gate = self.gate_mut(id)?;
        if gate.occupied {
            return Err(SchedulerError::InvariantViolation(format!(
                "gate {id} rolled back while occupied"
            )));
        }
        gate.reserved = false;
        gate.assigned_to = None;
        Ok(())
    }

    /// Record that `actor` has docked at its reserved gate.
    pub fn mark_occupied(&mut self, id: GateId, actor: ActorId) -> Result<(), SchedulerError> {
        let gate = self.gate_mut(id)?;
        if !gate.reserved || gate.assigned_to != Some(actor) {
            return Err(SchedulerError::InvariantViolation(format!(
                "plane {actor} docked at gate {id} without holding its reservation"
            )));
        }
        if gate.occupied {
            return Err(SchedulerError::InvariantViolation(format!(
                "gate {id} already occupied"
            )));
        }
        gate.occupied = true;
        Ok(())
    }

    /// Clear both flags after `actor` has taken off from `id`.
    pub fn release_gate(&mut self, id: GateId, actor: ActorId) -> Result<(), SchedulerError> {
        let gate = self.gate_mut(id)?;
        if !gate.reserved || gate.assigned_to != Some(actor) {
            return Err(SchedulerError::InvariantViolation(format!(
                "plane {actor} released gate {id} it does not hold"
            )));
        }
        gate.reserved = false;
        gate.occupied = false;
        gate.assigned_to = None;
        Ok(())
    }

    /// Every gate is neither reserved nor occupied.
    #[must_use]
    pub fn all_free(&self) -> bool {
        self.gates.iter().all(Gate::is_free)
    }

    /// Gates still reserved or occupied.
    #[must_use]
    pub fn busy_gates(&self) -> Vec<GateId> {
        self.gates
            .iter()
            .filter(|g| !g.is_free())
            .map(|g| g.id)
            .collect()
    }
}
