//! Two-tier request queue and the selection policy.
//!
//! The *incoming* tier holds freshly submitted requests; the *waiting* tier
//! holds requests already evaluated (or drained) and not yet granted. Arrival
//! order is kept within each tier. The only reordering is an explicit
//! promotion to the front of a tier.

use std::collections::VecDeque;
use std::fmt;

use serde::Serialize;

use crate::core::request::{ActorId, FlightAction, FlightRequest, RequestId};

/// Which tier holds a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Never evaluated.
    Incoming,
    /// Evaluated (or drained) and still pending.
    Waiting,
}

/// The request chosen for evaluation, left in place inside its tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// Request identifier.
    pub id: RequestId,
    /// Requesting aircraft.
    pub actor: ActorId,
    /// Requested operation.
    pub action: FlightAction,
    /// Tier the request currently sits in.
    pub tier: Tier,
}

impl Candidate {
    fn of(req: &FlightRequest, tier: Tier) -> Self {
        Self {
            id: req.id(),
            actor: req.actor(),
            action: req.action(),
            tier,
        }
    }
}

/// Ordered holding area for pending flight requests.
#[derive(Debug, Default)]
pub struct RequestQueue {
    incoming: VecDeque<FlightRequest>,
    waiting: VecDeque<FlightRequest>,
}

impl RequestQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a freshly submitted request to the incoming tier.
    pub fn enqueue_incoming(&mut self, request: FlightRequest) {
        self.incoming.push_back(request);
    }

    /// Pending requests across both tiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.incoming.len() + self.waiting.len()
    }

    /// Both tiers are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.incoming.is_empty() && self.waiting.is_empty()
    }

    /// Requests in the incoming tier.
    #[must_use]
    pub fn incoming_len(&self) -> usize {
        self.incoming.len()
    }

    /// Requests in the waiting tier.
    #[must_use]
    pub fn waiting_len(&self) -> usize {
        self.waiting.len()
    }

    fn tier(&self, tier: Tier) -> &VecDeque<FlightRequest> {
        match tier {
            Tier::Incoming => &self.incoming,
            Tier::Waiting => &self.waiting,
        }
    }

    fn tier_mut(&mut self, tier: Tier) -> &mut VecDeque<FlightRequest> {
        match tier {
            Tier::Incoming => &mut self.incoming,
            Tier::Waiting => &mut self.waiting,
        }
    }

    fn locate(&self, id: RequestId) -> Option<(Tier, usize)> {
        [Tier::Incoming, Tier::Waiting].into_iter().find_map(|tier| {
            self.tier(tier)
                .iter()
                .position(|r| r.id() == id)
                .map(|idx| (tier, idx))
        })
    }

    fn first_matching(
        &self,
        order: [Tier; 2],
        pred: impl Fn(&FlightRequest) -> bool,
    ) -> Option<Candidate> {
        order.into_iter().find_map(|tier| {
            self.tier(tier)
                .iter()
                .find(|r| pred(r))
                .map(|r| Candidate::of(r, tier))
        })
    }

    /// Tier currently holding `id`.
    #[must_use]
    pub fn tier_of(&self, id: RequestId) -> Option<Tier> {
        self.locate(id).map(|(tier, _)| tier)
    }

    /// Mutable access to a pending request.
    pub fn get_mut(&mut self, id: RequestId) -> Option<&mut FlightRequest> {
        let (tier, idx) = self.locate(id)?;
        self.tier_mut(tier).get_mut(idx)
    }

    /// Earliest-arriving emergency landing in either tier.
    ///
    /// Both tiers are searched, incoming first; among several emergencies the
    /// one submitted first wins, so emergencies keep arrival order among
    /// themselves.
    #[must_use]
    pub fn find_emergency(&self) -> Option<Candidate> {
        [Tier::Incoming, Tier::Waiting]
            .into_iter()
            .flat_map(move |tier| {
                self.tier(tier)
                    .iter()
                    .filter(|r| r.action().is_emergency())
                    .map(move |r| (r, tier))
            })
            .min_by_key(|(r, _)| (r.arrived_at(), r.id()))
            .map(|(r, tier)| Candidate::of(r, tier))
    }

    /// First takeoff, waiting tier searched before incoming tier.
    #[must_use]
    pub fn first_takeoff(&self) -> Option<Candidate> {
        self.first_matching([Tier::Waiting, Tier::Incoming], |r| {
            r.action() == FlightAction::Takeoff
        })
    }

    /// Pick the request to evaluate next without removing it.
    ///
    /// 1. the earliest emergency landing from either tier, promoted to the front of its tier;
    /// 2. otherwise the front of the waiting tier;
    /// 3. otherwise the front of the incoming tier.
    pub fn select_next(&mut self) -> Option<Candidate> {
        if let Some(emergency) = self.find_emergency() {
            self.promote_to_front(emergency.id, emergency.tier);
            return Some(emergency);
        }
        if let Some(front) = self.waiting.front() {
            return Some(Candidate::of(front, Tier::Waiting));
        }
        self.incoming
            .front()
            .map(|front| Candidate::of(front, Tier::Incoming))
    }

    /// Move `id` from the incoming tier to the back of the waiting tier.
    ///
    /// Returns `false` if the request was not in the incoming tier.
    pub fn demote(&mut self, id: RequestId) -> bool {
        let Some(idx) = self.incoming.iter().position(|r| r.id() == id) else {
            return false;
        };
        match self.incoming.remove(idx) {
            Some(request) => {
                self.waiting.push_back(request);
                true
            }
            None => false,
        }
    }

    /// Demote every incoming request, keeping arrival order. Returns the moved ids.
    pub fn drain_incoming(&mut self) -> Vec<RequestId> {
        let moved: Vec<_> = self.incoming.iter().map(FlightRequest::id).collect();
        self.waiting.extend(self.incoming.drain(..));
        moved
    }

    /// Reinsert `id` at position 0 of `tier`. Returns `false` if it is not there.
    pub fn promote_to_front(&mut self, id: RequestId, tier: Tier) -> bool {
        let queue = self.tier_mut(tier);
        let Some(idx) = queue.iter().position(|r| r.id() == id) else {
            return false;
        };
        if idx > 0 {
            if let Some(request) = queue.remove(idx) {
                queue.push_front(request);
            }
        }
        true
    }

    /// Remove `id` from whichever tier holds it.
    pub fn remove(&mut self, id: RequestId) -> Option<FlightRequest> {
        let (tier, idx) = self.locate(id)?;
        self.tier_mut(tier).remove(idx)
    }

    /// Drop every pending request, closing their grant signals. Returns how many.
    pub fn clear(&mut self) -> usize {
        let dropped = self.len();
        self.incoming.clear();
        self.waiting.clear();
        dropped
    }

    /// Point-in-time view of both tiers.
    #[must_use]
    pub fn snapshot(&self) -> QueueSnapshot {
        let view = |q: &VecDeque<FlightRequest>| -> Vec<QueuedFlight> {
            q.iter()
                .map(|r| QueuedFlight {
                    actor: r.actor(),
                    action: r.action(),
                })
                .collect()
        };
        QueueSnapshot {
            incoming: view(&self.incoming),
            waiting: view(&self.waiting),
        }
    }
}

/// Actor and action of one queued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueuedFlight {
    /// Requesting aircraft.
    pub actor: ActorId,
    /// Requested operation.
    pub action: FlightAction,
}

/// Copy of both tiers, front first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueueSnapshot {
    /// Incoming tier.
    pub incoming: Vec<QueuedFlight>,
    /// Waiting tier.
    pub waiting: Vec<QueuedFlight>,
}

impl QueueSnapshot {
    /// Actors in the waiting tier, front first.
    #[must_use]
    pub fn waiting_actors(&self) -> Vec<ActorId> {
        self.waiting.iter().map(|f| f.actor).collect()
    }
}

impl fmt::Display for QueueSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "incoming(size={}):", self.incoming.len())?;
        for flight in &self.incoming {
            write!(f, " {}({})", flight.actor, flight.action)?;
        }
        write!(f, " || waiting(size={}):", self.waiting.len())?;
        for flight in &self.waiting {
            write!(f, " {}({})", flight.actor, flight.action)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::request::GrantReceiver;

    struct Fixture {
        queue: RequestQueue,
        next_id: RequestId,
        _receivers: Vec<GrantReceiver>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                queue: RequestQueue::new(),
                next_id: 1,
                _receivers: Vec::new(),
            }
        }

        fn submit(&mut self, actor: ActorId, action: FlightAction) -> RequestId {
            let id = self.next_id;
            self.next_id += 1;
            let (req, rx) = FlightRequest::new(id, actor, action);
            self._receivers.push(rx);
            self.queue.enqueue_incoming(req);
            id
        }
    }

    #[test]
    fn test_empty_queue_selects_nothing() {
        let mut q = RequestQueue::new();
        assert!(q.select_next().is_none());
        assert!(q.is_empty());
    }

    #[test]
    fn test_incoming_front_selected_when_waiting_empty() {
        let mut fx = Fixture::new();
        let first = fx.submit(1, FlightAction::Land);
        fx.submit(2, FlightAction::Land);

        let c = fx.queue.select_next().unwrap();
        assert_eq!(c.id, first);
        assert_eq!(c.tier, Tier::Incoming);
        // selection does not remove
        assert_eq!(fx.queue.len(), 2);
    }

    #[test]
    fn test_waiting_front_beats_incoming() {
        let mut fx = Fixture::new();
        let first = fx.submit(1, FlightAction::Land);
        fx.submit(2, FlightAction::Takeoff);
        assert!(fx.queue.demote(first));

        let c = fx.queue.select_next().unwrap();
        assert_eq!(c.actor, 1);
        assert_eq!(c.tier, Tier::Waiting);
    }

    #[test]
    fn test_emergency_in_incoming_selected_and_promoted() {
        let mut fx = Fixture::new();
        fx.submit(1, FlightAction::Land);
        fx.submit(2, FlightAction::Land);
        let emergency = fx.submit(3, FlightAction::EmergencyLand);

        let c = fx.queue.select_next().unwrap();
        assert_eq!(c.id, emergency);
        assert_eq!(c.tier, Tier::Incoming);

        let snap = fx.queue.snapshot();
        let order: Vec<_> = snap.incoming.iter().map(|f| f.actor).collect();
        assert_eq!(order, vec![3, 1, 2]);
    }

    #[test]
    fn test_emergency_in_waiting_overtakes_waiting_front() {
        let mut fx = Fixture::new();
        fx.submit(1, FlightAction::Land);
        fx.submit(2, FlightAction::EmergencyLand);
        fx.queue.drain_incoming();

        let c = fx.queue.select_next().unwrap();
        assert_eq!(c.actor, 2);
        assert_eq!(c.tier, Tier::Waiting);
        assert_eq!(fx.queue.snapshot().waiting_actors(), vec![2, 1]);
    }

    #[test]
    fn test_emergency_search_covers_both_tiers() {
        let mut fx = Fixture::new();
        fx.submit(1, FlightAction::Land);
        fx.queue.drain_incoming();
        fx.submit(2, FlightAction::EmergencyLand);

        let c = fx.queue.find_emergency().unwrap();
        assert_eq!(c.actor, 2);
        assert_eq!(c.tier, Tier::Incoming);
    }

    #[test]
    fn test_earlier_emergency_wins_across_tiers() {
        let mut fx = Fixture::new();
        let first = fx.submit(1, FlightAction::EmergencyLand);
        fx.queue.drain_incoming();
        fx.submit(2, FlightAction::EmergencyLand);

        let c = fx.queue.select_next().unwrap();
        assert_eq!(c.id, first);
        assert_eq!(c.tier, Tier::Waiting);
    }

    #[test]
    fn test_first_takeoff_prefers_waiting_tier() {
        let mut fx = Fixture::new();
        fx.submit(1, FlightAction::Land);
        fx.submit(2, FlightAction::Takeoff);
        fx.queue.drain_incoming();
        fx.submit(3, FlightAction::Takeoff);

        let c = fx.queue.first_takeoff().unwrap();
        assert_eq!(c.actor, 2);
        assert_eq!(c.tier, Tier::Waiting);
    }

    #[test]
    fn test_first_takeoff_falls_back_to_incoming() {
        let mut fx = Fixture::new();
        let land = fx.submit(1, FlightAction::Land);
        fx.queue.demote(land);
        fx.submit(2, FlightAction::Takeoff);

        let c = fx.queue.first_takeoff().unwrap();
        assert_eq!(c.actor, 2);
        assert_eq!(c.tier, Tier::Incoming);
    }

    #[test]
    fn test_demote_preserves_arrival_order() {
        let mut fx = Fixture::new();
        let a = fx.submit(1, FlightAction::Land);
        let b = fx.submit(2, FlightAction::Land);
        assert!(fx.queue.demote(a));
        assert!(fx.queue.demote(b));
        assert!(!fx.queue.demote(b));
        assert_eq!(fx.queue.snapshot().waiting_actors(), vec![1, 2]);
        assert_eq!(fx.queue.incoming_len(), 0);
    }

    #[test]
    fn test_drain_incoming_appends_after_waiting() {
        let mut fx = Fixture::new();
        let a = fx.submit(1, FlightAction::Land);
        fx.queue.demote(a);
        let b = fx.submit(2, FlightAction::Land);
        let c = fx.submit(3, FlightAction::Takeoff);

        assert_eq!(fx.queue.drain_incoming(), vec![b, c]);
        assert_eq!(fx.queue.snapshot().waiting_actors(), vec![1, 2, 3]);
    }

    #[test]
    fn test_remove_from_either_tier() {
        let mut fx = Fixture::new();
        let a = fx.submit(1, FlightAction::Land);
        let b = fx.submit(2, FlightAction::Land);
        fx.queue.demote(a);

        assert_eq!(fx.queue.remove(a).unwrap().actor(), 1);
        assert_eq!(fx.queue.remove(b).unwrap().actor(), 2);
        assert!(fx.queue.remove(a).is_none());
        assert!(fx.queue.is_empty());
    }

    #[test]
    fn test_promote_to_front_of_named_tier_only() {
        let mut fx = Fixture::new();
        fx.submit(1, FlightAction::Land);
        let b = fx.submit(2, FlightAction::Land);
        assert!(!fx.queue.promote_to_front(b, Tier::Waiting));
        assert!(fx.queue.promote_to_front(b, Tier::Incoming));
        assert_eq!(fx.queue.select_next().unwrap().actor, 2);
    }

    #[test]
    fn test_snapshot_display() {
        let mut fx = Fixture::new();
        let a = fx.submit(1, FlightAction::Land);
        fx.queue.demote(a);
        fx.submit(2, FlightAction::Takeoff);
        assert_eq!(
            fx.queue.snapshot().to_string(),
            "incoming(size=1): 2(Takeoff) || waiting(size=1): 1(Landing)"
        );
    }
}
