//! Single runway token.
//!
//! Held by exactly one aircraft from the moment the scheduler grants it until
//! that aircraft finishes its landing roll-out or takeoff roll and releases it.

use parking_lot::{Condvar, Mutex};

use crate::core::request::ActorId;
use crate::core::SchedulerError;

/// Lock-protected token state, paired with the release condvar.
#[derive(Debug, Default)]
struct RunwayState {
    holder: Option<ActorId>,
    shutdown: bool,
}

/// Binary mutual-exclusion resource for landing and takeoff.
#[derive(Debug, Default)]
pub struct RunwayResource {
    state: Mutex<RunwayState>,
    released: Condvar,
}

impl RunwayResource {
    /// Create a free runway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until the runway is free, then hand it to `holder`.
    ///
    /// Returns [`SchedulerError::Interrupted`] once [`RunwayResource::shutdown`]
    /// has been called; the token is left untouched in that case.
    pub fn acquire(&self, holder: ActorId) -> Result<(), SchedulerError> {
        let mut state = self.state.lock();
        while state.holder.is_some() && !state.shutdown {
            self.released.wait(&mut state);
        }
        if state.shutdown {
            return Err(SchedulerError::Interrupted);
        }
        state.holder = Some(holder);
        tracing::trace!("runway acquired for plane {}", holder);
        Ok(())
    }

    /// Take the runway for `holder` only if it is free right now.
    pub fn try_acquire(&self, holder: ActorId) -> bool {
        let mut state = self.state.lock();
        if state.holder.is_some() || state.shutdown {
            return false;
        }
        state.holder = Some(holder);
        true
    }

    /// Release the runway held by `holder`.
    ///
    /// Releasing a free runway, or one held by another aircraft, is an
    /// invariant violation.
    pub fn release(&self, holder: ActorId) -> Result<(), SchedulerError> {
        let mut state = self.state.lock();
        match state.holder {
            Some(current) if current == holder => {
                state.holder = None;
                drop(state);
                self.released.notify_one();
                tracing::trace!("runway released by plane {}", holder);
                Ok(())
            }
            Some(current) => Err(SchedulerError::InvariantViolation(format!(
                "plane {holder} released runway held by plane {current}"
            ))),
            None => Err(SchedulerError::InvariantViolation(format!(
                "plane {holder} released a free runway"
            ))),
        }
    }

    /// Point-in-time availability. Advisory only.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.state.lock().holder.is_none()
    }

    /// Current holder, if any.
    #[must_use]
    pub fn holder(&self) -> Option<ActorId> {
        self.state.lock().holder
    }

    /// Interrupt all current and future blocking acquires.
    pub fn shutdown(&self) {
        let mut state = self.state.lock();
        state.shutdown = true;
        drop(state);
        self.released.notify_all();
    }
}
