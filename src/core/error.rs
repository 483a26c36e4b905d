//! Error types for scheduler operations.

use thiserror::Error;

use crate::core::request::{ActorId, GateId};

/// Errors produced by scheduler components.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A blocking wait was cancelled from outside (shutdown).
    #[error("interrupted while waiting")]
    Interrupted,
    /// The scheduler loop is no longer running.
    #[error("scheduler stopped")]
    SchedulerStopped,
    /// A resource invariant was broken; the run must abort.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
    /// Gate id outside the configured pool.
    #[error("unknown gate {0}")]
    UnknownGate(GateId),
    /// The owning actor dropped its grant receiver before the grant landed.
    #[error("grant for aircraft {0} could not be delivered")]
    GrantUndeliverable(ActorId),
    /// Configuration rejected during validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The scheduler thread could not be started.
    #[error("failed to spawn scheduler thread: {0}")]
    Spawn(#[from] std::io::Error),
}

impl SchedulerError {
    /// Whether this error means the run itself is broken, not just one call.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvariantViolation(_) | Self::GrantUndeliverable(_) | Self::Spawn(_)
        )
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
