//! The scheduler control loop.
//!
//! Exactly one [`Scheduler`] exists per airfield: it owns the only receiving
//! end of the mailbox and is created together with its handle by
//! [`crate::builders::build_airfield`]. It can run on the calling thread
//! ([`Scheduler::run`]) or on a dedicated named thread ([`Scheduler::spawn`]).
//!
//! # Wake-ups
//!
//! The loop blocks on the mailbox whenever there is nothing it can do:
//! both tiers empty, or the last step was denied. Submissions and every
//! release call post a signal, so no poll is needed for liveness.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use serde::Serialize;
use uuid::Uuid;

use crate::config::AirfieldConfig;
use crate::core::airfield::{AirfieldState, Signal};
use crate::core::arbitrator::{Arbitrator, StepOutcome};
use crate::core::SchedulerError;

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// The configured number of takeoffs was granted.
    Completed,
    /// Shutdown was requested or every handle was dropped.
    Shutdown,
}

/// Counters returned when the loop exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Why the loop ended.
    pub outcome: RunOutcome,
    /// Landing-class grants.
    pub landings_granted: usize,
    /// Takeoff grants.
    pub takeoffs_granted: usize,
    /// Scheduling steps executed.
    pub steps: u64,
}

/// Single scheduling context for one airfield.
pub struct Scheduler {
    arbitrator: Arbitrator,
    state: Arc<AirfieldState>,
    mailbox: Receiver<Signal>,
    total_aircraft: usize,
    step_delay: Option<Duration>,
    idle_poll: Option<Duration>,
    shutdown: bool,
    fatal: Option<String>,
}

impl Scheduler {
    pub(crate) fn new(
        arbitrator: Arbitrator,
        state: Arc<AirfieldState>,
        mailbox: Receiver<Signal>,
        cfg: &AirfieldConfig,
    ) -> Self {
        Self {
            arbitrator,
            state,
            mailbox,
            total_aircraft: cfg.total_aircraft,
            step_delay: cfg.step_delay(),
            idle_poll: cfg.idle_poll(),
            shutdown: false,
            fatal: None,
        }
    }

    /// Run the loop on the current thread until the configured number of
    /// takeoffs has been granted or shutdown is requested.
    ///
    /// An invariant violation, whether observed by a step or reported by an
    /// actor's release or dock call, aborts the run and is returned as the
    /// error. Pending requests are abandoned either way.
    pub fn run(mut self) -> Result<RunSummary, SchedulerError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("atc", %run_id);
        let _entered = span.enter();
        tracing::info!(
            "scheduler operational, expecting {} takeoffs",
            self.total_aircraft
        );

        let mut steps = 0u64;
        let result = self.drive(&mut steps);
        self.abandon_pending();
        let outcome = result.inspect_err(|e| {
            tracing::error!("scheduler aborting after {} steps: {}", steps, e);
        })?;

        let summary = RunSummary {
            outcome,
            landings_granted: self.arbitrator.landings_granted(),
            takeoffs_granted: self.arbitrator.takeoffs_granted(),
            steps,
        };
        tracing::info!(
            "scheduler stopped ({:?}): {} landings, {} takeoffs in {} steps",
            summary.outcome,
            summary.landings_granted,
            summary.takeoffs_granted,
            summary.steps
        );
        Ok(summary)
    }

    fn drive(&mut self, steps: &mut u64) -> Result<RunOutcome, SchedulerError> {
        let mut blocked = false;
        loop {
            if self.arbitrator.takeoffs_granted() >= self.total_aircraft {
                return Ok(RunOutcome::Completed);
            }
            if blocked || self.state.queue.lock().is_empty() {
                self.wait_for_signal();
            }
            self.absorb_pending();
            if let Some(reason) = self.fatal.take() {
                return Err(SchedulerError::InvariantViolation(reason));
            }
            if self.shutdown {
                return Ok(RunOutcome::Shutdown);
            }

            let step = self.arbitrator.step()?;
            *steps += 1;
            // a denial can only clear after a release or a new arrival
            blocked = !matches!(step, StepOutcome::Granted(_));

            if let Some(delay) = self.step_delay {
                thread::sleep(delay);
            }
        }
    }

    /// Run the loop on a dedicated thread named `atc`.
    pub fn spawn(self) -> Result<SchedulerThread, SchedulerError> {
        let handle = thread::Builder::new()
            .name("atc".into())
            .spawn(move || self.run())?;
        Ok(SchedulerThread { handle })
    }

    fn wait_for_signal(&mut self) {
        let signal = match self.idle_poll {
            Some(poll) => match self.mailbox.recv_timeout(poll) {
                Ok(signal) => signal,
                Err(RecvTimeoutError::Timeout) => return,
                Err(RecvTimeoutError::Disconnected) => {
                    self.on_disconnect();
                    return;
                }
            },
            None => match self.mailbox.recv() {
                Ok(signal) => signal,
                Err(_) => {
                    self.on_disconnect();
                    return;
                }
            },
        };
        self.handle_signal(signal);
    }

    fn absorb_pending(&mut self) {
        while let Ok(signal) = self.mailbox.try_recv() {
            self.handle_signal(signal);
        }
    }

    /// Close the grant signal of everything still pending so blocked actors
    /// see `SchedulerStopped` instead of waiting forever.
    fn abandon_pending(&mut self) {
        while let Ok(signal) = self.mailbox.try_recv() {
            if let Signal::Submit(mut submission) = signal {
                if let Some(request) = submission.take() {
                    tracing::warn!(
                        "dropping request of plane {}, scheduler stopping",
                        request.actor()
                    );
                }
            }
        }
        let dropped = self.state.queue.lock().clear();
        if dropped > 0 {
            tracing::warn!("{} queued request(s) abandoned at shutdown", dropped);
        }
    }

    fn handle_signal(&mut self, signal: Signal) {
        match signal {
            Signal::Submit(mut submission) => {
                if let Some(request) = submission.take() {
                    self.state.queue.lock().enqueue_incoming(request);
                }
            }
            Signal::ResourcesReleased => {
                tracing::trace!("resources released, re-evaluating");
            }
            Signal::Fatal(reason) => {
                tracing::error!("invariant violation reported by an aircraft: {}", reason);
                self.fatal.get_or_insert(reason);
            }
            Signal::Shutdown => {
                self.shutdown = true;
            }
        }
    }

    fn on_disconnect(&mut self) {
        tracing::warn!("all airfield handles dropped, stopping scheduler");
        self.shutdown = true;
    }
}

/// Join handle for a scheduler running on its own thread.
#[derive(Debug)]
pub struct SchedulerThread {
    handle: JoinHandle<Result<RunSummary, SchedulerError>>,
}

impl SchedulerThread {
    /// Whether the loop has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the loop to exit and return its summary.
    pub fn join(self) -> Result<RunSummary, SchedulerError> {
        self.handle.join().map_err(|_| {
            SchedulerError::InvariantViolation("scheduler thread panicked".into())
        })?
    }
}
