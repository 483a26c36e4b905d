//! Core scheduling abstractions: resources, the request queue and the arbitrator loop.

pub mod airfield;
pub mod arbitrator;
pub mod error;
pub mod gate;
pub mod report;
pub mod request;
pub mod request_queue;
pub mod runway;
pub mod scheduler;

pub use airfield::{AirfieldHandle, SanityReport};
pub use arbitrator::{Arbitrator, StepOutcome};
pub use error::{AppResult, SchedulerError};
pub use gate::{Gate, GatePool};
pub use report::{
    build_flight_event, EventKind, FlightEvent, InMemoryReportSink, ReportSink, RunStatistics,
};
pub use request::{
    ActorId, FlightAction, FlightRequest, GateId, Grant, GrantReceiver, GrantedFlight, RequestId,
};
pub use request_queue::{Candidate, QueueSnapshot, QueuedFlight, RequestQueue, Tier};
pub use runway::RunwayResource;
pub use scheduler::{RunOutcome, RunSummary, Scheduler, SchedulerThread};
