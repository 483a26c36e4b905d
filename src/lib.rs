//! # Airfield Scheduler
//!
//! Arbitration of a single runway and a fixed pool of gates between
//! concurrently running aircraft.
//!
//! Aircraft never grab resources themselves. Each one submits a request
//! through an [`AirfieldHandle`](core::AirfieldHandle) and blocks on its own
//! grant receiver; one scheduler thread owns the request queue, decides who
//! goes next and commits the runway (and, for landings, a gate) before
//! waking exactly that aircraft.
//!
//! ## Scheduling policy
//!
//! - **Emergency first**: a pending emergency landing always preempts.
//! - **Waiting before incoming**: requests that were already denied once
//!   are served before fresh arrivals.
//! - **Takeoff escalation**: when every gate is taken, the first pending
//!   takeoff is served ahead of landings, since only a departure frees a gate.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use airfield_scheduler::builders::build_airfield;
//! use airfield_scheduler::config::AirfieldConfig;
//! use airfield_scheduler::core::FlightAction;
//!
//! let cfg = AirfieldConfig::default();
//! let (scheduler, airfield) = build_airfield(&cfg)?;
//! let atc = scheduler.spawn()?;
//!
//! let grant = airfield.request(1, FlightAction::Land)?.blocking_wait()?;
//! airfield.release_runway(1)?;
//! let gate = grant.gate.expect("landings always get a gate");
//! airfield.dock(1, gate)?;
//! // ... service, then request takeoff and release runway and gate
//! ```
//!
//! For complete runs, see `tests/lifecycle_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling abstractions: resources, request queue and scheduler loop.
pub mod core;
/// Configuration models for the airfield and the scheduler loop.
pub mod config;
/// Builders to construct a scheduler and its handle from configuration.
pub mod builders;
/// Shared utilities.
pub mod util;
