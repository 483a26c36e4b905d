//! Builders to construct scheduler components from configuration.

pub mod airfield_builder;

pub use airfield_builder::{build_airfield, build_airfield_reporting, build_airfield_with_sink};
