//! Configuration models for the airfield and its scheduler.

pub mod airfield;

pub use airfield::AirfieldConfig;
