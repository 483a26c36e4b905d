//! Builders to construct an airfield scheduler from configuration.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::AirfieldConfig;
use crate::core::airfield::AirfieldState;
use crate::core::{
    AirfieldHandle, Arbitrator, InMemoryReportSink, ReportSink, Scheduler, SchedulerError,
};

/// Build the scheduler and its handle with no reporting sink.
pub fn build_airfield(cfg: &AirfieldConfig) -> Result<(Scheduler, AirfieldHandle), SchedulerError> {
    build_airfield_with_sink(cfg, None)
}

/// Build the scheduler and its handle, feeding events into `sink`.
pub fn build_airfield_with_sink(
    cfg: &AirfieldConfig,
    sink: Option<Box<dyn ReportSink>>,
) -> Result<(Scheduler, AirfieldHandle), SchedulerError> {
    cfg.validate().map_err(SchedulerError::InvalidConfig)?;

    let state = Arc::new(AirfieldState::new(cfg.gate_count));
    let sink = sink.map(|s| Arc::new(Mutex::new(s)));
    let (tx, rx) = crossbeam_channel::unbounded();

    let handle = AirfieldHandle::new(Arc::clone(&state), tx, sink.clone());
    let arbitrator = Arbitrator::new(Arc::clone(&state), sink, cfg.drain_incoming);
    let scheduler = Scheduler::new(arbitrator, state, rx, cfg);

    tracing::debug!(
        "airfield built: {} gates, {} aircraft expected",
        cfg.gate_count,
        cfg.total_aircraft
    );
    Ok((scheduler, handle))
}

/// Build with an in-memory sink sized by `report_capacity`; the returned
/// sink shares its buffer with the one handed to the scheduler.
pub fn build_airfield_reporting(
    cfg: &AirfieldConfig,
) -> Result<(Scheduler, AirfieldHandle, InMemoryReportSink), SchedulerError> {
    let sink = InMemoryReportSink::new(cfg.report_capacity);
    let (scheduler, handle) = build_airfield_with_sink(cfg, Some(Box::new(sink.clone())))?;
    Ok((scheduler, handle, sink))
}
