//! Tests for error types

use airfield_scheduler::core::{AppResult, SchedulerError};

#[test]
fn test_interrupted_error() {
    let err = SchedulerError::Interrupted;
    assert_eq!(format!("{}", err), "interrupted while waiting");
    assert!(!err.is_fatal());
}

#[test]
fn test_scheduler_stopped_error() {
    let err = SchedulerError::SchedulerStopped;
    assert_eq!(format!("{}", err), "scheduler stopped");
    assert!(!err.is_fatal());
}

#[test]
fn test_invariant_violation_error() {
    let err = SchedulerError::InvariantViolation("runway double release".to_string());
    assert_eq!(format!("{}", err), "invariant violated: runway double release");
    assert!(err.is_fatal());
}

#[test]
fn test_unknown_gate_error() {
    let err = SchedulerError::UnknownGate(9);
    assert_eq!(format!("{}", err), "unknown gate 9");
}

#[test]
fn test_grant_undeliverable_error() {
    let err = SchedulerError::GrantUndeliverable(4);
    assert_eq!(format!("{}", err), "grant for aircraft 4 could not be delivered");
    assert!(err.is_fatal());
}

#[test]
fn test_invalid_config_error() {
    let err = SchedulerError::InvalidConfig("gate_count must be > 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: gate_count must be > 0"
    );
}

#[test]
fn test_spawn_error_from_io() {
    let io = std::io::Error::new(std::io::ErrorKind::Other, "no threads left");
    let err: SchedulerError = io.into();
    assert!(matches!(err, SchedulerError::Spawn(_)));
    assert!(err.is_fatal());
}

#[test]
fn test_app_result_wraps_scheduler_error() {
    fn stopped() -> AppResult<()> {
        let result: Result<(), SchedulerError> = Err(SchedulerError::SchedulerStopped);
        result?;
        Ok(())
    }
    let err = stopped().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SchedulerError>(),
        Some(SchedulerError::SchedulerStopped)
    ));
}
