//! Tests for builder modules

use airfield_scheduler::builders::{build_airfield, build_airfield_reporting, build_airfield_with_sink};
use airfield_scheduler::config::AirfieldConfig;
use airfield_scheduler::core::{EventKind, FlightAction, InMemoryReportSink, SchedulerError};

#[test]
fn test_build_airfield_defaults() {
    let (scheduler, airfield) = build_airfield(&AirfieldConfig::default()).unwrap();

    assert!(airfield.is_idle());
    assert_eq!(airfield.runway_holder(), None);
    for id in 1..=3 {
        let gate = airfield.gate(id).unwrap();
        assert!(gate.is_free());
    }
    assert!(airfield.gate(4).is_none());
    drop(scheduler);
}

#[test]
fn test_build_rejects_invalid_config() {
    let cfg = AirfieldConfig {
        gate_count: 0,
        ..AirfieldConfig::default()
    };
    assert!(matches!(
        build_airfield(&cfg),
        Err(SchedulerError::InvalidConfig(_))
    ));
}

#[test]
fn test_reporting_sink_sees_submissions() {
    let (_scheduler, airfield, sink) =
        build_airfield_reporting(&AirfieldConfig::default()).unwrap();

    let _rx = airfield.request(1, FlightAction::Land).unwrap();
    let _rx2 = airfield.request(2, FlightAction::EmergencyLand).unwrap();

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.kind == EventKind::Submitted));
    assert_eq!(events[1].action, FlightAction::EmergencyLand);

    let snapshot = airfield.queue_snapshot();
    assert!(snapshot.incoming.is_empty());
    assert_eq!(airfield.sanity_check().pending_requests, 2);
}

#[test]
fn test_custom_sink_is_wired() {
    let sink = InMemoryReportSink::new(4);
    let (_scheduler, airfield) =
        build_airfield_with_sink(&AirfieldConfig::default(), Some(Box::new(sink.clone()))).unwrap();

    let _rx = airfield.request(9, FlightAction::Takeoff).unwrap();
    assert_eq!(sink.events().len(), 1);
    assert_eq!(sink.events()[0].actor, 9);
}

#[test]
fn test_request_ids_are_unique_across_clones() {
    let (_scheduler, airfield, sink) =
        build_airfield_reporting(&AirfieldConfig::default()).unwrap();
    let other = airfield.clone();

    let _a = airfield.request(1, FlightAction::Land).unwrap();
    let _b = other.request(2, FlightAction::Land).unwrap();

    let ids: Vec<_> = sink.events().iter().map(|e| e.request).collect();
    assert_eq!(ids, vec![1, 2]);
}
