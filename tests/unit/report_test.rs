//! Tests for the reporting sink

use std::time::Duration;

use airfield_scheduler::core::{
    build_flight_event, EventKind, FlightAction, InMemoryReportSink, ReportSink, RunStatistics,
};

#[test]
fn test_in_memory_report_sink() {
    let mut sink = InMemoryReportSink::new(10);

    let event = build_flight_event(1, 7, FlightAction::Land, EventKind::Submitted, None, None);
    sink.record(event.clone());
    assert_eq!(sink.events().len(), 1);

    let events = sink.events();
    assert_eq!(events[0].request, 1);
    assert_eq!(events[0].actor, 7);
    assert_eq!(events[0].kind, EventKind::Submitted);
    assert!(sink.grants().is_empty());
}

#[test]
fn test_report_sink_overflow() {
    let mut sink = InMemoryReportSink::new(2);

    sink.record(build_flight_event(1, 1, FlightAction::Land, EventKind::Submitted, None, None));
    sink.record(build_flight_event(2, 2, FlightAction::Land, EventKind::Submitted, None, None));
    sink.record(build_flight_event(3, 3, FlightAction::Land, EventKind::Submitted, None, None));

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].request, 2); // first one popped
    assert_eq!(events[1].request, 3);
}

#[test]
fn test_build_flight_event() {
    let event = build_flight_event(
        4,
        2,
        FlightAction::EmergencyLand,
        EventKind::Granted,
        Some(3),
        Some(Duration::from_millis(250)),
    );

    assert_eq!(event.request, 4);
    assert_eq!(event.actor, 2);
    assert_eq!(event.action, FlightAction::EmergencyLand);
    assert_eq!(event.gate, Some(3));
    assert_eq!(event.waited_ms, Some(250));
    assert!(event.at_ms > 0);
}

#[test]
fn test_flight_event_serializes_snake_case() {
    let event = build_flight_event(1, 1, FlightAction::EmergencyLand, EventKind::Deferred, None, None);
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["action"], "emergency_land");
    assert_eq!(json["kind"], "deferred");
    assert!(json["gate"].is_null());
}

#[test]
fn test_run_statistics_display() {
    let events = vec![
        build_flight_event(
            1,
            1,
            FlightAction::Land,
            EventKind::Granted,
            Some(1),
            Some(Duration::from_millis(10)),
        ),
        build_flight_event(
            2,
            1,
            FlightAction::Takeoff,
            EventKind::Granted,
            None,
            Some(Duration::from_millis(30)),
        ),
    ];
    let stats = RunStatistics::from_events(&events);
    assert_eq!(
        stats.to_string(),
        "landed=1 took_off=1 avg_wait=20.00ms max_wait=30ms min_nonzero_wait=10ms"
    );
}
