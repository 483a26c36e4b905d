//! Tests for utility functions

use airfield_scheduler::core::{ActorId, FlightAction, GateId, RequestId};
use airfield_scheduler::util::{init_tracing, now_ms};

#[test]
fn test_now_ms_is_monotonic_enough() {
    let first = now_ms();
    let second = now_ms();
    assert!(first > 0);
    assert!(second >= first);
}

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
    tracing::info!("tracing initialised twice without panicking");
}

#[test]
fn test_flight_action_display() {
    assert_eq!(FlightAction::Land.to_string(), "Landing");
    assert_eq!(FlightAction::EmergencyLand.to_string(), "Emergency Landing");
    assert_eq!(FlightAction::Takeoff.to_string(), "Takeoff");
}

#[test]
fn test_flight_action_serde() {
    let json = serde_json::to_string(&FlightAction::EmergencyLand).unwrap();
    assert_eq!(json, "\"emergency_land\"");
    let back: FlightAction = serde_json::from_str("\"takeoff\"").unwrap();
    assert_eq!(back, FlightAction::Takeoff);
}

#[test]
fn test_id_aliases() {
    let actor: ActorId = 12;
    let gate: GateId = 3;
    let request: RequestId = 12345;
    assert_eq!(actor, 12);
    assert_eq!(gate, 3);
    assert_eq!(request, 12345);
}
