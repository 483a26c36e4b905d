//! Tests for configuration validation

use std::time::Duration;

use airfield_scheduler::config::AirfieldConfig;

#[test]
fn test_airfield_config_validation() {
    let valid = AirfieldConfig {
        gate_count: 2,
        total_aircraft: 4,
        step_delay_ms: 0,
        idle_poll_ms: None,
        drain_incoming: true,
        report_capacity: 64,
    };
    assert!(valid.validate().is_ok());
}

#[test]
fn test_airfield_config_invalid_gate_count() {
    let invalid = AirfieldConfig {
        gate_count: 0,
        ..AirfieldConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_airfield_config_invalid_aircraft() {
    let invalid = AirfieldConfig {
        total_aircraft: 0,
        ..AirfieldConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_airfield_config_invalid_report_capacity() {
    let invalid = AirfieldConfig {
        report_capacity: 0,
        ..AirfieldConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_durations() {
    let cfg = AirfieldConfig {
        step_delay_ms: 250,
        idle_poll_ms: Some(50),
        ..AirfieldConfig::default()
    };
    assert_eq!(cfg.step_delay(), Some(Duration::from_millis(250)));
    assert_eq!(cfg.idle_poll(), Some(Duration::from_millis(50)));
    assert_eq!(AirfieldConfig::default().step_delay(), None);
    assert_eq!(AirfieldConfig::default().idle_poll(), None);
}

#[test]
fn test_from_json_str() {
    let cfg = AirfieldConfig::from_json_str(
        r#"{"gate_count": 4, "total_aircraft": 10, "step_delay_ms": 5}"#,
    )
    .unwrap();
    assert_eq!(cfg.gate_count, 4);
    assert_eq!(cfg.total_aircraft, 10);
    assert_eq!(cfg.step_delay_ms, 5);
    assert!(cfg.drain_incoming);
    assert_eq!(cfg.report_capacity, 1024);

    assert!(AirfieldConfig::from_json_str(r#"{"gate_count": 0, "total_aircraft": 1}"#).is_err());
    assert!(AirfieldConfig::from_json_str("not json").is_err());
}

#[test]
fn test_from_env() {
    std::env::set_var("AIRFIELD_GATE_COUNT", "5");
    std::env::set_var("AIRFIELD_TOTAL_AIRCRAFT", "12");
    std::env::set_var("AIRFIELD_DRAIN_INCOMING", "false");

    let cfg = AirfieldConfig::from_env().unwrap();
    assert_eq!(cfg.gate_count, 5);
    assert_eq!(cfg.total_aircraft, 12);
    assert!(!cfg.drain_incoming);

    std::env::set_var("AIRFIELD_GATE_COUNT", "many");
    assert!(AirfieldConfig::from_env().is_err());

    std::env::remove_var("AIRFIELD_GATE_COUNT");
    std::env::remove_var("AIRFIELD_TOTAL_AIRCRAFT");
    std::env::remove_var("AIRFIELD_DRAIN_INCOMING");
}
