//! Error Tests.
//!
//! Verifies error messages and the conversions between the two error taxonomies.

use hyperram_core::common::{ConfigError, SimError};

#[test]
fn config_error_messages_name_the_problem() {
    let e = ConfigError::UnknownDevice("S27XX".into());
    assert_eq!(e.to_string(), "unknown device `S27XX`");

    let e = ConfigError::ClockExceedsDevice {
        device: "S27KL0641",
        bus_clock_hz: 133_000_000,
        max_clock_hz: 100_000_000,
    };
    assert!(e.to_string().contains("133000000"));
    assert!(e.to_string().contains("S27KL0641"));

    let e = ConfigError::PhyRequiresFixedLatency {
        latency: 3,
        tx_latency: 1,
    };
    assert!(e.to_string().contains("requires fixed latency"));
}

#[test]
fn sim_error_wraps_config_error_transparently() {
    let inner = ConfigError::DualDieRequiresFixedLatency;
    let outer: SimError = inner.clone().into();
    assert_eq!(outer.to_string(), inner.to_string());
    assert!(matches!(outer, SimError::Config(ConfigError::DualDieRequiresFixedLatency)));
}

#[test]
fn sim_error_wraps_json_errors() {
    let parse = serde_json::from_str::<u32>("not json").unwrap_err();
    let e: SimError = parse.into();
    assert!(e.to_string().starts_with("invalid configuration document"));
}

#[test]
fn cycle_budget_message_includes_budget() {
    let e = SimError::CycleBudgetExceeded { budget: 42 };
    assert_eq!(e.to_string(), "simulation did not finish within 42 cycles");
}

#[test]
fn sim_error_wraps_io_errors() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "hyperram.json");
    let e: SimError = io.into();
    assert!(matches!(e, SimError::Io(_)));
    assert_eq!(e.to_string(), "failed to read configuration: hyperram.json");
}
