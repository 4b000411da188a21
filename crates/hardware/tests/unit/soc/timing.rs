//! Controller Configuration Tests.
//!
//! Verifies the derived latency settings and every construction-time rejection, in the
//! order the checks are evaluated.

use hyperram_core::common::ConfigError;
use hyperram_core::phy::{BusWidth, PhyTiming};
use hyperram_core::soc::controller::timing::Timing;
use hyperram_core::soc::devices::lookup;
use pretty_assertions::assert_eq;
use rstest::rstest;

const fn phy(tx: u32, rx: u32, width: BusWidth) -> PhyTiming {
    PhyTiming {
        tx_latency: tx,
        rx_latency: rx,
        width,
    }
}

fn derive(
    device: &str,
    clock_hz: u64,
    phy: PhyTiming,
    il: Option<u8>,
    fixed: Option<bool>,
) -> Result<Timing, ConfigError> {
    Timing::derive(lookup(device).unwrap(), clock_hz, phy, il, fixed)
}

// ══════════════════════════════════════════════════════════
// 1. Derived settings
// ══════════════════════════════════════════════════════════

#[test]
fn single_die_100mhz_defaults() {
    let t = derive("S27KS0641DP", 100_000_000, phy(1, 1, BusWidth::X16), None, None).unwrap();
    assert_eq!(t.initial_latency, 4);
    assert!(!t.fixed_latency);
    assert_eq!(t.cr0, 0x8FF7);
    assert_eq!(t.bus_clock_hz, 100_000_000);
    assert_eq!(t.reset_delay, 21);
    assert_eq!(t.select_word, 3);
    assert_eq!(t.write_wait(false), 0);
    assert_eq!(t.write_wait(true), 4);
    assert_eq!(t.read_wait(false), 2);
    assert_eq!(t.read_wait(true), 6);
}

#[test]
fn dual_die_forces_fixed_latency() {
    let t = derive("S70KS1281DP", 100_000_000, phy(1, 1, BusWidth::X16), None, None).unwrap();
    assert!(t.fixed_latency);
    assert_eq!(t.cr0, 0x8FFF);
}

#[test]
fn double_rate_doubles_bus_clock_and_forces_fixed() {
    let t = derive("S27KS0641DP", 50_000_000, phy(1, 1, BusWidth::X32), None, None).unwrap();
    assert_eq!(t.bus_clock_hz, 100_000_000);
    assert_eq!(t.initial_latency, 4);
    assert!(t.fixed_latency);
    assert_eq!(t.ratio(), 2);
    assert_eq!(t.select_word, 1);
    assert_eq!(t.write_wait(true), 1);
    assert_eq!(t.read_wait(true), 3);
}

#[test]
fn explicit_fixed_latency_on_single_die() {
    let t = derive(
        "S27KS0641DP",
        100_000_000,
        phy(1, 1, BusWidth::X16),
        Some(6),
        Some(true),
    )
    .unwrap();
    assert_eq!(t.cr0, 0x8F1F);
    assert_eq!(t.write_wait(true), 8);
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(16)]
fn reset_delay_tracks_clock(#[case] ticks: u64) {
    let t = derive(
        "S27KL0641",
        ticks * 5_000_000,
        phy(1, 1, BusWidth::X16),
        Some(3),
        Some(true),
    )
    .unwrap();
    assert_eq!(t.reset_delay, ticks as u32 + 1);
}

#[test]
fn serializes_to_json() {
    let t = derive("S27KS0641DP", 100_000_000, phy(1, 1, BusWidth::X16), None, None).unwrap();
    let json = serde_json::to_value(t).unwrap();
    assert_eq!(json["initial_latency"], 4);
    assert_eq!(json["cr0"], 0x8FF7);
    assert_eq!(json["profile"]["name"], "S27KS0641DP");
}

// ══════════════════════════════════════════════════════════
// 2. Rejections
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::bus_clock_above_part(
    "S27KL0641", 133_000_000, phy(1, 1, BusWidth::X16), None, None,
    ConfigError::ClockExceedsDevice { device: "S27KL0641", bus_clock_hz: 133_000_000, max_clock_hz: 100_000_000 }
)]
#[case::double_rate_doubles_clock(
    "S27KS0641DP", 100_000_000, phy(1, 1, BusWidth::X32), None, None,
    ConfigError::ClockExceedsDevice { device: "S27KS0641DP", bus_clock_hz: 200_000_000, max_clock_hz: 166_000_000 }
)]
#[case::latency_above_part(
    "S27KS0641DP", 100_000_000, phy(1, 1, BusWidth::X16), Some(7), None,
    ConfigError::InitialLatencyOutOfRange { latency: 7, max: 6 }
)]
#[case::latency_below_protocol(
    "S27KS0641DP", 50_000_000, phy(1, 1, BusWidth::X16), Some(2), None,
    ConfigError::InitialLatencyOutOfRange { latency: 2, max: 6 }
)]
#[case::latency_below_clock_minimum(
    "S27KS0641DP", 100_000_000, phy(1, 1, BusWidth::X16), Some(3), None,
    ConfigError::InitialLatencyTooLow { latency: 3, minimum: 4, bus_clock_hz: 100_000_000 }
)]
#[case::dual_die_variable(
    "S70KS1281DP", 100_000_000, phy(1, 1, BusWidth::X16), None, Some(false),
    ConfigError::DualDieRequiresFixedLatency
)]
#[case::double_rate_variable(
    "S27KS0641DP", 50_000_000, phy(1, 1, BusWidth::X32), None, Some(false),
    ConfigError::DoubleRateRequiresFixedLatency
)]
#[case::tx_too_deep_even_when_doubled(
    "S27KL0641", 80_000_000, phy(4, 1, BusWidth::X16), Some(3), Some(true),
    ConfigError::LatencyTooLowForPhy { latency: 3, tx_latency: 4 }
)]
#[case::tx_needs_doubled_latency(
    "S27KL0641", 80_000_000, phy(1, 1, BusWidth::X16), Some(3), Some(false),
    ConfigError::PhyRequiresFixedLatency { latency: 3, tx_latency: 1 }
)]
#[case::rx_misses_latency_indication(
    "S27KS0641DP", 100_000_000, phy(1, 4, BusWidth::X16), Some(6), Some(false),
    ConfigError::RxLatencyRequiresFixedLatency { rx_latency: 4 }
)]
fn construction_failures(
    #[case] device: &str,
    #[case] clock_hz: u64,
    #[case] phy: PhyTiming,
    #[case] il: Option<u8>,
    #[case] fixed: Option<bool>,
    #[case] expected: ConfigError,
) {
    assert_eq!(derive(device, clock_hz, phy, il, fixed).unwrap_err(), expected);
}

#[test]
fn fixed_latency_rescues_short_latency_for_phy() {
    let t = derive(
        "S27KL0641",
        80_000_000,
        phy(1, 1, BusWidth::X16),
        Some(3),
        Some(true),
    )
    .unwrap();
    assert_eq!(t.write_wait(true), 2);
}

#[test]
fn fixed_latency_rescues_deep_rx() {
    assert!(
        derive(
            "S27KS0641DP",
            100_000_000,
            phy(1, 4, BusWidth::X16),
            Some(6),
            Some(true)
        )
        .is_ok()
    );
}
