//! Device Profile Tests.

use hyperram_core::common::ConfigError;
use hyperram_core::soc::devices::{DEVICES, DeviceProfile, lookup, min_initial_latency};
use rstest::rstest;

#[rstest]
#[case(50_000_000, 3)]
#[case(83_000_000, 3)]
#[case(83_000_001, 4)]
#[case(100_000_000, 4)]
#[case(133_000_000, 5)]
#[case(166_000_000, 6)]
#[case(200_000_000, 7)]
fn minimum_latency_by_frequency(#[case] clock_hz: u64, #[case] expected: u8) {
    assert_eq!(min_initial_latency(clock_hz), expected);
}

#[rstest]
#[case("S27KL0641DA", 100_000_000, 1, 6)]
#[case("S70KL1281", 100_000_000, 2, 6)]
#[case("S27KS0641DP", 166_000_000, 1, 6)]
#[case("S70KS1281DG", 133_000_000, 2, 6)]
#[case("S70KL1282DP", 166_000_000, 2, 7)]
#[case("S70KS1282GA", 200_000_000, 2, 7)]
fn profile_table(
    #[case] name: &str,
    #[case] max_clock_hz: u64,
    #[case] banks: u8,
    #[case] max_initial_latency: u8,
) {
    let profile = lookup(name).unwrap();
    assert_eq!(profile.max_clock_hz, max_clock_hz);
    assert_eq!(profile.banks, banks);
    assert_eq!(profile.max_initial_latency, max_initial_latency);
}

#[test]
fn lookup_is_case_insensitive() {
    assert_eq!(lookup("s27ks0641dp").unwrap().name, "S27KS0641DP");
}

#[test]
fn unknown_part_is_rejected() {
    assert_eq!(
        lookup("S27KS9999").unwrap_err(),
        ConfigError::UnknownDevice("S27KS9999".into())
    );
}

#[test]
fn every_profile_is_valid_and_unique() {
    for (i, profile) in DEVICES.iter().enumerate() {
        profile.validate().unwrap();
        assert!(
            DEVICES[i + 1..].iter().all(|other| other.name != profile.name),
            "duplicate {}",
            profile.name
        );
    }
}

#[test]
fn geometry_places_die_select_at_ca_bit_35() {
    let profile = lookup("S70KS1281DP").unwrap();
    assert_eq!(profile.words_per_die(), 4 * 1024 * 1024);
    assert_eq!(profile.die_shift(), 22);
    assert_eq!(profile.ca_die_bit(), 35);
    assert_eq!(profile.address_width(), 23);
    assert_eq!(lookup("S27KS0641DP").unwrap().address_width(), 22);
}

#[rstest]
#[case(0)]
#[case(3)]
fn unsupported_die_counts(#[case] banks: u8) {
    let profile = DeviceProfile {
        banks,
        ..*lookup("S27KS0641DP").unwrap()
    };
    assert_eq!(
        profile.validate().unwrap_err(),
        ConfigError::UnsupportedBankCount {
            device: "S27KS0641DP",
            banks,
        }
    );
}
