//! HyperRAM Device Profiles.
//!
//! Static timing and geometry facts for every supported part. Profiles are plain data:
//! a part is a record in [`DEVICES`], and the frequency-to-latency rule is the pure
//! function [`min_initial_latency`].

use serde::Serialize;

use crate::common::constants::{CA_LOWER_ADDR_BITS, CA_UPPER_ADDR_SHIFT, MIN_INITIAL_LATENCY};
use crate::common::error::ConfigError;

/// Immutable per-part constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceProfile {
    /// Part number.
    pub name: &'static str,
    /// Maximum HyperBus clock in Hz.
    pub max_clock_hz: u64,
    /// Number of dies sharing the bus (1, or 2 for dual-die modules).
    pub banks: u8,
    /// Rows per die.
    pub rows: u32,
    /// 16-bit columns per row.
    pub columns: u32,
    /// Largest initial latency the part accepts.
    pub max_initial_latency: u8,
}

/// Minimum legal initial latency for a given bus clock.
///
/// The same table applies to every part; only the maximum differs.
pub const fn min_initial_latency(clock_hz: u64) -> u8 {
    if clock_hz <= 83_000_000 {
        MIN_INITIAL_LATENCY
    } else if clock_hz <= 100_000_000 {
        4
    } else if clock_hz <= 133_000_000 {
        5
    } else if clock_hz <= 166_000_000 {
        6
    } else {
        7
    }
}

impl DeviceProfile {
    const fn part(name: &'static str, max_clock_hz: u64, banks: u8, max_initial_latency: u8) -> Self {
        Self {
            name,
            max_clock_hz,
            banks,
            rows: 8192,
            columns: 512,
            max_initial_latency,
        }
    }

    /// Returns `true` when two dies share the bus and need independent configuration.
    pub const fn is_dual_die(&self) -> bool {
        self.banks > 1
    }

    /// Number of 16-bit words in one die.
    pub const fn words_per_die(&self) -> u32 {
        self.rows * self.columns
    }

    /// Word-address bit that selects the die.
    pub const fn die_shift(&self) -> u32 {
        self.words_per_die().trailing_zeros()
    }

    /// CA packet bit that carries the die-select address bit.
    pub const fn ca_die_bit(&self) -> u32 {
        self.die_shift() + CA_UPPER_ADDR_SHIFT - CA_LOWER_ADDR_BITS
    }

    /// Width of a 16-bit word address spanning every die.
    pub const fn address_width(&self) -> u32 {
        let words = self.words_per_die() as u64 * self.banks as u64;
        u64::BITS - (words - 1).leading_zeros()
    }

    /// Minimum initial latency for this part at `clock_hz`.
    pub const fn min_initial_latency(&self, clock_hz: u64) -> u8 {
        min_initial_latency(clock_hz)
    }

    /// Rejects geometries the controller cannot drive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.banks == 0 || self.banks > 2 {
            return Err(ConfigError::UnsupportedBankCount {
                device: self.name,
                banks: self.banks,
            });
        }
        Ok(())
    }
}

/// Every supported part, aliases included.
pub const DEVICES: &[DeviceProfile] = &[
    DeviceProfile::part("S27KL0641DA", 100_000_000, 1, 6),
    DeviceProfile::part("S27KL0641", 100_000_000, 1, 6),
    DeviceProfile::part("S70KL1281DA", 100_000_000, 2, 6),
    DeviceProfile::part("S70KL1281", 100_000_000, 2, 6),
    DeviceProfile::part("S27KS0641DP", 166_000_000, 1, 6),
    DeviceProfile::part("S27KS0641", 166_000_000, 1, 6),
    DeviceProfile::part("S70KS1281DP", 166_000_000, 2, 6),
    DeviceProfile::part("S70KS1281", 166_000_000, 2, 6),
    DeviceProfile::part("S27KS0641DA", 100_000_000, 1, 6),
    DeviceProfile::part("S70KS1281DA", 100_000_000, 2, 6),
    DeviceProfile::part("S27KS0641DG", 133_000_000, 1, 6),
    DeviceProfile::part("S70KS1281DG", 133_000_000, 2, 6),
    DeviceProfile::part("S70KL1282DP", 166_000_000, 2, 7),
    DeviceProfile::part("S70KL1282GA", 200_000_000, 2, 7),
    DeviceProfile::part("S70KS1282GA", 200_000_000, 2, 7),
    DeviceProfile::part("S70KS1282", 200_000_000, 2, 7),
];

/// Looks up a part by name (ASCII case-insensitive).
///
/// # Returns
///
/// The profile, or [`ConfigError::UnknownDevice`].
pub fn lookup(name: &str) -> Result<&'static DeviceProfile, ConfigError> {
    DEVICES
        .iter()
        .find(|d| d.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| ConfigError::UnknownDevice(name.to_owned()))
}
