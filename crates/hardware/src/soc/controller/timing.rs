//! Controller Configuration.
//!
//! Everything the controller needs to know about latency is derived once, here, when it is
//! built. This module provides:
//! 1. **Validation:** Clock, latency, die-count and PHY feasibility checks, in a fixed order.
//! 2. **CR0:** The configuration register value programmed into every die.
//! 3. **Lane Geometry:** How many controller cycles the CA packet occupies and where the
//!    data phase starts, for both the 16-bit and the double-rate 32-bit datapath.
//! 4. **Wait Counts:** The exact delay-counter reloads for the write and read latency phases.
//!
//! Bus clocks are counted from the first CA half-word (index 0). A data phase starts at bus
//! clock `2 + k * IL`, where `k` is 2 for a long (doubled) latency and 1 otherwise.

use serde::Serialize;

use crate::common::constants::{
    CA_HALF_WORDS, CR0_BASE, CR0_FIXED_LATENCY, CR0_LATENCY_SHIFT, LATENCY_CODES,
    MIN_INITIAL_LATENCY, RESET_TICK_HZ,
};
use crate::common::error::ConfigError;
use crate::phy::{BusWidth, PhyTiming};
use crate::soc::devices::DeviceProfile;

/// CR0 value for a given latency setting.
///
/// # Arguments
///
/// * `initial_latency` - Initial latency in clocks, `3..=7`.
/// * `fixed_latency` - Always use the doubled latency.
///
/// # Returns
///
/// `0x8F07 | code << 4 | fixed << 3`, or `None` for an unencodable latency.
pub fn cr0_value(initial_latency: u8, fixed_latency: bool) -> Option<u16> {
    let index = initial_latency.checked_sub(MIN_INITIAL_LATENCY)?;
    let code = LATENCY_CODES.get(index as usize)?;
    let fixed = if fixed_latency { CR0_FIXED_LATENCY } else { 0 };
    Some(CR0_BASE | (*code << CR0_LATENCY_SHIFT) | fixed)
}

/// Immutable controller configuration, derived and validated at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Timing {
    /// Part being driven.
    pub profile: DeviceProfile,
    /// Controller clock in Hz.
    pub clock_hz: u64,
    /// Clock on the HyperBus pins (doubled in 32-bit mode).
    pub bus_clock_hz: u64,
    /// Initial latency in bus clocks.
    pub initial_latency: u8,
    /// Always use the long latency.
    pub fixed_latency: bool,
    /// Value programmed into CR0 of every die.
    pub cr0: u16,
    /// PHY pipeline depths and lane width.
    pub phy: PhyTiming,
    /// Cycles of each reset phase.
    pub reset_delay: u32,
    /// Index of the controller cycle that carries bus clock 3.
    pub select_word: u32,
    #[serde(skip)]
    write_wait: [u32; 2],
    #[serde(skip)]
    read_wait: [u32; 2],
}

/// Controller cycles to wait in the write latency phase, or a negative count if infeasible.
const fn write_wait(data_word: i64, select_word: i64, tx: i64) -> i64 {
    data_word - select_word - 2 - tx
}

/// Controller cycles to wait in the read latency phase.
const fn read_wait(data_word: i64, select_word: i64) -> i64 {
    data_word - select_word - 1
}

impl Timing {
    /// Validates a configuration and derives the controller's constants.
    ///
    /// # Arguments
    ///
    /// * `profile` - Part to drive.
    /// * `clock_hz` - Controller clock.
    /// * `phy` - PHY pipeline depths and lane width.
    /// * `initial_latency` - Override; defaults to the minimum for the bus clock.
    /// * `fixed_latency` - Override; defaults to `true` for dual-die parts and the 32-bit datapath.
    ///
    /// # Returns
    ///
    /// The configuration, or the first [`ConfigError`] found.
    pub fn derive(
        profile: &DeviceProfile,
        clock_hz: u64,
        phy: PhyTiming,
        initial_latency: Option<u8>,
        fixed_latency: Option<bool>,
    ) -> Result<Self, ConfigError> {
        profile.validate()?;

        let ratio = phy.width.ratio();
        let bus_clock_hz = clock_hz * u64::from(ratio);
        if bus_clock_hz > profile.max_clock_hz {
            return Err(ConfigError::ClockExceedsDevice {
                device: profile.name,
                bus_clock_hz,
                max_clock_hz: profile.max_clock_hz,
            });
        }

        let minimum = profile.min_initial_latency(bus_clock_hz);
        let latency = initial_latency.unwrap_or(minimum);
        if !(MIN_INITIAL_LATENCY..=profile.max_initial_latency).contains(&latency) {
            return Err(ConfigError::InitialLatencyOutOfRange {
                latency,
                max: profile.max_initial_latency,
            });
        }
        if latency < minimum {
            return Err(ConfigError::InitialLatencyTooLow {
                latency,
                minimum,
                bus_clock_hz,
            });
        }

        let double_rate = phy.width == BusWidth::X32;
        let fixed = match fixed_latency {
            Some(false) if profile.is_dual_die() => {
                return Err(ConfigError::DualDieRequiresFixedLatency);
            }
            Some(false) if double_rate => return Err(ConfigError::DoubleRateRequiresFixedLatency),
            Some(fixed) => fixed,
            None => profile.is_dual_die() || double_rate,
        };

        let select_word = CA_HALF_WORDS / ratio;
        let data_word = |k: i64| (2 + k * i64::from(latency)) / i64::from(ratio);
        let sw = i64::from(select_word);
        let tx = i64::from(phy.tx_latency);
        let waits = [
            write_wait(data_word(1), sw, tx),
            write_wait(data_word(2), sw, tx),
        ];

        if waits[1] < 0 {
            return Err(ConfigError::LatencyTooLowForPhy {
                latency,
                tx_latency: phy.tx_latency,
            });
        }
        if !fixed && waits[0] < 0 {
            return Err(ConfigError::PhyRequiresFixedLatency {
                latency,
                tx_latency: phy.tx_latency,
            });
        }
        if !fixed && phy.rx_latency > select_word {
            return Err(ConfigError::RxLatencyRequiresFixedLatency {
                rx_latency: phy.rx_latency,
            });
        }

        let cr0 = cr0_value(latency, fixed).ok_or(ConfigError::InitialLatencyOutOfRange {
            latency,
            max: profile.max_initial_latency,
        })?;

        Ok(Self {
            profile: *profile,
            clock_hz,
            bus_clock_hz,
            initial_latency: latency,
            fixed_latency: fixed,
            cr0,
            phy,
            reset_delay: (clock_hz / RESET_TICK_HZ + 1) as u32,
            select_word,
            write_wait: waits.map(|w| w.max(0) as u32),
            read_wait: [
                read_wait(data_word(1), sw).max(0) as u32,
                read_wait(data_word(2), sw).max(0) as u32,
            ],
        })
    }

    /// Bus clocks per controller cycle.
    pub const fn ratio(&self) -> u32 {
        self.phy.width.ratio()
    }

    /// Cycles spent in the write latency phase after the latency type is known.
    pub const fn write_wait(&self, long: bool) -> u32 {
        self.write_wait[long as usize]
    }

    /// Cycles spent in the read latency phase after the latency type is known.
    pub const fn read_wait(&self, long: bool) -> u32 {
        self.read_wait[long as usize]
    }
}
