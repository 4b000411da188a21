//! Physical Layer Contract.
//!
//! The controller never touches pins directly. Once per controller cycle it hands a
//! [`PhyDrive`] to its [`Phy`] and receives a [`PhySense`] back. This module provides:
//! 1. **Signals:** The per-cycle drive and sense bundles.
//! 2. **Timing:** The PHY's pipeline depths and lane width, fixed for its lifetime.
//! 3. **Implementations:** A behavioural PHY wrapping a simulated device, and the
//!    half-word realigner used by the double-rate variant.
//!
//! Lane packing is the same for both widths: the earlier bus clock occupies the higher
//! half-word of `dq`, the first edge of a bus clock occupies the higher byte, and RWDS bit
//! `n` qualifies `dq` byte `n`.

use serde::{Deserialize, Serialize};

/// Half-word realignment for the double-rate PHY.
pub mod align;
/// Behavioural PHY driving a simulated HyperRAM.
pub mod sim;

pub use align::HalfWordAligner;
pub use sim::SimPhy;

/// Width of the controller datapath.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BusWidth {
    /// One bus clock (16 bits) per controller cycle.
    #[default]
    X16,
    /// Two bus clocks (32 bits) per controller cycle; the bus runs at twice the controller clock.
    X32,
}

impl BusWidth {
    /// Bus clocks transferred per controller cycle.
    pub const fn ratio(self) -> u32 {
        match self {
            Self::X16 => 1,
            Self::X32 => 2,
        }
    }

    /// Width of one port data word in bits.
    pub const fn data_bits(self) -> u32 {
        self.ratio() * 16
    }

    /// Mask covering one port data word.
    pub const fn data_mask(self) -> u32 {
        match self {
            Self::X16 => 0xFFFF,
            Self::X32 => 0xFFFF_FFFF,
        }
    }

    /// Number of RWDS bits per controller cycle (one per data byte).
    pub const fn rwds_bits(self) -> u32 {
        self.ratio() * 2
    }

    /// Mask covering every RWDS bit of one controller cycle.
    pub const fn rwds_mask(self) -> u8 {
        match self {
            Self::X16 => 0b11,
            Self::X32 => 0b1111,
        }
    }

    /// RWDS bit sampled on the first edge of the earliest bus clock in a cycle.
    pub const fn first_strobe(self) -> u8 {
        1 << (self.rwds_bits() - 1)
    }
}

/// Pipeline depths of a PHY, in controller cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PhyTiming {
    /// Cycles from a controller register to the pins.
    pub tx_latency: u32,
    /// Cycles from the pins back to the controller.
    pub rx_latency: u32,
    /// Datapath width.
    pub width: BusWidth,
}

/// Signals the controller drives towards the PHY for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhyDrive {
    /// Chip select, active low.
    pub cs_n: bool,
    /// Device reset, active low.
    pub reset_n: bool,
    /// Bus clock runs during this cycle.
    pub clk_enable: bool,
    /// Data lanes.
    pub dq: u32,
    /// Data lane output enable.
    pub dq_oe: bool,
    /// RWDS lanes.
    pub rwds: u8,
    /// RWDS output enable.
    pub rwds_oe: bool,
}

impl PhyDrive {
    /// Deselected bus with the device held in reset.
    pub const IDLE: Self = Self {
        cs_n: true,
        reset_n: false,
        clk_enable: false,
        dq: 0,
        dq_oe: false,
        rwds: 0,
        rwds_oe: false,
    };
}

impl Default for PhyDrive {
    fn default() -> Self {
        Self::IDLE
    }
}

/// Signals the PHY returns to the controller for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PhySense {
    /// Sampled data lanes.
    pub dq: u32,
    /// Sampled RWDS lanes.
    pub rwds: u8,
    /// The PHY clock generator is stable; device reset may be released.
    pub pll_locked: bool,
}

/// Contract between the controller and a physical layer.
///
/// `step` is called exactly once per controller cycle, after the controller has updated its
/// registers, with the values it drives for the next cycle.
pub trait Phy {
    /// Pipeline depths and lane width.
    fn timing(&self) -> PhyTiming;

    /// Advances the PHY by one controller cycle.
    ///
    /// # Arguments
    ///
    /// * `drive` - Controller outputs for this cycle.
    ///
    /// # Returns
    ///
    /// What the controller samples during this cycle.
    fn step(&mut self, drive: &PhyDrive) -> PhySense;
}
