//! Behavioural PHY.
//!
//! Wraps a [`HyperRamDevice`] between two fixed-depth pipelines, standing in for the DDR I/O
//! cells and the PLL of a real PHY. Per controller cycle it:
//! 1. **Transmits:** Pushes the controller's outputs into the tx pipeline and applies the
//!    oldest entry to the package pins.
//! 2. **Resolves:** Lets the device react and resolves each shared lane to whichever side
//!    has its output enabled (controller first).
//! 3. **Receives:** Delays the resolved lanes through the rx pipeline, optionally skews them
//!    by one half-word, and realigns them in the double-rate variant.
//! 4. **Locks:** Reports `pll_locked` once the configured number of cycles has elapsed.

use std::collections::VecDeque;

use super::align::{HalfWordAligner, splice};
use super::{BusWidth, Phy, PhyDrive, PhySense, PhyTiming};
use crate::soc::memory::HyperRamDevice;

/// Simulated PHY with a HyperRAM package on its pins.
#[derive(Debug)]
pub struct SimPhy {
    timing: PhyTiming,
    device: HyperRamDevice,
    tx: VecDeque<PhyDrive>,
    rx: VecDeque<(u32, u8)>,
    pll_lock_cycles: u64,
    cycles: u64,
    skew: Option<(u32, u8)>,
    aligner: Option<HalfWordAligner>,
}

impl SimPhy {
    /// Creates a PHY around `device`.
    ///
    /// # Arguments
    ///
    /// * `timing` - Pipeline depths and lane width.
    /// * `pll_lock_cycles` - Cycles before `pll_locked` is reported.
    /// * `half_word_skew` - Delay the receive path by one half-word (double-rate only).
    /// * `device` - The package on the pins.
    pub fn new(
        timing: PhyTiming,
        pll_lock_cycles: u64,
        half_word_skew: bool,
        device: HyperRamDevice,
    ) -> Self {
        let double_rate = timing.width == BusWidth::X32;
        Self {
            timing,
            device,
            tx: std::iter::repeat_n(PhyDrive::IDLE, timing.tx_latency as usize).collect(),
            rx: std::iter::repeat_n((0, 0), timing.rx_latency as usize).collect(),
            pll_lock_cycles,
            cycles: 0,
            skew: (double_rate && half_word_skew).then_some((0, 0)),
            aligner: double_rate.then(HalfWordAligner::new),
        }
    }

    /// The attached package.
    pub const fn device(&self) -> &HyperRamDevice {
        &self.device
    }

    /// The attached package, mutably.
    pub fn device_mut(&mut self) -> &mut HyperRamDevice {
        &mut self.device
    }

    /// Returns `true` if the realigner currently applies a half-word shift.
    pub fn is_realigned(&self) -> bool {
        self.aligner.is_some_and(|a| a.is_shifted())
    }
}

impl Phy for SimPhy {
    fn timing(&self) -> PhyTiming {
        self.timing
    }

    fn step(&mut self, drive: &PhyDrive) -> PhySense {
        self.tx.push_back(*drive);
        let pins = self.tx.pop_front().unwrap_or(*drive);

        let out = self.device.clock(&pins);
        let dq = if pins.dq_oe {
            pins.dq
        } else if out.dq_oe {
            out.dq
        } else {
            0
        };
        let rwds = if pins.rwds_oe {
            pins.rwds
        } else if out.rwds_oe {
            out.rwds
        } else {
            0
        };

        let lanes = self.timing.width;
        self.rx
            .push_back((dq & lanes.data_mask(), rwds & lanes.rwds_mask()));
        let mut sampled = self.rx.pop_front().unwrap_or((0, 0));

        if let Some(held) = self.skew.as_mut() {
            let prev = std::mem::replace(held, sampled);
            sampled = splice(prev, sampled);
        }
        if let Some(aligner) = self.aligner.as_mut() {
            sampled = aligner.align(drive.cs_n, sampled.0, sampled.1);
        }

        let pll_locked = self.cycles >= self.pll_lock_cycles;
        self.cycles += 1;

        PhySense {
            dq: sampled.0,
            rwds: sampled.1,
            pll_locked,
        }
    }
}
