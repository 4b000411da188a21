//! Behavioural HyperRAM Device.
//!
//! A pin-level model of one HyperRAM package (one or two dies behind a shared chip select).
//! It counts clocked half-words from the falling edge of chip select and reacts to each:
//! 1. **Command-Address:** Half-words 0..2 assemble the 48-bit CA packet. While the packet is
//!    being received, RWDS indicates whether this transaction uses double latency.
//! 2. **Register Write:** A write to register space takes its value from half-word 3; no
//!    latency is inserted.
//! 3. **Latency:** Memory accesses and register reads start their data phase at half-word
//!    `2 + k * IL`, with `IL` and fixed latency taken from the addressed die's CR0 and `k = 2`
//!    when double latency was indicated.
//! 4. **Data:** Reads drive a strobe on RWDS for every data half-word. Writes sample RWDS as an
//!    active-high byte mask. Wrapped bursts wrap inside the length selected by CR0.

use tracing::debug;

use super::buffer::WordBuffer;
use crate::common::constants::{
    CA_HALF_WORDS, CA_LINEAR_BURST_BIT, CA_LOWER_ADDR_BITS, CA_LOWER_ADDR_MASK, CA_READ_BIT,
    CA_REGISTER_SPACE_BIT, CA_UPPER_ADDR_MASK, CA_UPPER_ADDR_SHIFT, CR0_BURST_LENGTH_MASK,
    CR0_DEVICE_DEFAULT, CR0_FIXED_LATENCY, CR0_LATENCY_MASK, CR0_LATENCY_SHIFT,
    CR1_DEVICE_DEFAULT, HALF_WORD_BITS, HALF_WORD_MASK, LATENCY_CODES, MIN_INITIAL_LATENCY,
    REG_NR_MASK, REG_TYPE_CONFIG, REG_TYPE_ID, REG_TYPE_MASK, REG_TYPE_SHIFT, RWDS_BITS_PER_HALF,
};
use crate::common::error::SimError;
use crate::phy::{BusWidth, PhyDrive};
use crate::soc::devices::DeviceProfile;

/// Manufacturer and density identification.
const ID0: u16 = 0x0C81;
/// Secondary identification.
const ID1: u16 = 0x0001;
/// Last half-word index during which RWDS carries the latency indication.
const LATENCY_WINDOW_END: u32 = 3;
/// Half-word index carrying a zero-latency register write value.
const REGISTER_WRITE_SLOT: u32 = 3;
/// RWDS pattern of one strobed half-word.
const STROBE: u8 = 0b11;

/// One register write observed by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterWrite {
    /// Die the write was addressed to.
    pub die: u8,
    /// Register type field of the address.
    pub reg_type: u8,
    /// Register number field of the address.
    pub reg_nr: u8,
    /// Written value.
    pub value: u16,
}

/// What the device drives onto the bus during one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceOutput {
    /// Data lanes.
    pub dq: u32,
    /// Device drives the data lanes.
    pub dq_oe: bool,
    /// RWDS lanes.
    pub rwds: u8,
    /// Device drives RWDS.
    pub rwds_oe: bool,
}

/// Decoded fields of a CA packet.
#[derive(Debug, Clone, Copy)]
struct Transaction {
    read: bool,
    register: bool,
    linear: bool,
    addr: u32,
}

impl Transaction {
    const fn decode(ca: u64) -> Self {
        let upper = (ca >> CA_UPPER_ADDR_SHIFT) & CA_UPPER_ADDR_MASK;
        let addr = (upper << CA_LOWER_ADDR_BITS) | (ca & CA_LOWER_ADDR_MASK);
        Self {
            read: ca & (1 << CA_READ_BIT) != 0,
            register: ca & (1 << CA_REGISTER_SPACE_BIT) != 0,
            linear: ca & (1 << CA_LINEAR_BURST_BIT) != 0,
            addr: addr as u32,
        }
    }
}

#[derive(Debug)]
struct Die {
    storage: WordBuffer,
    cr0: u16,
    cr1: u16,
}

impl Die {
    fn initial_latency(&self) -> u32 {
        let code = (self.cr0 >> CR0_LATENCY_SHIFT) & CR0_LATENCY_MASK;
        LATENCY_CODES
            .iter()
            .position(|&c| c == code)
            .map_or(6, |i| i as u32 + MIN_INITIAL_LATENCY as u32)
    }

    const fn fixed_latency(&self) -> bool {
        self.cr0 & CR0_FIXED_LATENCY != 0
    }

    const fn burst_words(&self) -> u32 {
        match self.cr0 & CR0_BURST_LENGTH_MASK {
            0b00 => 64,
            0b01 => 32,
            0b10 => 8,
            _ => 16,
        }
    }
}

/// A HyperRAM package attached to a simulated PHY.
#[derive(Debug)]
pub struct HyperRamDevice {
    profile: DeviceProfile,
    width: BusWidth,
    dies: Vec<Die>,
    refresh_collision: bool,
    selected: bool,
    clocks: u32,
    ca: u64,
    double_latency: bool,
    register_writes: Vec<RegisterWrite>,
}

impl HyperRamDevice {
    /// Creates a package with every die in its reset state.
    ///
    /// # Arguments
    ///
    /// * `profile` - Part geometry; one die per bank.
    /// * `width` - Number of half-words the PHY presents per cycle.
    ///
    /// # Returns
    ///
    /// The device, or [`SimError::Allocation`] if a die's storage could not be mapped.
    pub fn new(profile: &DeviceProfile, width: BusWidth) -> Result<Self, SimError> {
        let dies = (0..profile.banks)
            .map(|_| {
                Ok(Die {
                    storage: WordBuffer::new(profile.words_per_die() as usize)?,
                    cr0: CR0_DEVICE_DEFAULT,
                    cr1: CR1_DEVICE_DEFAULT,
                })
            })
            .collect::<Result<Vec<_>, SimError>>()?;
        Ok(Self {
            profile: *profile,
            width,
            dies,
            refresh_collision: false,
            selected: false,
            clocks: 0,
            ca: 0,
            double_latency: false,
            register_writes: Vec::new(),
        })
    }

    /// Forces every following transaction to request double latency, as an ongoing refresh would.
    pub fn set_refresh_collision(&mut self, collide: bool) {
        self.refresh_collision = collide;
    }

    /// Every register write received since construction, in bus order.
    pub fn register_writes(&self) -> &[RegisterWrite] {
        &self.register_writes
    }

    /// Current CR0 of `die`, if the die exists.
    pub fn cr0(&self, die: usize) -> Option<u16> {
        self.dies.get(die).map(|d| d.cr0)
    }

    /// Reads a memory word directly, bypassing the bus.
    pub fn peek(&self, addr: u32) -> u16 {
        let (die, offset) = self.split(addr);
        self.dies.get(die).map_or(0, |d| d.storage.read(offset))
    }

    /// Writes a memory word directly, bypassing the bus.
    pub fn poke(&mut self, addr: u32, value: u16) {
        let (die, offset) = self.split(addr);
        if let Some(d) = self.dies.get_mut(die) {
            d.storage.write(offset, value, 0b11);
        }
    }

    /// Processes one cycle of pin activity.
    ///
    /// # Arguments
    ///
    /// * `pins` - Controller outputs as they arrive at the package.
    ///
    /// # Returns
    ///
    /// The device's own outputs for the same cycle.
    pub fn clock(&mut self, pins: &PhyDrive) -> DeviceOutput {
        if !pins.reset_n {
            self.reset();
            return DeviceOutput::default();
        }
        if pins.cs_n {
            self.selected = false;
            self.clocks = 0;
            self.ca = 0;
            return DeviceOutput::default();
        }
        if !self.selected {
            self.selected = true;
            self.double_latency =
                self.refresh_collision || self.dies.iter().any(Die::fixed_latency);
        }
        if !pins.clk_enable {
            return DeviceOutput::default();
        }

        let ratio = self.width.ratio();
        let mut out = DeviceOutput::default();
        for h in 0..ratio {
            let dq_shift = HALF_WORD_BITS * (ratio - 1 - h);
            let rwds_shift = RWDS_BITS_PER_HALF * (ratio - 1 - h);
            let half = ((pins.dq >> dq_shift) & HALF_WORD_MASK) as u16;
            let strobe = (pins.rwds >> rwds_shift) & STROBE;
            let index = self.clocks;
            self.clocks += 1;

            let (dq, rwds) = self.half_clock(index, half, strobe);
            if let Some(dq) = dq {
                out.dq |= u32::from(dq) << dq_shift;
                out.dq_oe = true;
            }
            if let Some(rwds) = rwds {
                out.rwds |= rwds << rwds_shift;
                out.rwds_oe = true;
            }
        }
        out
    }

    fn half_clock(&mut self, index: u32, half: u16, strobe: u8) -> (Option<u16>, Option<u8>) {
        let indicator = (index <= LATENCY_WINDOW_END)
            .then_some(if self.double_latency { STROBE } else { 0 });

        if index < CA_HALF_WORDS {
            self.ca |= u64::from(half) << (HALF_WORD_BITS * (CA_HALF_WORDS - 1 - index));
            return (None, indicator);
        }

        let txn = Transaction::decode(self.ca);
        if txn.register && !txn.read {
            if index == REGISTER_WRITE_SLOT {
                self.write_register(txn.addr, half);
            }
            return (None, indicator);
        }

        let (die, _) = self.split(txn.addr);
        let Some(target) = self.dies.get(die) else {
            return (None, indicator);
        };
        let k = if self.double_latency { 2 } else { 1 };
        let start = 2 + k * target.initial_latency();
        if index < start {
            return (None, indicator);
        }

        let n = index - start;
        let addr = if txn.linear {
            txn.addr.wrapping_add(n)
        } else {
            let len = target.burst_words();
            (txn.addr & !(len - 1)) | (txn.addr.wrapping_add(n) & (len - 1))
        };

        if txn.read {
            let value = if txn.register {
                self.read_register(txn.addr)
            } else {
                self.peek(addr)
            };
            (Some(value), Some(STROBE))
        } else {
            let (die, offset) = self.split(addr);
            if let Some(d) = self.dies.get_mut(die) {
                d.storage.write(offset, half, !strobe & STROBE);
            }
            (None, None)
        }
    }

    fn split(&self, addr: u32) -> (usize, usize) {
        let shift = self.profile.die_shift();
        let offset = addr & (self.profile.words_per_die() - 1);
        ((addr >> shift) as usize, offset as usize)
    }

    fn decode_register(&self, addr: u32) -> (u8, u8, u8) {
        let die = (addr >> self.profile.die_shift()) as u8;
        let reg_type = ((addr >> REG_TYPE_SHIFT) & REG_TYPE_MASK) as u8;
        let reg_nr = (addr & REG_NR_MASK) as u8;
        (die, reg_type, reg_nr)
    }

    fn read_register(&self, addr: u32) -> u16 {
        let (die, reg_type, reg_nr) = self.decode_register(addr);
        let Some(d) = self.dies.get(die as usize) else {
            return 0;
        };
        match (reg_type, reg_nr) {
            (REG_TYPE_ID, 0) => ID0,
            (REG_TYPE_ID, 1) => ID1,
            (REG_TYPE_CONFIG, 0) => d.cr0,
            (REG_TYPE_CONFIG, 1) => d.cr1,
            _ => 0,
        }
    }

    fn write_register(&mut self, addr: u32, value: u16) {
        let (die, reg_type, reg_nr) = self.decode_register(addr);
        debug!(die, reg_type, reg_nr, value = format_args!("{value:#06x}"), "register write");
        self.register_writes.push(RegisterWrite {
            die,
            reg_type,
            reg_nr,
            value,
        });
        let Some(d) = self.dies.get_mut(die as usize) else {
            return;
        };
        match (reg_type, reg_nr) {
            (REG_TYPE_CONFIG, 0) => d.cr0 = value,
            (REG_TYPE_CONFIG, 1) => d.cr1 = value,
            _ => {}
        }
    }

    fn reset(&mut self) {
        for die in &mut self.dies {
            die.cr0 = CR0_DEVICE_DEFAULT;
            die.cr1 = CR1_DEVICE_DEFAULT;
        }
        self.selected = false;
        self.clocks = 0;
        self.ca = 0;
    }
}
