//! Protocol State Machine.
//!
//! The controller's clocked state is one [`Registers`] value. Each state has its own
//! transition function that receives the current registers, the resolved port wires and the
//! PHY sample, and returns the registers for the next cycle. Nothing here is mutated in place
//! across a cycle boundary, so the comb views in the parent module always see one consistent
//! snapshot.
//!
//! Transaction phases, in order:
//! 1. **`CaWord`:** Drive the CA packet, most significant half-word first.
//! 2. **`SelectOp`:** Branch on the CA packet: read, zero-latency register write, or memory write.
//! 3. **`WriteDelay`/`ReadDelay`:** Sample the RWDS latency indication and load the wait counter.
//! 4. **`Write`/`WriteReg`/`Read`:** Move data words.
//! 5. **`EndWrite`/`EndRead`:** Stop the clock, release the lanes, deselect the device.

use tracing::{debug, trace, warn};

use super::timing::Timing;
use crate::common::constants::{
    CA_HALF_WORDS, CA_INITIAL_CR0_WRITE, CA_LINEAR_BURST_BIT, CA_LOWER_ADDR_BITS,
    CA_LOWER_ADDR_MASK, CA_READ_BIT, CA_REGISTER_SPACE_BIT, CA_UPPER_ADDR_MASK,
    CA_UPPER_ADDR_SHIFT, HALF_WORD_BITS, HALF_WORD_MASK,
};
use crate::phy::PhySense;
use crate::soc::port::{AddressSpace, BurstType, Command, PortWires, WriteWord};
use crate::stats::BusStats;

/// Controller FSM states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Waiting for a command.
    Idle,
    /// Driving CA word `n` (one cycle per word; fewer words on the 32-bit datapath).
    CaWord(u32),
    /// Driving the word that contains bus clock 3 and choosing the transaction path.
    SelectOp,
    /// Memory write: sampling the latency indication.
    WriteDelay,
    /// Memory write: streaming data words.
    Write,
    /// Register write: streaming further words after the zero-latency payload.
    WriteReg,
    /// Closing a write.
    EndWrite,
    /// Read: sampling the latency indication.
    ReadDelay,
    /// Read: collecting strobed words.
    Read,
    /// Deselecting the device.
    EndRead,
}

/// Assembles a CA packet from a command.
///
/// # Arguments
///
/// * `cmd` - Direction, address space, burst type and 16-bit word address.
///
/// # Returns
///
/// The 48-bit packet right-aligned in a `u64`.
pub fn encode_ca(cmd: &Command) -> u64 {
    let addr = u64::from(cmd.addr);
    (u64::from(!cmd.we) << CA_READ_BIT)
        | (u64::from(cmd.aspace == AddressSpace::Register) << CA_REGISTER_SPACE_BIT)
        | (u64::from(cmd.burst == BurstType::Linear) << CA_LINEAR_BURST_BIT)
        | (((addr >> CA_LOWER_ADDR_BITS) & CA_UPPER_ADDR_MASK) << CA_UPPER_ADDR_SHIFT)
        | (addr & CA_LOWER_ADDR_MASK)
}

/// Every clocked register of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    /// Current FSM state.
    pub state: ControllerState,
    /// Down-counter gating every state action.
    pub dlycnt: u32,
    /// Device reset released (active high).
    pub reset_b: bool,
    /// Bus clock enable.
    pub ck: bool,
    /// Chip select, active low.
    pub cs_b: bool,
    /// Data lanes.
    pub dq_out: u32,
    /// Data lane output enable.
    pub dq_oe: bool,
    /// RWDS lanes.
    pub rwds_out: u8,
    /// RWDS output enable.
    pub rwds_oe: bool,
    /// CA packet of the current transaction.
    pub ca: u64,
    /// The construction-time CR0 write has not finished yet.
    pub initial: bool,
}

impl Registers {
    /// Reset values: device held in reset, CR0 write to die 0 queued.
    pub const fn reset(reset_delay: u32) -> Self {
        Self {
            state: ControllerState::CaWord(0),
            dlycnt: reset_delay,
            reset_b: false,
            ck: false,
            cs_b: true,
            dq_out: 0,
            dq_oe: false,
            rwds_out: 0,
            rwds_oe: false,
            ca: CA_INITIAL_CR0_WRITE,
            initial: true,
        }
    }

    /// State actions may run this cycle.
    pub const fn acts(&self) -> bool {
        self.reset_b && self.dlycnt == 0
    }

    /// The current CA packet is a read.
    pub const fn is_read(&self) -> bool {
        self.ca & (1 << CA_READ_BIT) != 0
    }

    /// The current CA packet is a zero-latency register write.
    pub const fn is_register_write(&self) -> bool {
        !self.is_read() && self.ca & (1 << CA_REGISTER_SPACE_BIT) != 0
    }

    /// The construction-time CR0 write still has to be repeated for the second die.
    pub const fn needs_die_repeat(&self, timing: &Timing) -> bool {
        self.initial
            && timing.profile.is_dual_die()
            && self.ca & (1 << timing.profile.ca_die_bit()) == 0
    }
}

/// Inputs and configuration shared by every transition.
#[derive(Debug)]
pub struct Step<'a> {
    /// Controller configuration.
    pub timing: &'a Timing,
    /// Resolved wires of the controller port this cycle.
    pub wires: &'a PortWires,
    /// PHY sample for this cycle.
    pub sense: &'a PhySense,
    /// Counters updated by the transitions.
    pub stats: &'a mut BusStats,
}

impl Step<'_> {

    /// Bus word for controller cycle `index` of the CA phase.
    ///
    /// Bus clocks 0..2 carry CA half-words, bus clock 3 carries `payload`, later clocks carry zero.
    fn bus_word(&self, ca: u64, index: u32, payload: u16) -> u32 {
        let ratio = self.timing.ratio();
        (0..ratio).fold(0u32, |word, h| {
            let clock = index * ratio + h;
            let half = if clock < CA_HALF_WORDS {
                ((ca >> (HALF_WORD_BITS * (CA_HALF_WORDS - 1 - clock))) & u64::from(HALF_WORD_MASK))
                    as u32
            } else if clock == CA_HALF_WORDS {
                u32::from(payload)
            } else {
                0
            };
            word | (half << (HALF_WORD_BITS * (ratio - 1 - h)))
        })
    }

    /// Latency type indicated by the device, or forced by fixed latency.
    fn long_latency(&self) -> bool {
        self.timing.fixed_latency
            || self.sense.rwds & self.timing.phy.width.first_strobe() != 0
    }

    /// Next register values.
    ///
    /// # Arguments
    ///
    /// * `regs` - Current register values.
    ///
    /// # Returns
    ///
    /// Register values for the following cycle.
    pub fn next(&mut self, regs: &Registers) -> Registers {
        let mut next = *regs;

        if regs.dlycnt != 0 {
            next.dlycnt -= 1;
        } else if !regs.reset_b {
            next.dlycnt = self.timing.reset_delay;
            if self.sense.pll_locked {
                debug!("device reset released");
                next.reset_b = true;
            }
        }

        // Lanes turn around the cycle after the last CA half-word, whatever the wait.
        if regs.state == ControllerState::ReadDelay {
            next.dq_oe = false;
        }

        if !regs.acts() {
            return next;
        }

        let next = match regs.state {
            ControllerState::Idle => self.idle(next),
            ControllerState::CaWord(index) => self.ca_word(next, index),
            ControllerState::SelectOp => self.select_op(next),
            ControllerState::WriteDelay => self.write_delay(next),
            ControllerState::Write | ControllerState::WriteReg => self.write(next),
            ControllerState::EndWrite => self.end_write(next),
            ControllerState::ReadDelay => self.read_delay(next),
            ControllerState::Read => self.read(next),
            ControllerState::EndRead => Self::end_read(next),
        };
        if next.state != regs.state {
            trace!(from = ?regs.state, to = ?next.state, "controller transition");
        }
        next
    }

    fn idle(&mut self, mut next: Registers) -> Registers {
        if next.needs_die_repeat(self.timing) {
            next.ca |= 1 << self.timing.profile.ca_die_bit();
            next.state = ControllerState::CaWord(0);
            return next;
        }
        next.initial = false;
        if let Some(cmd) = self.wires.cmd_fire() {
            debug!(
                we = cmd.we,
                aspace = ?cmd.aspace,
                burst = ?cmd.burst,
                addr = format_args!("{:#x}", cmd.addr),
                "transaction start"
            );
            self.stats.record_command(&cmd);
            next.ca = encode_ca(&cmd);
            next.state = ControllerState::CaWord(0);
        }
        next
    }

    fn ca_word(&self, mut next: Registers, index: u32) -> Registers {
        if index == 0 {
            next.cs_b = false;
            next.ck = true;
            next.dq_oe = true;
            next.rwds_out = self.timing.phy.width.rwds_mask();
        }
        next.dq_out = self.bus_word(next.ca, index, 0);
        next.state = if index + 1 < self.timing.select_word {
            ControllerState::CaWord(index + 1)
        } else {
            ControllerState::SelectOp
        };
        next
    }

    fn select_op(&mut self, mut next: Registers) -> Registers {
        let select_word = self.timing.select_word;
        let tx = self.timing.phy.tx_latency;

        if next.is_read() {
            next.dq_out = self.bus_word(next.ca, select_word, 0);
            next.dlycnt = tx + self.timing.phy.rx_latency;
            next.state = ControllerState::ReadDelay;
        } else if next.is_register_write() {
            let word = if next.initial {
                Some(WriteWord {
                    data: u32::from(self.timing.cr0),
                    we: 0b11,
                    last: true,
                })
            } else {
                self.wires.wdata_fire()
            };
            match word {
                Some(word) => {
                    if !next.initial {
                        self.stats.words += 1;
                    }
                    next.ck = true;
                    next.dq_out = self.bus_word(next.ca, select_word, word.data as u16);
                    next.state = if word.last {
                        ControllerState::EndWrite
                    } else {
                        ControllerState::WriteReg
                    };
                }
                None => {
                    self.stats.clock_pauses += 1;
                    next.ck = false;
                }
            }
        } else {
            next.dq_out = self.bus_word(next.ca, select_word, 0);
            next.dlycnt = tx;
            next.state = ControllerState::WriteDelay;
        }
        next
    }

    fn write_delay(&mut self, mut next: Registers) -> Registers {
        let long = self.long_latency();
        if long {
            self.stats.long_latency += 1;
        }
        next.rwds_oe = true;
        next.dq_out = 0;
        next.dlycnt = self.timing.write_wait(long);
        next.state = ControllerState::Write;
        next
    }

    fn write(&mut self, mut next: Registers) -> Registers {
        match self.wires.wdata_fire() {
            Some(word) => {
                self.stats.words += 1;
                next.ck = true;
                next.dq_out = word.data & self.timing.phy.width.data_mask();
                next.rwds_out = !word.we & self.timing.phy.width.rwds_mask();
                if word.last {
                    next.state = ControllerState::EndWrite;
                }
            }
            None => {
                self.stats.clock_pauses += 1;
                next.ck = false;
            }
        }
        next
    }

    fn end_write(&self, mut next: Registers) -> Registers {
        next.ck = false;
        next.rwds_out = self.timing.phy.width.rwds_mask();
        next.dlycnt = self.timing.phy.tx_latency;
        next.state = ControllerState::EndRead;
        next
    }

    fn read_delay(&mut self, mut next: Registers) -> Registers {
        let long = self.long_latency();
        if long {
            self.stats.long_latency += 1;
        }
        next.dlycnt = self.timing.read_wait(long);
        next.state = ControllerState::Read;
        next
    }

    fn read(&mut self, mut next: Registers) -> Registers {
        if self.wires.resp.rdata.is_none() {
            return next;
        }
        if self.wires.rdata_fire().is_none() {
            self.stats.dropped_reads += 1;
            warn!("read word dropped: port not ready");
            return next;
        }
        self.stats.words += 1;
        if self.wires.req.rdata_last {
            next.ck = false;
            next.dlycnt = self.timing.phy.tx_latency;
            next.state = ControllerState::EndRead;
        }
        next
    }

    fn end_read(mut next: Registers) -> Registers {
        next.rwds_oe = false;
        next.dq_oe = false;
        next.cs_b = true;
        next.state = ControllerState::Idle;
        debug!(ca = format_args!("{:#014x}", next.ca), "transaction end");
        next
    }
}
