//! Register Space Access.
//!
//! Drives configuration-register reads and writes through the controller on behalf of a
//! caller that only sees one 32-bit control/status register. This module provides:
//! 1. **CSR:** Field layout, encode/decode, and the idle-only write rule.
//! 2. **FSM:** `Start` → `WaitCmd` → `WaitWrite` | `WaitRead` → `Start`.
//! 3. **Startup:** Before any caller access, one CR0 write per die, counting `die_nr` down
//!    from the last die to 0, after which `setup_done` releases the crossbar lockout.
//!
//! CSR layout:
//!
//! | Bits   | Field       | Access |
//! |--------|-------------|--------|
//! | 0..15  | `reg_value` | RW     |
//! | 16..18 | `reg_nr`    | RW     |
//! | 19..26 | `reg_type`  | RW     |
//! | 27..28 | `die_nr`    | RW     |
//! | 29     | `we`        | RW     |
//! | 30     | `strobe`    | W, self-clearing |
//! | 31     | `busy`      | R      |

use tracing::{debug, info};

use crate::common::constants::{HALF_WORD_BITS, REG_NR_MASK, REG_TYPE_CONFIG, REG_TYPE_SHIFT};
use crate::phy::BusWidth;
use crate::soc::port::{AddressSpace, BurstType, Command, PortWires, Request, WriteWord};

const REG_NR_SHIFT: u32 = 16;
const REG_TYPE_FIELD_SHIFT: u32 = 19;
const REG_TYPE_FIELD_MASK: u32 = 0xFF;
const DIE_NR_SHIFT: u32 = 27;
const DIE_NR_MASK: u32 = 0x3;
const WE_BIT: u32 = 29;
const STROBE_BIT: u32 = 30;
const BUSY_BIT: u32 = 31;

/// Writable fields of the control/status register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CsrFields {
    /// Value to write, or the value last read.
    pub reg_value: u16,
    /// Register number (3 bits).
    pub reg_nr: u8,
    /// Register type: 0 identification, 1 configuration.
    pub reg_type: u8,
    /// Target die (2 bits).
    pub die_nr: u8,
    /// Write (`true`) or read (`false`).
    pub we: bool,
    /// Start a transaction.
    pub strobe: bool,
}

impl CsrFields {
    /// Packs the fields into the CSR layout (busy clear).
    pub const fn encode(&self) -> u32 {
        self.reg_value as u32
            | ((self.reg_nr as u32 & REG_NR_MASK) << REG_NR_SHIFT)
            | ((self.reg_type as u32 & REG_TYPE_FIELD_MASK) << REG_TYPE_FIELD_SHIFT)
            | ((self.die_nr as u32 & DIE_NR_MASK) << DIE_NR_SHIFT)
            | ((self.we as u32) << WE_BIT)
            | ((self.strobe as u32) << STROBE_BIT)
    }

    /// Unpacks a CSR write; `busy` is ignored.
    pub const fn decode(value: u32) -> Self {
        Self {
            reg_value: value as u16,
            reg_nr: ((value >> REG_NR_SHIFT) & REG_NR_MASK) as u8,
            reg_type: ((value >> REG_TYPE_FIELD_SHIFT) & REG_TYPE_FIELD_MASK) as u8,
            die_nr: ((value >> DIE_NR_SHIFT) & DIE_NR_MASK) as u8,
            we: value & (1 << WE_BIT) != 0,
            strobe: value & (1 << STROBE_BIT) != 0,
        }
    }
}

/// Register-space FSM states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterState {
    /// Idle.
    Start,
    /// Offering the command.
    WaitCmd,
    /// Offering the single write word.
    WaitWrite,
    /// Waiting for the single read word.
    WaitRead,
}

/// Configuration-register client of the controller.
#[derive(Debug, Clone)]
pub struct RegisterSpace {
    fields: CsrFields,
    state: RegisterState,
    setup_done: bool,
    pending: Option<u32>,
    die_shift: u32,
    read_shift: u32,
}

impl RegisterSpace {
    /// Creates the register space in its reset state, with the startup sequence armed.
    ///
    /// # Arguments
    ///
    /// * `cr0` - Configuration value written to every die at startup.
    /// * `banks` - Number of dies.
    /// * `die_shift` - Address bit that selects the die.
    /// * `width` - Port data width; reads capture the most significant half-word.
    pub fn new(cr0: u16, banks: u8, die_shift: u32, width: BusWidth) -> Self {
        Self {
            fields: CsrFields {
                reg_value: cr0,
                reg_nr: 0,
                reg_type: REG_TYPE_CONFIG,
                die_nr: banks.saturating_sub(1),
                we: true,
                strobe: false,
            },
            state: RegisterState::Start,
            setup_done: false,
            pending: None,
            die_shift,
            read_shift: width.data_bits() - HALF_WORD_BITS,
        }
    }

    /// Every die has received its startup CR0 write.
    pub const fn setup_done(&self) -> bool {
        self.setup_done
    }

    /// A transaction is pending or in flight.
    pub const fn busy(&self) -> bool {
        !self.setup_done || self.fields.strobe || !matches!(self.state, RegisterState::Start)
    }

    /// Current FSM state.
    pub const fn state(&self) -> RegisterState {
        self.state
    }

    /// Current field values.
    pub const fn fields(&self) -> &CsrFields {
        &self.fields
    }

    /// Reads the CSR.
    pub const fn read_csr(&self) -> u32 {
        self.fields.encode() | ((self.busy() as u32) << BUSY_BIT)
    }

    /// Writes the CSR. The value is latched on the next clock if the register space is idle
    /// then, and discarded otherwise.
    pub fn write_csr(&mut self, value: u32) {
        self.pending = Some(value);
    }

    fn address(&self) -> u32 {
        (u32::from(self.fields.reg_nr) & REG_NR_MASK)
            | (u32::from(self.fields.reg_type) << REG_TYPE_SHIFT)
            | (u32::from(self.fields.die_nr) << self.die_shift)
    }

    /// Signals driven into the controller port this cycle.
    pub fn request(&self) -> Request {
        match self.state {
            RegisterState::Start => Request::default(),
            RegisterState::WaitCmd => Request {
                cmd: Some(Command {
                    we: self.fields.we,
                    aspace: AddressSpace::Register,
                    burst: BurstType::Linear,
                    addr: self.address(),
                }),
                ..Request::default()
            },
            RegisterState::WaitWrite => Request {
                wdata: Some(WriteWord {
                    data: u32::from(self.fields.reg_value),
                    we: 0xF,
                    last: true,
                }),
                ..Request::default()
            },
            RegisterState::WaitRead => Request {
                rdata_ready: true,
                rdata_last: true,
                ..Request::default()
            },
        }
    }

    /// Advances one cycle.
    ///
    /// # Arguments
    ///
    /// * `wires` - Resolved port signals as seen by this client.
    pub fn clock(&mut self, wires: &PortWires) {
        let idle = !self.busy();
        let next = match self.state {
            RegisterState::Start if !self.setup_done || self.fields.strobe => RegisterState::WaitCmd,
            RegisterState::Start => RegisterState::Start,
            RegisterState::WaitCmd => match wires.cmd_fire() {
                Some(cmd) if cmd.we => RegisterState::WaitWrite,
                Some(_) => RegisterState::WaitRead,
                None => RegisterState::WaitCmd,
            },
            RegisterState::WaitWrite if wires.wdata_fire().is_some() => {
                debug!(
                    die = self.fields.die_nr,
                    value = format_args!("{:#06x}", self.fields.reg_value),
                    "register write complete"
                );
                if !self.setup_done {
                    if self.fields.die_nr == 0 {
                        info!("register space setup complete");
                        self.setup_done = true;
                    } else {
                        self.fields.die_nr -= 1;
                    }
                }
                RegisterState::Start
            }
            RegisterState::WaitWrite => RegisterState::WaitWrite,
            RegisterState::WaitRead => match wires.rdata_fire() {
                Some(word) => {
                    self.fields.reg_value = (word.data >> self.read_shift) as u16;
                    debug!(
                        value = format_args!("{:#06x}", self.fields.reg_value),
                        "register read complete"
                    );
                    RegisterState::Start
                }
                None => RegisterState::WaitRead,
            },
        };

        match self.pending.take() {
            Some(value) if idle => self.fields = CsrFields::decode(value),
            Some(value) => {
                debug!(value = format_args!("{value:#010x}"), "CSR write ignored while busy");
                self.fields.strobe = false;
            }
            None => self.fields.strobe = false,
        }
        self.state = next;
    }
}
