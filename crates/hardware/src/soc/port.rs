//! Native port signal model.
//!
//! Every component talks to the controller through the same three-channel port:
//! 1. **cmd:** one command per transaction (direction, address space, burst type, address).
//! 2. **wdata:** a burst of write words terminated by `last`.
//! 3. **rdata:** a burst of read words; the consumer marks the final word it expects with `last`.
//!
//! Each channel is a single-item handshake: the producer offers an item (`Some`), the consumer
//! asserts ready, and the item transfers only when both hold in the same cycle. The signals are
//! re-derived every cycle from component state; nothing here is persisted between cycles.

/// Target address space of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressSpace {
    /// Main memory array.
    #[default]
    Memory,
    /// Identification and configuration registers.
    Register,
}

/// Burst addressing of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BurstType {
    /// Wraps inside the burst length configured in CR0.
    Wrapped,
    /// Increments linearly for the whole transaction.
    #[default]
    Linear,
}

/// One item on the `cmd` channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Command {
    /// `true` for a write transaction.
    pub we: bool,
    /// Memory array or register space.
    pub aspace: AddressSpace,
    /// Wrapped or linear burst.
    pub burst: BurstType,
    /// Address in 16-bit words.
    pub addr: u32,
}

impl Command {
    /// Linear memory read starting at `addr`.
    pub const fn read(addr: u32) -> Self {
        Self {
            we: false,
            aspace: AddressSpace::Memory,
            burst: BurstType::Linear,
            addr,
        }
    }

    /// Linear memory write starting at `addr`.
    pub const fn write(addr: u32) -> Self {
        Self {
            we: true,
            aspace: AddressSpace::Memory,
            burst: BurstType::Linear,
            addr,
        }
    }
}

/// One item on the `wdata` channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteWord {
    /// Data, right-aligned in the port width.
    pub data: u32,
    /// Per-byte write enable, bit `n` for byte `n` of `data`.
    pub we: u8,
    /// Final word of the burst.
    pub last: bool,
}

/// One item on the `rdata` channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadWord {
    /// Data, right-aligned in the port width.
    pub data: u32,
}

/// Signals a client drives into a port during one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Request {
    /// Command offered on `cmd`.
    pub cmd: Option<Command>,
    /// Word offered on `wdata`.
    pub wdata: Option<WriteWord>,
    /// Client accepts a word on `rdata`.
    pub rdata_ready: bool,
    /// The word accepted this cycle is the last one the client expects.
    pub rdata_last: bool,
}

/// Signals the controller side drives back into a port during one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Response {
    /// A command is accepted this cycle if offered.
    pub cmd_ready: bool,
    /// A write word is accepted this cycle if offered.
    pub wdata_ready: bool,
    /// Word offered on `rdata`.
    pub rdata: Option<ReadWord>,
}

impl Response {
    /// All ready and valid lines low; what a deselected port sees.
    pub const IDLE: Self = Self {
        cmd_ready: false,
        wdata_ready: false,
        rdata: None,
    };
}

/// Fully resolved wires of one port for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PortWires {
    /// Client side.
    pub req: Request,
    /// Controller side.
    pub resp: Response,
}

impl PortWires {
    /// Joins both halves of a port.
    pub const fn new(req: Request, resp: Response) -> Self {
        Self { req, resp }
    }

    /// The command transferred this cycle, if any.
    pub fn cmd_fire(&self) -> Option<Command> {
        self.req.cmd.filter(|_| self.resp.cmd_ready)
    }

    /// The write word transferred this cycle, if any.
    pub fn wdata_fire(&self) -> Option<WriteWord> {
        self.req.wdata.filter(|_| self.resp.wdata_ready)
    }

    /// The read word transferred this cycle, if any.
    pub fn rdata_fire(&self) -> Option<ReadWord> {
        self.resp.rdata.filter(|_| self.req.rdata_ready)
    }
}
