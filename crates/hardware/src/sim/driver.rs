//! Data-port traffic driver.
//!
//! Plays a queue of memory operations into the data port of a core, one transaction at a
//! time, and records what completed. It stands in for the bus adapter that would normally
//! sit in front of the port.

use std::collections::VecDeque;

use tracing::trace;

use crate::soc::port::{Command, PortWires, Request, WriteWord};

/// One data-port transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Linear write of `words` starting at `addr`.
    Write {
        /// Port word address.
        addr: u32,
        /// Data words, right-aligned in the port width.
        words: Vec<u32>,
        /// Byte enables per word; all bytes when shorter than `words`.
        masks: Vec<u8>,
    },
    /// Linear read of `len` words starting at `addr`.
    Read {
        /// Port word address.
        addr: u32,
        /// Number of words.
        len: usize,
    },
}

impl Operation {
    /// Write with every byte enabled.
    pub fn write(addr: u32, words: &[u32]) -> Self {
        Self::Write {
            addr,
            words: words.to_vec(),
            masks: Vec::new(),
        }
    }

    /// Read of `len` words.
    pub const fn read(addr: u32, len: usize) -> Self {
        Self::Read { addr, len }
    }

    fn command(&self) -> Command {
        match self {
            Self::Write { addr, .. } => Command::write(*addr),
            Self::Read { addr, .. } => Command::read(*addr),
        }
    }
}

/// A finished operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// All words of a write were accepted.
    Written {
        /// Port word address.
        addr: u32,
        /// Words written.
        len: usize,
    },
    /// All words of a read arrived.
    Read {
        /// Port word address.
        addr: u32,
        /// Received words in order.
        data: Vec<u32>,
    },
}

#[derive(Debug)]
struct Active {
    op: Operation,
    index: usize,
    received: Vec<u32>,
}

/// Single-outstanding-transaction client of a data port.
#[derive(Debug, Default)]
pub struct DataPortDriver {
    queue: VecDeque<Operation>,
    active: Option<Active>,
    completed: VecDeque<Completion>,
    byte_mask: u8,
}

impl DataPortDriver {
    /// Creates an idle driver for a port carrying `data_bits`-wide words.
    pub fn new(data_bits: u32) -> Self {
        Self {
            byte_mask: ((1u32 << (data_bits / 8)) - 1) as u8,
            ..Self::default()
        }
    }

    /// Appends an operation.
    pub fn submit(&mut self, op: Operation) {
        self.queue.push_back(op);
    }

    /// Returns `true` while operations are queued or in flight.
    pub fn is_busy(&self) -> bool {
        self.active.is_some() || !self.queue.is_empty()
    }

    /// Removes the oldest completion.
    pub fn take_completion(&mut self) -> Option<Completion> {
        self.completed.pop_front()
    }

    /// Signals driven into the data port this cycle.
    pub fn request(&self) -> Request {
        let Some(active) = &self.active else {
            return self
                .queue
                .front()
                .map(|op| Request {
                    cmd: Some(op.command()),
                    ..Request::default()
                })
                .unwrap_or_default();
        };
        match &active.op {
            Operation::Write { words, masks, .. } => Request {
                wdata: words.get(active.index).map(|&data| WriteWord {
                    data,
                    we: masks.get(active.index).copied().unwrap_or(self.byte_mask),
                    last: active.index + 1 == words.len(),
                }),
                ..Request::default()
            },
            Operation::Read { len, .. } => Request {
                rdata_ready: true,
                rdata_last: active.received.len() + 1 >= *len,
                ..Request::default()
            },
        }
    }

    /// Advances one cycle.
    ///
    /// # Arguments
    ///
    /// * `wires` - Resolved data-port signals this cycle.
    pub fn clock(&mut self, wires: &PortWires) {
        if self.active.is_none() && wires.cmd_fire().is_some() {
            if let Some(op) = self.queue.pop_front() {
                trace!(?op, "data port command accepted");
                self.active = Some(Active {
                    op,
                    index: 0,
                    received: Vec::new(),
                });
            }
        }
        let Some(active) = self.active.as_mut() else {
            return;
        };

        let done = match &active.op {
            Operation::Write { addr, words, .. } => {
                if wires.wdata_fire().is_some() {
                    active.index += 1;
                }
                (active.index == words.len()).then(|| Completion::Written {
                    addr: *addr,
                    len: words.len(),
                })
            }
            Operation::Read { addr, len } => {
                if let Some(word) = wires.rdata_fire() {
                    active.received.push(word.data);
                }
                (active.received.len() >= *len).then(|| Completion::Read {
                    addr: *addr,
                    data: std::mem::take(&mut active.received),
                })
            }
        };
        if let Some(done) = done {
            self.completed.push_back(done);
            self.active = None;
        }
    }
}
