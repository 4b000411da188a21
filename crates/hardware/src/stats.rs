//! Bus statistics collection and reporting.
//!
//! This module tracks what the controller did on the HyperBus. It provides:
//! 1. **Cycles:** Controller cycles elapsed since construction.
//! 2. **Transactions:** Accepted commands by kind (memory read, memory write, register access).
//! 3. **Data:** Words moved and words dropped because the consumer was not ready.
//! 4. **Timing:** Transactions that used the long latency and cycles with the bus clock paused.

use serde::Serialize;

use crate::soc::port::{AddressSpace, Command};

/// Counters maintained by the controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BusStats {
    /// Controller cycles elapsed.
    pub cycles: u64,
    /// Memory read commands accepted.
    pub reads: u64,
    /// Memory write commands accepted.
    pub writes: u64,
    /// Register-space commands accepted (either direction).
    pub register_accesses: u64,
    /// Data words transferred on the port.
    pub words: u64,
    /// Latency phases that used the doubled latency.
    pub long_latency: u64,
    /// Cycles the bus clock was held because no write word was offered.
    pub clock_pauses: u64,
    /// Read words offered while the consumer was not ready.
    pub dropped_reads: u64,
}

impl BusStats {
    /// Counts an accepted command by kind.
    pub fn record_command(&mut self, cmd: &Command) {
        match (cmd.aspace, cmd.we) {
            (AddressSpace::Register, _) => self.register_accesses += 1,
            (AddressSpace::Memory, true) => self.writes += 1,
            (AddressSpace::Memory, false) => self.reads += 1,
        }
    }

    /// Prints every counter to stdout.
    pub fn print(&self) {
        let cyc = self.cycles.max(1);
        println!("\n==========================================================");
        println!("HYPERBUS CONTROLLER STATISTICS");
        println!("==========================================================");
        println!("sim_cycles               {}", self.cycles);
        println!("----------------------------------------------------------");
        println!("TRANSACTIONS");
        println!("  txn.read               {}", self.reads);
        println!("  txn.write              {}", self.writes);
        println!("  txn.register           {}", self.register_accesses);
        println!("  txn.long_latency       {}", self.long_latency);
        println!("----------------------------------------------------------");
        println!("DATA");
        println!(
            "  data.words             {} ({:.2}% of cycles)",
            self.words,
            (self.words as f64 / cyc as f64) * 100.0
        );
        println!("  data.dropped           {}", self.dropped_reads);
        println!("  clock.pauses           {}", self.clock_pauses);
        println!("==========================================================");
    }
}
