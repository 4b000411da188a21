//! Simulator: owns a core and the traffic driver on its data port.
//!
//! Every harness wait is bounded by the configured cycle budget and fails with
//! [`SimError::CycleBudgetExceeded`] when it runs out. The engine itself never times out.

use tracing::{debug, info};

use super::driver::{Completion, DataPortDriver, Operation};
use crate::common::constants::REG_TYPE_CONFIG;
use crate::common::error::SimError;
use crate::config::Config;
use crate::phy::{Phy, SimPhy};
use crate::soc::HyperRamCore;
use crate::soc::controller::fsm::ControllerState;
use crate::soc::devices;
use crate::soc::memory::HyperRamDevice;
use crate::soc::port::PortWires;
use crate::soc::register_space::CsrFields;

/// Top-level simulator: protocol engine plus data-port driver.
#[derive(Debug)]
pub struct Simulator<P: Phy = SimPhy> {
    /// The composed engine.
    pub core: HyperRamCore<P>,
    driver: DataPortDriver,
    cycle_budget: u64,
}

impl Simulator<SimPhy> {
    /// Builds a simulator with a behavioural PHY and device from configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Part, clock, latency overrides, PHY and harness settings.
    ///
    /// # Returns
    ///
    /// The simulator, or the [`SimError`] raised while building it.
    pub fn from_config(config: &Config) -> Result<Self, SimError> {
        let profile = devices::lookup(&config.device)?;
        let mut device = HyperRamDevice::new(profile, config.phy.width)?;
        device.set_refresh_collision(config.sim.refresh_collision);
        let phy = SimPhy::new(
            config.phy.timing(),
            config.phy.pll_lock_cycles,
            config.phy.half_word_skew,
            device,
        );
        let core = HyperRamCore::new(
            phy,
            profile,
            config.clock_hz,
            config.initial_latency,
            config.fixed_latency,
        )?;
        Ok(Self::new(core, config.sim.cycle_budget))
    }
}

impl<P: Phy> Simulator<P> {
    /// Wraps an existing core.
    pub fn new(core: HyperRamCore<P>, cycle_budget: u64) -> Self {
        let data_bits = core.controller().timing().phy.width.data_bits();
        Self {
            core,
            driver: DataPortDriver::new(data_bits),
            cycle_budget,
        }
    }

    /// Advances the core and the driver by one cycle.
    pub fn step(&mut self) {
        let req = self.driver.request();
        let resp = self.core.tick(&req);
        self.driver.clock(&PortWires::new(req, resp));
    }

    fn run_until(&mut self, mut done: impl FnMut(&mut Self) -> bool) -> Result<u64, SimError> {
        for cycle in 0..self.cycle_budget {
            if done(self) {
                return Ok(cycle);
            }
            self.step();
        }
        if done(self) {
            return Ok(self.cycle_budget);
        }
        Err(SimError::CycleBudgetExceeded {
            budget: self.cycle_budget,
        })
    }

    /// Runs until the controller is back in `Idle` with the construction-time writes done.
    ///
    /// The last word of a write is still in the tx pipeline when its port handshake completes;
    /// the controller only returns to `Idle` after it has reached the pins.
    fn run_until_bus_idle(&mut self) -> Result<u64, SimError> {
        self.run_until(|sim| {
            let ctrl = sim.core.controller();
            ctrl.state() == ControllerState::Idle && !ctrl.registers().initial
        })
    }

    /// Runs until the startup configuration has reached every die.
    ///
    /// # Returns
    ///
    /// Cycles spent, or [`SimError::CycleBudgetExceeded`].
    pub fn run_until_setup(&mut self) -> Result<u64, SimError> {
        let cycles = self.run_until(|sim| sim.core.setup_done())? + self.run_until_bus_idle()?;
        info!(cycles, "setup complete");
        Ok(cycles)
    }

    /// Runs one data-port operation to completion and waits for the bus to go idle.
    ///
    /// # Arguments
    ///
    /// * `op` - The operation; empty operations complete immediately.
    ///
    /// # Returns
    ///
    /// Its completion, or [`SimError::CycleBudgetExceeded`].
    pub fn execute(&mut self, op: Operation) -> Result<Completion, SimError> {
        match &op {
            Operation::Write { addr, words, .. } if words.is_empty() => {
                return Ok(Completion::Written { addr: *addr, len: 0 });
            }
            Operation::Read { addr, len: 0 } => {
                return Ok(Completion::Read {
                    addr: *addr,
                    data: Vec::new(),
                });
            }
            _ => {}
        }
        self.driver.submit(op);
        let mut completion = None;
        self.run_until(|sim| {
            completion = completion.take().or_else(|| sim.driver.take_completion());
            completion.is_some()
        })?;
        self.run_until_bus_idle()?;
        completion.ok_or(SimError::CycleBudgetExceeded {
            budget: self.cycle_budget,
        })
    }

    /// Writes `words` starting at port word `addr`.
    pub fn write(&mut self, addr: u32, words: &[u32]) -> Result<(), SimError> {
        self.execute(Operation::write(addr, words)).map(|_| ())
    }

    /// Reads `len` words starting at port word `addr`.
    pub fn read(&mut self, addr: u32, len: usize) -> Result<Vec<u32>, SimError> {
        match self.execute(Operation::read(addr, len))? {
            Completion::Read { data, .. } => Ok(data),
            Completion::Written { .. } => Ok(Vec::new()),
        }
    }

    fn register_access(&mut self, fields: CsrFields) -> Result<u16, SimError> {
        self.run_until(|sim| !sim.core.registers().busy())?;
        self.core.registers_mut().write_csr(fields.encode());
        self.step();
        self.run_until(|sim| !sim.core.registers().busy())?;
        self.run_until_bus_idle()?;
        let value = self.core.registers().fields().reg_value;
        debug!(
            die = fields.die_nr,
            reg_type = fields.reg_type,
            reg_nr = fields.reg_nr,
            we = fields.we,
            value = format_args!("{value:#06x}"),
            "register access"
        );
        Ok(value)
    }

    /// Writes a configuration register through the register space.
    pub fn write_register(&mut self, die: u8, reg_nr: u8, value: u16) -> Result<(), SimError> {
        self.register_access(CsrFields {
            reg_value: value,
            reg_nr,
            reg_type: REG_TYPE_CONFIG,
            die_nr: die,
            we: true,
            strobe: true,
        })
        .map(|_| ())
    }

    /// Reads a register of the given type through the register space.
    pub fn read_register(&mut self, die: u8, reg_type: u8, reg_nr: u8) -> Result<u16, SimError> {
        self.register_access(CsrFields {
            reg_value: 0,
            reg_nr,
            reg_type,
            die_nr: die,
            we: false,
            strobe: true,
        })
    }
}
