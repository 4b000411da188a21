//! HyperRAM core construction and the top-level `HyperRamCore` type.
//!
//! This module wires the protocol engine together. It performs:
//! 1. **Validation:** Builds the controller, which rejects infeasible configurations.
//! 2. **Composition:** Connects the data port and the register space through the crossbar.
//! 3. **Lockout:** Keeps the data port off the bus until the register space reports setup done.
//! 4. **Addressing:** Scales data-port addresses to 16-bit words on the 32-bit datapath.

use crate::common::error::ConfigError;
use crate::phy::{BusWidth, Phy};
use crate::soc::controller::Controller;
use crate::soc::crossbar::Crossbar;
use crate::soc::devices::DeviceProfile;
use crate::soc::port::{PortWires, Request, Response};
use crate::soc::register_space::RegisterSpace;
use crate::stats::BusStats;

/// Controller, crossbar and register space behind one data port.
#[derive(Debug)]
pub struct HyperRamCore<P: Phy> {
    controller: Controller<P>,
    crossbar: Crossbar,
    registers: RegisterSpace,
}

impl<P: Phy> HyperRamCore<P> {
    /// Builds the core.
    ///
    /// # Arguments
    ///
    /// * `phy` - Physical layer handed to the controller.
    /// * `profile` - Part to drive.
    /// * `clock_hz` - Controller clock.
    /// * `initial_latency` - Override for the initial latency.
    /// * `fixed_latency` - Override for fixed latency.
    ///
    /// # Returns
    ///
    /// The core, or the [`ConfigError`] raised by the controller.
    pub fn new(
        phy: P,
        profile: &DeviceProfile,
        clock_hz: u64,
        initial_latency: Option<u8>,
        fixed_latency: Option<bool>,
    ) -> Result<Self, ConfigError> {
        let controller = Controller::new(phy, profile, clock_hz, initial_latency, fixed_latency)?;
        let timing = controller.timing();
        let registers = RegisterSpace::new(
            timing.cr0,
            profile.banks,
            profile.die_shift(),
            timing.phy.width,
        );
        Ok(Self {
            controller,
            crossbar: Crossbar::new(),
            registers,
        })
    }

    /// The protocol engine.
    pub const fn controller(&self) -> &Controller<P> {
        &self.controller
    }

    /// The arbiter.
    pub const fn crossbar(&self) -> &Crossbar {
        &self.crossbar
    }

    /// The register-space client.
    pub const fn registers(&self) -> &RegisterSpace {
        &self.registers
    }

    /// The register-space client, mutably (CSR writes).
    pub fn registers_mut(&mut self) -> &mut RegisterSpace {
        &mut self.registers
    }

    /// Controller counters.
    pub const fn stats(&self) -> &BusStats {
        self.controller.stats()
    }

    /// Startup configuration has finished and the data port is open.
    pub const fn setup_done(&self) -> bool {
        self.registers.setup_done()
    }

    /// Advances every component by one cycle.
    ///
    /// # Arguments
    ///
    /// * `data` - What the data client drives this cycle.
    ///
    /// # Returns
    ///
    /// What the data client sees this cycle.
    pub fn tick(&mut self, data: &Request) -> Response {
        let ctrl = self.controller.response();
        let reg_req = self.registers.request();

        let mut data_req = *data;
        if self.controller.timing().phy.width == BusWidth::X32 {
            if let Some(cmd) = data_req.cmd.as_mut() {
                cmd.addr <<= 1;
            }
        }

        self.crossbar.set_lockout(!self.registers.setup_done());
        let routed = self.crossbar.route(&ctrl, &data_req, &reg_req);

        self.crossbar.clock(&ctrl, &reg_req);
        self.registers
            .clock(&PortWires::new(reg_req, routed.register));
        self.controller.clock(&routed.controller);

        routed.data
    }
}
