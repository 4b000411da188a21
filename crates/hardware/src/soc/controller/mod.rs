//! HyperBus Controller.
//!
//! The controller owns the PHY and exposes one native port. It is modelled as a clocked
//! register set with combinational views:
//! 1. **`response`:** Port ready/valid lines derived from the registers and the latest PHY sample.
//! 2. **`drive`:** PHY outputs derived from the registers.
//! 3. **`clock`:** One register update per cycle, followed by exactly one PHY step.
//!
//! All configuration checks happen in [`Controller::new`]; afterwards the controller has no
//! error path. A device that never strobes RWDS leaves it waiting in `Read` forever.

/// Protocol state machine and its clocked registers.
pub mod fsm;
/// Latency derivation, validation and CR0.
pub mod timing;

use tracing::info;

use self::fsm::{ControllerState, Registers, Step};
use self::timing::Timing;
use crate::common::error::ConfigError;
use crate::phy::{Phy, PhyDrive, PhySense};
use crate::soc::devices::DeviceProfile;
use crate::soc::port::{PortWires, ReadWord, Request, Response};
use crate::stats::BusStats;

pub use self::fsm::encode_ca;
pub use self::timing::cr0_value;

/// HyperBus protocol engine for one device chain.
#[derive(Debug)]
pub struct Controller<P: Phy> {
    phy: P,
    timing: Timing,
    regs: Registers,
    sense: PhySense,
    stats: BusStats,
}

impl<P: Phy> Controller<P> {
    /// Validates the configuration and builds a controller in reset.
    ///
    /// # Arguments
    ///
    /// * `phy` - Physical layer; its timing feeds every latency computation.
    /// * `profile` - Part to drive.
    /// * `clock_hz` - Controller clock.
    /// * `initial_latency` - Override for the initial latency.
    /// * `fixed_latency` - Override for fixed latency.
    ///
    /// # Returns
    ///
    /// The controller, or the [`ConfigError`] that makes the combination infeasible.
    pub fn new(
        mut phy: P,
        profile: &DeviceProfile,
        clock_hz: u64,
        initial_latency: Option<u8>,
        fixed_latency: Option<bool>,
    ) -> Result<Self, ConfigError> {
        let timing = Timing::derive(profile, clock_hz, phy.timing(), initial_latency, fixed_latency)?;
        info!(
            device = profile.name,
            clock_hz,
            initial_latency = timing.initial_latency,
            fixed_latency = timing.fixed_latency,
            cr0 = format_args!("{:#06x}", timing.cr0),
            "controller configured"
        );
        let regs = Registers::reset(timing.reset_delay);
        let sense = phy.step(&Self::drive_of(&regs));
        Ok(Self {
            phy,
            timing,
            regs,
            sense,
            stats: BusStats::default(),
        })
    }

    const fn drive_of(regs: &Registers) -> PhyDrive {
        PhyDrive {
            cs_n: regs.cs_b,
            reset_n: regs.reset_b,
            clk_enable: regs.ck,
            dq: regs.dq_out,
            dq_oe: regs.dq_oe,
            rwds: regs.rwds_out,
            rwds_oe: regs.rwds_oe,
        }
    }

    /// Derived configuration.
    pub const fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Current FSM state.
    pub const fn state(&self) -> ControllerState {
        self.regs.state
    }

    /// Current register values.
    pub const fn registers(&self) -> &Registers {
        &self.regs
    }

    /// Counters since construction.
    pub const fn stats(&self) -> &BusStats {
        &self.stats
    }

    /// The owned PHY.
    pub const fn phy(&self) -> &P {
        &self.phy
    }

    /// Outputs towards the PHY this cycle.
    pub const fn drive(&self) -> PhyDrive {
        Self::drive_of(&self.regs)
    }

    /// Port signals the controller drives this cycle.
    pub fn response(&self) -> Response {
        let regs = &self.regs;
        if !regs.acts() {
            return Response::IDLE;
        }
        let width = self.timing.phy.width;
        let strobe = self.sense.rwds & width.first_strobe() != 0;
        Response {
            cmd_ready: regs.state == ControllerState::Idle && !regs.needs_die_repeat(&self.timing),
            wdata_ready: match regs.state {
                ControllerState::SelectOp => regs.is_register_write() && !regs.initial,
                ControllerState::Write | ControllerState::WriteReg => true,
                _ => false,
            },
            rdata: (regs.state == ControllerState::Read && strobe).then(|| ReadWord {
                data: self.sense.dq & width.data_mask(),
            }),
        }
    }

    /// Advances one cycle.
    ///
    /// # Arguments
    ///
    /// * `req` - What the client side drives into the port this cycle.
    pub fn clock(&mut self, req: &Request) {
        let wires = PortWires::new(*req, self.response());
        let was_initial = self.regs.initial;
        let mut step = Step {
            timing: &self.timing,
            wires: &wires,
            sense: &self.sense,
            stats: &mut self.stats,
        };
        self.regs = step.next(&self.regs);
        self.stats.cycles += 1;
        if was_initial && !self.regs.initial {
            info!(cr0 = format_args!("{:#06x}", self.timing.cr0), "CR0 written to every die");
        }
        self.sense = self.phy.step(&Self::drive_of(&self.regs));
    }
}
