//! Port Crossbar.
//!
//! Two clients share the controller's single port: the data path and the register space.
//! A priority bit selects which one is connected. This module provides:
//! 1. **Routing:** A pure function of the priority bit, the lockout and the three port halves.
//! 2. **Arbitration:** The priority bit only moves while the controller is ready for a command,
//!    so a burst in flight is never handed to the other client.
//!
//! The register client wins on reset, under lockout, and whenever it has a command pending at
//! a command boundary. While the data client is selected but a register command is waiting,
//! the data command is held back so the switch happens at the next boundary.

use tracing::debug;

use crate::soc::port::{Request, Response};

/// Port signals after routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Routed {
    /// What the controller sees on its port.
    pub controller: Request,
    /// What the data client sees.
    pub data: Response,
    /// What the register client sees.
    pub register: Response,
}

/// Two-client arbiter in front of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossbar {
    reg_select: bool,
    lockout: bool,
}

impl Default for Crossbar {
    fn default() -> Self {
        Self::new()
    }
}

impl Crossbar {
    /// Crossbar in its reset state: register client selected, no lockout.
    pub const fn new() -> Self {
        Self {
            reg_select: true,
            lockout: false,
        }
    }

    /// Sets the lockout input for this cycle.
    pub fn set_lockout(&mut self, lockout: bool) {
        self.lockout = lockout;
    }

    /// Current lockout input.
    pub const fn lockout(&self) -> bool {
        self.lockout
    }

    /// Returns `true` while the register client owns the controller port.
    pub const fn register_selected(&self) -> bool {
        self.reg_select
    }

    /// Connects the selected client to the controller.
    ///
    /// # Arguments
    ///
    /// * `ctrl` - Controller response this cycle.
    /// * `data` - Data client request.
    /// * `reg` - Register client request.
    ///
    /// # Returns
    ///
    /// The request presented to the controller and the response seen by each client.
    pub fn route(&self, ctrl: &Response, data: &Request, reg: &Request) -> Routed {
        if self.reg_select {
            return Routed {
                controller: *reg,
                data: Response::IDLE,
                register: *ctrl,
            };
        }
        let hold = self.lockout || reg.cmd.is_some();
        Routed {
            controller: Request {
                cmd: if hold { None } else { data.cmd },
                ..*data
            },
            data: Response {
                cmd_ready: ctrl.cmd_ready && !hold,
                ..*ctrl
            },
            register: Response::IDLE,
        }
    }

    /// Updates the priority bit at a command boundary.
    ///
    /// # Arguments
    ///
    /// * `ctrl` - Controller response this cycle.
    /// * `reg` - Register client request this cycle.
    pub fn clock(&mut self, ctrl: &Response, reg: &Request) {
        if !ctrl.cmd_ready {
            return;
        }
        if self.reg_select && !self.lockout && reg.cmd.is_none() {
            debug!("crossbar: data port selected");
            self.reg_select = false;
        } else if !self.reg_select && (self.lockout || reg.cmd.is_some()) {
            debug!("crossbar: register port selected");
            self.reg_select = true;
        }
    }
}
