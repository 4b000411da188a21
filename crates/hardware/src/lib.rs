//! HyperBus/HyperRAM memory controller library.
//!
//! This crate implements a cycle-level HyperBus protocol engine with the following:
//! 1. **Controller:** CA packet construction, read/write/register phase sequencing, fixed and
//!    variable latency, dual-die configuration, and 16-bit or double-rate 32-bit datapaths.
//! 2. **Crossbar:** Arbitration of a data port and a register port onto the controller with a
//!    startup lockout.
//! 3. **Register Space:** A CSR-driven client for configuration-register access and the
//!    per-die startup sequence.
//! 4. **PHY:** The controller/PHY contract plus a behavioural PHY and HyperRAM device model.
//! 5. **Simulation:** Configuration, statistics, a data-port driver and a budgeted simulator.

/// Common types and constants (CA layout, CR0 layout, errors).
pub mod common;
/// Simulator configuration (defaults, PHY and harness sections).
pub mod config;
/// Physical layer contract and simulated PHY.
pub mod phy;
/// Simulation harness (data-port driver, simulator).
pub mod sim;
/// Protocol engine (controller, crossbar, register space, devices, port model).
pub mod soc;
/// Bus statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Composed controller, crossbar and register space; construct with `HyperRamCore::new`.
pub use crate::soc::HyperRamCore;
/// Simulator around a core; construct with `Simulator::from_config`.
pub use crate::sim::Simulator;
