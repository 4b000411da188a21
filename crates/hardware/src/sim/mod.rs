//! Simulation harness.
//!
//! Drives a composed core cycle by cycle: a traffic driver stands in for the bus adapter on
//! the data port, and the simulator wraps both with cycle-budgeted helpers for setup,
//! memory transfers and register access.

/// Data-port traffic driver.
pub mod driver;
/// Budgeted simulation loop.
pub mod simulator;

pub use driver::{Completion, DataPortDriver, Operation};
pub use simulator::Simulator;
