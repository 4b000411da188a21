//! Protocol Engine Components.
//!
//! This module organizes the pieces of the HyperBus memory controller, leaf to root:
//! the device profiles, the native port model, the controller FSM, the crossbar, the
//! register space, and the builder that composes them. The behavioural device used by
//! the simulated PHY lives in `memory`.

/// Composition of controller, crossbar and register space.
pub mod builder;

/// HyperBus protocol FSM.
pub mod controller;

/// Data/register port arbiter.
pub mod crossbar;

/// Supported memory parts.
pub mod devices;

/// Simulated HyperRAM package.
pub mod memory;

/// Native port signal model.
pub mod port;

/// Configuration-register client.
pub mod register_space;

pub use builder::HyperRamCore;
pub use controller::Controller;
pub use crossbar::Crossbar;
pub use register_space::RegisterSpace;
