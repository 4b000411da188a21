//! Simulated HyperRAM Memory.
//!
//! This module implements the device side of the bus. It provides:
//! 1. **Buffer:** Lazily mapped word storage for each die.
//! 2. **Device:** The pin-level HyperRAM behaviour driven by the simulated PHY.

/// Word storage backed by an anonymous mapping (or a `Vec` off Unix).
pub mod buffer;

/// Bus-level HyperRAM behaviour.
pub mod hyperram;

pub use buffer::WordBuffer;
pub use hyperram::{DeviceOutput, HyperRamDevice, RegisterWrite};
