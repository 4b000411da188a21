//! Common types and constants shared by every component of the engine.
//!
//! This module provides the building blocks used across the controller, crossbar,
//! register space, and the simulated PHY. It includes:
//! 1. **Constants:** CA packet layout, CR0 layout, latency codes, and register addressing.
//! 2. **Error Handling:** Configuration-time errors and simulation harness errors.

/// HyperBus protocol constants.
pub mod constants;

/// Error types for construction and simulation.
pub mod error;

pub use error::{ConfigError, SimError};
