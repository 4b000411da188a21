//! Supported memory parts.
//!
//! This module holds the static device table consumed by the controller at construction.

/// Per-part timing and geometry records.
pub mod profile;

pub use profile::{DEVICES, DeviceProfile, lookup, min_initial_latency};
