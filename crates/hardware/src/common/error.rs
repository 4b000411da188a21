//! Configuration and Simulation Error definitions.
//!
//! This module defines the two failure taxonomies of the engine. It provides:
//! 1. **Configuration Errors:** Construction-time rejections of infeasible latency, clock,
//!    and device combinations. These are fatal; no controller is built.
//! 2. **Simulation Errors:** Failures of the simulation harness (cycle budget, config
//!    documents, backing storage). The protocol engine itself has no runtime error channel:
//!    a device that never answers stalls the bus, exactly as the hardware would.

use thiserror::Error;

/// Construction-time rejection of a controller configuration.
///
/// Every check is evaluated once when the controller is built and never again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The requested part name is not in the device table.
    #[error("unknown device `{0}`")]
    UnknownDevice(String),

    /// The device profile declares a die count the controller cannot address.
    #[error("device `{device}` declares {banks} dies; only 1 or 2 are supported")]
    UnsupportedBankCount {
        /// Part name.
        device: &'static str,
        /// Declared die count.
        banks: u8,
    },

    /// The bus clock (doubled in 32-bit mode) exceeds the device maximum.
    #[error("bus clock {bus_clock_hz} Hz exceeds `{device}` maximum of {max_clock_hz} Hz")]
    ClockExceedsDevice {
        /// Part name.
        device: &'static str,
        /// Effective clock on the HyperBus pins.
        bus_clock_hz: u64,
        /// Maximum clock the part supports.
        max_clock_hz: u64,
    },

    /// The initial latency is outside `3..=max_initial_latency`.
    #[error("initial latency {latency} outside supported range 3..={max}")]
    InitialLatencyOutOfRange {
        /// Requested latency in clocks.
        latency: u8,
        /// Largest latency the part supports.
        max: u8,
    },

    /// The initial latency is legal for the part but too short for the clock.
    #[error("initial latency {latency} below minimum {minimum} at {bus_clock_hz} Hz")]
    InitialLatencyTooLow {
        /// Requested latency in clocks.
        latency: u8,
        /// Minimum latency for this clock.
        minimum: u8,
        /// Effective clock on the HyperBus pins.
        bus_clock_hz: u64,
    },

    /// A dual-die part was configured with variable latency.
    #[error("fixed latency is mandatory for dual-die devices")]
    DualDieRequiresFixedLatency,

    /// The 32-bit double-rate datapath was configured with variable latency.
    #[error("fixed latency is mandatory for the 32-bit double-rate datapath")]
    DoubleRateRequiresFixedLatency,

    /// Even the doubled latency leaves no room for the PHY transmit pipeline.
    #[error("initial latency {latency} too low for a PHY with tx latency {tx_latency}")]
    LatencyTooLowForPhy {
        /// Requested latency in clocks.
        latency: u8,
        /// PHY transmit pipeline depth in controller cycles.
        tx_latency: u32,
    },

    /// The single latency is too short for the PHY; only fixed latency fits.
    #[error("initial latency {latency} with PHY tx latency {tx_latency} requires fixed latency")]
    PhyRequiresFixedLatency {
        /// Requested latency in clocks.
        latency: u8,
        /// PHY transmit pipeline depth in controller cycles.
        tx_latency: u32,
    },

    /// The PHY receive pipeline is too deep to observe the RWDS latency indication.
    #[error("PHY rx latency {rx_latency} misses the RWDS latency indication; enable fixed latency")]
    RxLatencyRequiresFixedLatency {
        /// PHY receive pipeline depth in controller cycles.
        rx_latency: u32,
    },
}

/// Failure of the simulation harness around the protocol engine.
#[derive(Debug, Error)]
pub enum SimError {
    /// Building the controller failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON configuration document could not be parsed.
    #[error("invalid configuration document: {0}")]
    Parse(#[from] serde_json::Error),

    /// The harness gave up waiting; the engine is stalled or the budget is too small.
    #[error("simulation did not finish within {budget} cycles")]
    CycleBudgetExceeded {
        /// Number of cycles that were allowed.
        budget: u64,
    },

    /// The simulated die could not allocate its storage.
    #[error("failed to allocate {bytes} bytes of device storage")]
    Allocation {
        /// Requested allocation size.
        bytes: usize,
    },
}
