//! Configuration system for the HyperRAM simulator.
//!
//! This module defines the configuration consumed by the simulation harness and the CLI.
//! It provides:
//! 1. **Defaults:** Baseline part, clock, PHY pipeline depths and simulation limits.
//! 2. **Structures:** Root config plus PHY and simulation sections.
//!
//! Configuration is supplied as JSON (`Config::from_json`, `Config::from_file`) or use
//! `Config::default()`.
//! Only the controller clock and latency overrides reach the protocol engine; everything
//! else parameterises the simulated PHY and device around it.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::error::SimError;
use crate::phy::{BusWidth, PhyTiming};

/// Default configuration constants for the simulator.
mod defaults {
    /// Part driven when none is named.
    pub const DEVICE: &str = "S27KS0641DP";

    /// Controller clock (100 MHz).
    pub const CLOCK_HZ: u64 = 100_000_000;

    /// Cycles from controller register to pin.
    pub const TX_LATENCY: u32 = 1;

    /// Cycles from pin back to controller.
    pub const RX_LATENCY: u32 = 1;

    /// Cycles until the simulated PLL reports lock.
    pub const PLL_LOCK_CYCLES: u64 = 4;

    /// Cycles any single harness wait may take before giving up.
    pub const CYCLE_BUDGET: u64 = 100_000;
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use hyperram_core::config::Config;
/// use hyperram_core::phy::BusWidth;
///
/// let json = r#"{
///     "device": "S70KS1281DP",
///     "clock_hz": 83000000,
///     "phy": { "width": "X32", "tx_latency": 2 },
///     "sim": { "refresh_collision": true }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.device, "S70KS1281DP");
/// assert_eq!(config.phy.width, BusWidth::X32);
/// assert_eq!(config.phy.rx_latency, 1);
/// assert_eq!(config.initial_latency, None);
/// assert!(config.sim.refresh_collision);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Part name, looked up case-insensitively in the device table.
    #[serde(default = "Config::default_device")]
    pub device: String,

    /// Controller clock in Hz.
    #[serde(default = "Config::default_clock_hz")]
    pub clock_hz: u64,

    /// Initial latency override; the frequency minimum when absent.
    #[serde(default)]
    pub initial_latency: Option<u8>,

    /// Fixed latency override; derived from the die count and datapath when absent.
    #[serde(default)]
    pub fixed_latency: Option<bool>,

    /// Simulated PHY parameters.
    #[serde(default)]
    pub phy: PhyConfig,

    /// Harness parameters.
    #[serde(default)]
    pub sim: SimConfig,
}

impl Config {
    fn default_device() -> String {
        defaults::DEVICE.to_owned()
    }

    const fn default_clock_hz() -> u64 {
        defaults::CLOCK_HZ
    }

    /// Parses a JSON document; absent fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: Self::default_device(),
            clock_hz: Self::default_clock_hz(),
            initial_latency: None,
            fixed_latency: None,
            phy: PhyConfig::default(),
            sim: SimConfig::default(),
        }
    }
}

/// Simulated PHY parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhyConfig {
    /// Cycles from controller register to pin.
    #[serde(default = "PhyConfig::default_tx_latency")]
    pub tx_latency: u32,

    /// Cycles from pin back to controller.
    #[serde(default = "PhyConfig::default_rx_latency")]
    pub rx_latency: u32,

    /// Datapath width.
    #[serde(default)]
    pub width: BusWidth,

    /// Cycles until the PLL reports lock.
    #[serde(default = "PhyConfig::default_pll_lock_cycles")]
    pub pll_lock_cycles: u64,

    /// Skew the receive path by one half-word (32-bit datapath only).
    #[serde(default)]
    pub half_word_skew: bool,
}

impl PhyConfig {
    const fn default_tx_latency() -> u32 {
        defaults::TX_LATENCY
    }

    const fn default_rx_latency() -> u32 {
        defaults::RX_LATENCY
    }

    const fn default_pll_lock_cycles() -> u64 {
        defaults::PLL_LOCK_CYCLES
    }

    /// Pipeline depths and width as seen by the controller.
    pub const fn timing(&self) -> PhyTiming {
        PhyTiming {
            tx_latency: self.tx_latency,
            rx_latency: self.rx_latency,
            width: self.width,
        }
    }
}

impl Default for PhyConfig {
    fn default() -> Self {
        Self {
            tx_latency: Self::default_tx_latency(),
            rx_latency: Self::default_rx_latency(),
            width: BusWidth::default(),
            pll_lock_cycles: Self::default_pll_lock_cycles(),
            half_word_skew: false,
        }
    }
}

/// Harness parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Cycles any single harness wait may take.
    #[serde(default = "SimConfig::default_cycle_budget")]
    pub cycle_budget: u64,

    /// The simulated device requests double latency on every transaction.
    #[serde(default)]
    pub refresh_collision: bool,
}

impl SimConfig {
    const fn default_cycle_budget() -> u64 {
        defaults::CYCLE_BUDGET
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            cycle_budget: Self::default_cycle_budget(),
            refresh_collision: false,
        }
    }
}
