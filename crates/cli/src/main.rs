//! HyperRAM controller simulator CLI.
//!
//! This binary provides a single entry point for inspecting and exercising the controller. It performs:
//! 1. **Devices:** List every supported part with its clock limit, die count and latency range.
//! 2. **Check:** Derive the controller configuration for a part/clock/PHY tuple, or report why it is infeasible.
//! 3. **Run:** Build a simulated system from a JSON config, run startup configuration, a write/read
//!    self-test and an ID register read, then print bus statistics.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hyperram_core::Config;
use hyperram_core::Simulator;
use hyperram_core::common::SimError;
use hyperram_core::common::constants::REG_TYPE_ID;
use hyperram_core::phy::{BusWidth, PhyTiming};
use hyperram_core::soc::controller::timing::Timing;
use hyperram_core::soc::devices::{self, DEVICES};

#[derive(Parser, Debug)]
#[command(
    name = "hyperram-sim",
    author,
    version,
    about = "HyperBus/HyperRAM controller simulator",
    long_about = "Inspect controller configurations and run the protocol engine against a simulated HyperRAM.\n\nExamples:\n  hyperram-sim devices\n  hyperram-sim check --device S70KS1281DP --clock-hz 100000000\n  hyperram-sim run --config hyperram.json\n\nSet RUST_LOG=hyperram_core=debug to trace transactions."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List supported parts.
    Devices,

    /// Derive the controller configuration without running anything.
    Check {
        /// Part name.
        #[arg(short, long, default_value = "S27KS0641DP")]
        device: String,

        /// Controller clock in Hz.
        #[arg(long, default_value_t = 100_000_000)]
        clock_hz: u64,

        /// Initial latency override.
        #[arg(long)]
        initial_latency: Option<u8>,

        /// Fixed latency override.
        #[arg(long, value_name = "BOOL")]
        fixed_latency: Option<bool>,

        /// Use the double-rate 32-bit datapath.
        #[arg(long)]
        x32: bool,

        /// PHY transmit latency in controller cycles.
        #[arg(long, default_value_t = 1)]
        tx_latency: u32,

        /// PHY receive latency in controller cycles.
        #[arg(long, default_value_t = 1)]
        rx_latency: u32,

        /// Print the configuration as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Run startup configuration and a write/read self-test against a simulated device.
    Run {
        /// JSON configuration file; built-in defaults when omitted.
        #[arg(short, long)]
        config: Option<String>,

        /// Words written and read back by the self-test.
        #[arg(long, default_value_t = 16)]
        words: usize,

        /// Port word address of the self-test.
        #[arg(long, default_value_t = 0)]
        addr: u32,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Devices => {
            cmd_devices();
            ExitCode::SUCCESS
        }
        Commands::Check {
            device,
            clock_hz,
            initial_latency,
            fixed_latency,
            x32,
            tx_latency,
            rx_latency,
            json,
        } => {
            let phy = PhyTiming {
                tx_latency,
                rx_latency,
                width: if x32 { BusWidth::X32 } else { BusWidth::X16 },
            };
            cmd_check(&device, clock_hz, phy, initial_latency, fixed_latency, json)
        }
        Commands::Run {
            config,
            words,
            addr,
        } => match cmd_run(config.as_deref(), words, addr) {
            Ok(true) => ExitCode::SUCCESS,
            Ok(false) => ExitCode::FAILURE,
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        },
    }
}

/// Prints the device table.
fn cmd_devices() {
    println!(
        "{:<14} {:>10} {:>5} {:>9} {:>7}",
        "device", "max_clock", "dies", "words", "max_il"
    );
    for d in DEVICES {
        println!(
            "{:<14} {:>6} MHz {:>5} {:>9} {:>7}",
            d.name,
            d.max_clock_hz / 1_000_000,
            d.banks,
            u64::from(d.words_per_die()) * u64::from(d.banks),
            d.max_initial_latency
        );
    }
}

/// Derives and prints a controller configuration.
fn cmd_check(
    device: &str,
    clock_hz: u64,
    phy: PhyTiming,
    initial_latency: Option<u8>,
    fixed_latency: Option<bool>,
    json: bool,
) -> ExitCode {
    let timing = devices::lookup(device).and_then(|profile| {
        Timing::derive(profile, clock_hz, phy, initial_latency, fixed_latency)
    });
    let timing = match timing {
        Ok(timing) => timing,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if json {
        match serde_json::to_string_pretty(&timing) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::FAILURE;
            }
        }
        return ExitCode::SUCCESS;
    }

    println!("device            {}", timing.profile.name);
    println!("clock             {} Hz", timing.clock_hz);
    println!("bus_clock         {} Hz", timing.bus_clock_hz);
    println!("initial_latency   {}", timing.initial_latency);
    println!("fixed_latency     {}", timing.fixed_latency);
    println!("cr0               {:#06x}", timing.cr0);
    println!("reset_delay       {} cycles", timing.reset_delay);
    println!(
        "write_wait        {} / {} cycles (single / double)",
        timing.write_wait(false),
        timing.write_wait(true)
    );
    println!(
        "read_wait         {} / {} cycles (single / double)",
        timing.read_wait(false),
        timing.read_wait(true)
    );
    ExitCode::SUCCESS
}

/// Builds a simulator, runs startup and a self-test.
///
/// # Returns
///
/// `Ok(true)` if every word read back matched.
fn cmd_run(path: Option<&str>, words: usize, addr: u32) -> Result<bool, SimError> {
    let config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let mut sim = Simulator::from_config(&config)?;
    let timing = *sim.core.controller().timing();
    println!(
        "[*] {} @ {} Hz: IL={} fixed={} CR0={:#06x}",
        timing.profile.name,
        timing.clock_hz,
        timing.initial_latency,
        timing.fixed_latency,
        timing.cr0
    );

    let cycles = sim.run_until_setup()?;
    println!("[*] Setup complete after {cycles} cycles");

    let mask = timing.phy.width.data_mask();
    let pattern: Vec<u32> = (0..words as u32)
        .map(|i| (i.wrapping_mul(0x9E37_79B9) ^ 0xA5A5_5A5A) & mask)
        .collect();
    sim.write(addr, &pattern)?;
    let readback = sim.read(addr, words)?;

    let mismatches = pattern
        .iter()
        .zip(&readback)
        .filter(|(w, r)| w != r)
        .count()
        + pattern.len().abs_diff(readback.len());
    if mismatches == 0 {
        println!("[*] Self-test: {words} words OK");
    } else {
        println!("[!] Self-test: {mismatches} of {words} words differ");
    }

    let id0 = sim.read_register(0, REG_TYPE_ID, 0)?;
    println!("[*] ID0 (die 0) = {id0:#06x}");

    sim.core.stats().print();
    Ok(mismatches == 0)
}
