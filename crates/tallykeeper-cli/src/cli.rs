//! Command-line arguments.

use clap::Parser;
use std::path::PathBuf;

/// Tallykeeper - run the device housekeeping loop against a simulated platform.
#[derive(Debug, Parser)]
#[command(name = "tallykeeper")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long, env = "TALLYKEEPER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Cycles to run per boot; runs until Ctrl+C if omitted
    #[arg(short = 'n', long)]
    pub cycles: Option<usize>,

    /// Override the home cycle interval (seconds)
    #[arg(long)]
    pub home_cycle_secs: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Fit a simulated GPS receiver with a valid time fix
    #[arg(long)]
    pub gps: bool,

    /// Start the rolling millisecond clock at this value
    #[arg(long, default_value_t = 0)]
    pub clock_offset_ms: u32,

    /// Simulated heap size in bytes
    #[arg(long, default_value_t = 96 * 1024)]
    pub heap_bytes: u32,

    /// Bytes leaked by the peripheral bus on every cycle
    #[arg(long, default_value_t = 0)]
    pub leak_bytes: u32,

    /// Detections per second produced by the simulated radio
    #[arg(long, default_value_t = 20)]
    pub detection_rate: u32,

    /// Simulated reboots allowed before exiting
    #[arg(long, default_value_t = 1)]
    pub reboots: u32,
}
