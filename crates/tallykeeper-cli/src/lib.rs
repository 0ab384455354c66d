//! Tallykeeper simulator library.
//!
//! Runs the housekeeping scheduler against a simulated device platform:
//! argument parsing, configuration loading, logging setup and the boot loop.

pub mod cli;
pub mod config;
pub mod device;
pub mod error;
pub mod logging;
pub mod sim;

pub use cli::Cli;
pub use config::load_config;
pub use device::{Simulation, SimulationSummary};
pub use error::{CliError, Result};
pub use logging::init_logging;
