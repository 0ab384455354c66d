//! Configuration loading for the simulator.

use crate::{Cli, CliError, Result};
use std::path::Path;
use tallykeeper_housekeeper::HousekeeperConfig;

/// Highest detection rate the feed task can pace (one per millisecond).
pub const MAX_DETECTION_RATE: u32 = 1_000;

/// Load the housekeeper configuration and apply command-line overrides.
///
/// Falls back to [`HousekeeperConfig::default`] when no file is given.
pub fn load_config(cli: &Cli) -> Result<HousekeeperConfig> {
    let mut config = match &cli.config {
        Some(path) => load_file(path)?,
        None => HousekeeperConfig::default(),
    };

    if let Some(secs) = cli.home_cycle_secs {
        config.home_cycle_secs = secs;
    }
    if cli.verbose {
        config.verbose = true;
    }

    config.validate()?;

    if cli.detection_rate > MAX_DETECTION_RATE {
        return Err(CliError::InvalidArgument(format!(
            "detection rate {} exceeds {} per second",
            cli.detection_rate, MAX_DETECTION_RATE
        )));
    }

    Ok(config)
}

fn load_file(path: &Path) -> Result<HousekeeperConfig> {
    tracing::debug!("Loading configuration from {}", path.display());
    Ok(HousekeeperConfig::from_file(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let cli = Cli::parse_from(["tallykeeper"]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.home_cycle_secs, 30);
        assert!(!config.verbose);
    }

    #[test]
    fn test_overrides_apply_on_top_of_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "home_cycle_secs = 60\nlow_memory_threshold_bytes = 2048\ntime_sync_interval_minutes = 5"
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = Cli::parse_from([
            "tallykeeper",
            "--config",
            path.as_str(),
            "--home-cycle-secs",
            "10",
            "--verbose",
        ]);
        let config = load_config(&cli).unwrap();

        assert_eq!(config.home_cycle_secs, 10);
        assert_eq!(config.low_memory_threshold_bytes, 2048);
        assert_eq!(config.time_sync_interval_minutes, Some(5));
        assert!(config.verbose);
    }

    #[test]
    fn test_zero_cycle_override_is_rejected() {
        let cli = Cli::parse_from(["tallykeeper", "--home-cycle-secs", "0"]);
        assert!(matches!(load_config(&cli), Err(CliError::Housekeeper(_))));
    }

    #[test]
    fn test_excessive_detection_rate_is_rejected() {
        let cli = Cli::parse_from(["tallykeeper", "--detection-rate", "5000"]);
        assert!(matches!(
            load_config(&cli),
            Err(CliError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let cli = Cli::parse_from(["tallykeeper", "--config", "/nonexistent/tallykeeper.toml"]);
        assert!(load_config(&cli).is_err());
    }
}
