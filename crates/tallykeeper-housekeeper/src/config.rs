//! Configuration for housekeeping cycles
//!
//! Defines the home-cycle cadence, time sync interval, low-memory threshold
//! and which optional steps run.

use crate::HousekeeperError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tallykeeper_domain::TaskId;

/// Period of a 32-bit millisecond rolling clock (about 49.7 days)
pub const ROLLING_CLOCK_PERIOD: Duration = Duration::from_millis(1 << 32);

/// Largest sync interval whose length in milliseconds fits a `u64`
const MAX_SYNC_INTERVAL_MINUTES: u64 = u64::MAX / 60_000;

/// Configuration for the housekeeping scheduler
///
/// # Examples
///
/// ```
/// use tallykeeper_housekeeper::HousekeeperConfig;
///
/// // Default configuration
/// let config = HousekeeperConfig::default();
/// assert_eq!(config.home_cycle_secs, 30);
///
/// // Battery-saving configuration
/// let config = HousekeeperConfig::low_power();
/// assert_eq!(config.home_cycle_secs, 120);
///
/// // Everything on, verbose logging
/// let config = HousekeeperConfig::diagnostic();
/// assert!(config.verbose);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HousekeeperConfig {
    /// How often a housekeeping cycle runs (in seconds)
    /// Default: 30 seconds
    pub home_cycle_secs: u64,

    /// How often to resynchronize the clock (in minutes)
    /// `None` disables periodic time sync entirely
    /// Default: 60 minutes
    #[serde(default)]
    pub time_sync_interval_minutes: Option<u64>,

    /// Worst-case free heap (in bytes) at or below which the counters are
    /// flushed and cleared
    /// Default: 4096 bytes
    pub low_memory_threshold_bytes: u32,

    /// Refresh the environmental sensor each cycle, if one is fitted
    /// Default: true
    #[serde(default = "default_true")]
    pub read_environment: bool,

    /// Sample battery voltage each cycle, if a probe is fitted
    /// Default: true
    #[serde(default = "default_true")]
    pub probe_battery: bool,

    /// Background tasks whose stack headroom is logged each cycle
    /// Default: wifi-switch, irq-handler
    #[serde(default = "default_monitored_tasks")]
    pub monitored_tasks: Vec<String>,

    /// Emit debug-level logs
    /// Default: false
    #[serde(default)]
    pub verbose: bool,
}

fn default_true() -> bool {
    true
}

fn default_monitored_tasks() -> Vec<String> {
    vec![
        TaskId::WifiSwitch.as_str().to_string(),
        TaskId::IrqHandler.as_str().to_string(),
    ]
}

impl Default for HousekeeperConfig {
    /// Create the default configuration
    ///
    /// - Home cycle: 30 seconds
    /// - Time sync: every 60 minutes
    /// - Low-memory threshold: 4096 bytes
    /// - Sensor and battery steps enabled
    fn default() -> Self {
        Self {
            home_cycle_secs: 30,
            time_sync_interval_minutes: Some(60),
            low_memory_threshold_bytes: 4096,
            read_environment: true,
            probe_battery: true,
            monitored_tasks: default_monitored_tasks(),
            verbose: false,
        }
    }
}

impl HousekeeperConfig {
    /// Battery-saving configuration (infrequent cycles, daily time sync)
    ///
    /// - Home cycle: 120 seconds
    /// - Time sync: every 24 hours
    /// - Sensor polling disabled
    pub fn low_power() -> Self {
        Self {
            home_cycle_secs: 120,
            time_sync_interval_minutes: Some(24 * 60),
            read_environment: false,
            ..Self::default()
        }
    }

    /// Diagnostic configuration (frequent cycles, all telemetry on)
    ///
    /// - Home cycle: 10 seconds
    /// - Time sync: every 10 minutes
    /// - Stack headroom of every known task
    /// - Verbose logging
    pub fn diagnostic() -> Self {
        Self {
            home_cycle_secs: 10,
            time_sync_interval_minutes: Some(10),
            monitored_tasks: [TaskId::WifiSwitch, TaskId::IrqHandler, TaskId::Gps, TaskId::Led]
                .iter()
                .map(|task| task.as_str().to_string())
                .collect(),
            verbose: true,
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file and validate it
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, HousekeeperError> {
        let contents = std::fs::read_to_string(path)?;
        let config: HousekeeperConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values the scheduler cannot run with
    ///
    /// The uptime tracker detects at most one clock wrap per cycle, so the
    /// home cycle must be shorter than the rolling clock period.
    pub fn validate(&self) -> Result<(), HousekeeperError> {
        if self.home_cycle_secs == 0 {
            return Err(HousekeeperError::Config(
                "home_cycle_secs must be greater than zero".to_string(),
            ));
        }

        if self.home_cycle() >= ROLLING_CLOCK_PERIOD {
            return Err(HousekeeperError::Config(format!(
                "home_cycle_secs must be shorter than the rolling clock period ({}s)",
                ROLLING_CLOCK_PERIOD.as_secs()
            )));
        }

        match self.time_sync_interval_minutes {
            Some(0) => {
                return Err(HousekeeperError::Config(
                    "time_sync_interval_minutes must be greater than zero".to_string(),
                ))
            }
            Some(minutes) if minutes > MAX_SYNC_INTERVAL_MINUTES => {
                return Err(HousekeeperError::Config(format!(
                    "time_sync_interval_minutes must not exceed {}",
                    MAX_SYNC_INTERVAL_MINUTES
                )))
            }
            _ => {}
        }

        self.tasks().map(|_| ())
    }

    /// Get home cycle as Duration
    pub fn home_cycle(&self) -> Duration {
        Duration::from_secs(self.home_cycle_secs)
    }

    /// Get time sync interval as Duration, if time sync is enabled
    pub fn time_sync_interval(&self) -> Option<Duration> {
        self.time_sync_interval_minutes
            .map(|minutes| Duration::from_secs(minutes.saturating_mul(60)))
    }

    /// Resolve the monitored task names
    pub fn tasks(&self) -> Result<Vec<TaskId>, HousekeeperError> {
        self.monitored_tasks
            .iter()
            .map(|name| name.parse::<TaskId>().map_err(HousekeeperError::Config))
            .collect()
    }
}
