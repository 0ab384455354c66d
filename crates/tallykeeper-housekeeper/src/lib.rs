//! Tallykeeper Housekeeper
//!
//! Periodic health maintenance for a battery-powered counting device.
//!
//! # Overview
//!
//! Once per home cycle the housekeeper:
//! - **Tracks uptime**: 64-bit milliseconds from a wrapping 32-bit clock
//! - **Honours the restart trigger**: restarts when the runtime mode asks for it
//! - **Delegates maintenance**: peripheral bus and radio link housekeeping
//! - **Synchronizes time**: from GPS when a fix is valid, otherwise by network request
//! - **Collects telemetry**: sensor refresh, task stack headroom, battery voltage
//! - **Guards memory**: flushes and clears the counters when the heap runs low,
//!   and restarts the device if that does not help
//!
//! # Architecture
//!
//! All state shared with other firmware tasks sits in [`HealthState`]. The
//! housekeeper owns the scheduling state (uptime words, sync deadline) and
//! reaches hardware only through the collaborator traits of
//! `tallykeeper_domain::traits`, bundled in a [`Platform`].
//!
//! ## Memory recovery
//!
//! | Stage | Condition | Action |
//! |-------|-----------|--------|
//! | **Normal** | low-water mark above threshold | nothing |
//! | **Recovering** | low-water mark at or below threshold | send counters, clear them, new salt |
//! | **Escalating** | still at or below threshold after clearing | restart device |
//!
//! # Usage
//!
//! ## Background Worker
//!
//! ```no_run
//! use std::sync::Arc;
//! use tallykeeper_housekeeper::{HealthState, Housekeeper, HousekeeperConfig, HousekeeperWorker, Platform};
//!
//! # fn platform() -> Platform { unimplemented!() }
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = HousekeeperConfig::from_file("tallykeeper.toml")?;
//!     let state = Arc::new(HealthState::default());
//!     let mut worker = HousekeeperWorker::new(Housekeeper::new(config, state, platform())?);
//!
//!     worker.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! The housekeeper can be configured via TOML:
//!
//! ```toml
//! home_cycle_secs = 30
//! time_sync_interval_minutes = 60
//! low_memory_threshold_bytes = 4096
//! read_environment = true
//! probe_battery = true
//! monitored_tasks = ["wifi-switch", "irq-handler"]
//! verbose = false
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod housekeeper;
mod metrics;
mod reset;
mod salt;
mod state;
mod timesync;
mod uptime;
mod watchdog;
mod worker;

pub use config::{HousekeeperConfig, ROLLING_CLOCK_PERIOD};
pub use error::HousekeeperError;
pub use housekeeper::{CycleReport, Housekeeper, Platform};
pub use metrics::HousekeepingMetrics;
pub use reset::reset_counters;
pub use salt::RandomSalts;
pub use state::HealthState;
pub use timesync::{utc_seconds, SyncOutcome, TimeSyncScheduler};
pub use uptime::UptimeTracker;
pub use watchdog::{MemoryWatchdog, WatchdogContext, WatchdogOutcome};
pub use worker::{HousekeeperWorker, WorkerExit};
