//! Boot loop of the simulated device.
//!
//! Each boot builds fresh shared state and a fresh housekeeper, the way a
//! real restart would. A housekeeper-initiated restart leads to the next boot
//! until the reboot allowance runs out.

use crate::sim::{self, SimOptions};
use crate::{Cli, Result};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tallykeeper_domain::traits::SaltSource;
use tallykeeper_housekeeper::{
    HealthState, Housekeeper, HousekeeperConfig, HousekeeperWorker, RandomSalts, WorkerExit,
};

/// Totals across all boots of a simulation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationSummary {
    /// Number of times the device booted
    pub boots: u32,

    /// Housekeeping cycles run across all boots
    pub cycles: usize,

    /// Restarts requested by the housekeeper
    pub restarts: u32,

    /// Watchdog interventions across all boots, recovered or not
    pub low_memory_events: usize,

    /// How the last boot ended
    pub last_exit: Option<WorkerExit>,
}

/// A simulated device and its run parameters
pub struct Simulation {
    config: HousekeeperConfig,
    options: SimOptions,
    cycles: Option<usize>,
    detection_rate: u32,
    reboots: u32,
}

impl Simulation {
    /// Create a simulation from an already loaded configuration
    pub fn new(config: HousekeeperConfig, cli: &Cli) -> Self {
        Self {
            config,
            options: SimOptions {
                clock_offset_ms: cli.clock_offset_ms,
                heap_bytes: cli.heap_bytes,
                leak_bytes: cli.leak_bytes,
                gps: cli.gps,
            },
            cycles: cli.cycles,
            detection_rate: cli.detection_rate,
            reboots: cli.reboots,
        }
    }

    /// Boot the device and keep rebooting it after restarts
    ///
    /// # Errors
    ///
    /// Returns an error if the housekeeper rejects the configuration or the
    /// shutdown signal handler cannot be installed.
    pub async fn run(&self) -> Result<SimulationSummary> {
        let mut summary = SimulationSummary::default();

        loop {
            summary.boots += 1;
            let exit = self.boot(summary.boots, &mut summary).await?;
            summary.last_exit = Some(exit);

            if exit != WorkerExit::Restart {
                break;
            }
            summary.restarts += 1;

            if summary.restarts > self.reboots {
                tracing::warn!(
                    "Reboot allowance of {} used up, leaving device off",
                    self.reboots
                );
                break;
            }
        }

        tracing::info!(
            "Simulation finished: {} boots, {} cycles, {} restarts",
            summary.boots,
            summary.cycles,
            summary.restarts
        );

        Ok(summary)
    }

    async fn boot(&self, number: u32, summary: &mut SimulationSummary) -> Result<WorkerExit> {
        let salt = RandomSalts::new().next_salt();
        let state = Arc::new(HealthState::new(salt));
        tracing::info!("Boot {} (salt {})", number, salt);

        let sim::SimDevice {
            platform,
            heap,
            restart_requested,
        } = sim::boot(&self.options, Arc::clone(&state));

        let feed = tokio::spawn(sim::detection_feed(
            Arc::clone(&state),
            heap,
            self.detection_rate,
        ));

        let housekeeper = Housekeeper::new(self.config.clone(), state, platform);
        let mut worker = match housekeeper {
            Ok(housekeeper) => HousekeeperWorker::new(housekeeper),
            Err(e) => {
                feed.abort();
                return Err(e.into());
            }
        };

        let exit = match self.cycles {
            Some(cycles) => Ok(worker.run_cycles(cycles).await),
            None => worker.run().await,
        };
        feed.abort();

        summary.cycles += worker.metrics().cycle_count;
        summary.low_memory_events += worker.metrics().low_memory_events;
        let exit = exit?;

        if exit == WorkerExit::Restart && !restart_requested.load(Ordering::Acquire) {
            tracing::warn!("Worker reported a restart the device never received");
        }

        Ok(exit)
    }
}
