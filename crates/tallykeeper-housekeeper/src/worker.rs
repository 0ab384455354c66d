//! Background worker driving housekeeping cycles on a timer

use crate::{Housekeeper, HousekeeperError, HousekeepingMetrics};
use tokio::time::{interval, Duration, MissedTickBehavior};

/// Why the worker stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    /// A cycle requested a device restart
    Restart,

    /// Shutdown signal received
    Shutdown,

    /// Requested number of cycles completed
    Completed,
}

/// Background worker that runs the housekeeper once per home cycle
///
/// Cycles never overlap: each runs to completion on the worker's task before
/// the next tick is awaited, and late ticks are delayed rather than bunched.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use tallykeeper_housekeeper::{
///     HealthState, Housekeeper, HousekeeperConfig, HousekeeperWorker, Platform, WorkerExit,
/// };
///
/// # fn platform() -> Platform { unimplemented!() }
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let state = Arc::new(HealthState::default());
///     let housekeeper = Housekeeper::new(HousekeeperConfig::default(), state, platform())?;
///     let mut worker = HousekeeperWorker::new(housekeeper);
///
///     // Run until Ctrl+C or until a cycle restarts the device
///     if worker.run().await? == WorkerExit::Restart {
///         println!("device restarting");
///     }
///     Ok(())
/// }
/// ```
pub struct HousekeeperWorker {
    housekeeper: Housekeeper,
    interval: Duration,
}

impl HousekeeperWorker {
    /// Create a worker ticking at the housekeeper's home cycle
    pub fn new(housekeeper: Housekeeper) -> Self {
        let interval = housekeeper.config().home_cycle();
        Self {
            housekeeper,
            interval,
        }
    }

    /// Run until a shutdown signal (Ctrl+C) or a device restart
    ///
    /// # Errors
    ///
    /// Returns an error if the shutdown signal handler cannot be installed.
    pub async fn run(&mut self) -> Result<WorkerExit, HousekeeperError> {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!("Housekeeping worker started (interval: {:?})", self.interval);

        let exit = loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if self.housekeeper.run_cycle().restarted {
                        break WorkerExit::Restart;
                    }
                }
                signal = tokio::signal::ctrl_c() => {
                    signal.map_err(|e| HousekeeperError::Worker(e.to_string()))?;
                    tracing::info!("Shutdown signal received, stopping housekeeping");
                    break WorkerExit::Shutdown;
                }
            }
        };

        tracing::info!(
            "Housekeeping worker stopped ({:?}). Final metrics:\n{}",
            exit,
            self.housekeeper.metrics().summary()
        );

        Ok(exit)
    }

    /// Run a fixed number of cycles (useful for testing)
    ///
    /// Stops early if a cycle restarts the device.
    pub async fn run_cycles(&mut self, cycles: usize) -> WorkerExit {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            "Housekeeping worker started for {} cycles (interval: {:?})",
            cycles,
            self.interval
        );

        for cycle in 0..cycles {
            ticker.tick().await;

            tracing::debug!("Starting housekeeping cycle {}/{}", cycle + 1, cycles);

            if self.housekeeper.run_cycle().restarted {
                tracing::info!("Cycle {}/{} restarted the device", cycle + 1, cycles);
                return WorkerExit::Restart;
            }
        }

        tracing::info!(
            "Housekeeping worker finished {} cycles. Final metrics:\n{}",
            cycles,
            self.housekeeper.metrics().summary()
        );

        WorkerExit::Completed
    }

    /// Get a reference to the housekeeper
    pub fn housekeeper(&self) -> &Housekeeper {
        &self.housekeeper
    }

    /// Get a reference to the housekeeper's current metrics
    pub fn metrics(&self) -> &HousekeepingMetrics {
        self.housekeeper.metrics()
    }

    /// Reset the housekeeper's metrics counters
    pub fn reset_metrics(&mut self) {
        self.housekeeper.reset_metrics();
    }
}
