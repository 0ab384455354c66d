//! Memory watchdog: flush, reset, and restart on persistent exhaustion

use crate::reset::reset_counters;
use crate::HealthState;
use tallykeeper_domain::traits::{MemoryProbe, Restarter, SaltSource, Transport};
use tallykeeper_domain::LogicalChannel;

/// Result of a watchdog check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogOutcome {
    /// Free memory above threshold, nothing done
    Healthy,

    /// Counters flushed and cleared, memory recovered
    Recovered,

    /// Memory still low after clearing, device restart requested
    Restarted,
}

/// Recovery stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Checking the low-water mark
    Normal,

    /// Flushing and clearing the counters, with the low-water mark that
    /// triggered it
    Recovering { low_water: u32 },

    /// Re-checking after the reset; restart if still low
    Escalating,
}

/// Collaborators the watchdog acts through
pub struct WatchdogContext<'a> {
    /// Shared device state holding the counters
    pub state: &'a HealthState,
    /// Heap statistics
    pub memory: &'a dyn MemoryProbe,
    /// Radio link used for the pre-reset flush
    pub transport: &'a mut dyn Transport,
    /// Source of the replacement salt
    pub salts: &'a mut dyn SaltSource,
    /// Last-resort restart
    pub restarter: &'a mut dyn Restarter,
}

/// Watches the heap low-water mark
///
/// Clearing the detection counters is the cheapest way to free memory, so it
/// is tried first. If the low-water mark is still at or below the threshold
/// afterwards the shortage is treated as a leak and the device is restarted.
#[derive(Debug, Clone)]
pub struct MemoryWatchdog {
    threshold: u32,
}

impl MemoryWatchdog {
    /// Create a watchdog with the given low-memory threshold (bytes)
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    /// Threshold in bytes
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    fn is_low(&self, low_water: u32) -> bool {
        low_water <= self.threshold
    }

    /// Run one check, cascading into recovery as needed
    ///
    /// The low-water mark is read at most twice: once to decide and
    /// once after the reset. Probes may re-arm the mark on every read.
    pub fn check(&self, ctx: WatchdogContext<'_>) -> WatchdogOutcome {
        let WatchdogContext {
            state,
            memory,
            transport,
            salts,
            restarter,
        } = ctx;
        let mut stage = Stage::Normal;

        loop {
            stage = match stage {
                Stage::Normal => {
                    let low_water = memory.min_free_heap();
                    if !self.is_low(low_water) {
                        return WatchdogOutcome::Healthy;
                    }
                    Stage::Recovering { low_water }
                }
                Stage::Recovering { low_water } => {
                    tracing::info!(
                        "Memory full, counter cleared (heap low water mark = {} bytes / free heap = {} bytes)",
                        low_water,
                        memory.free_heap()
                    );

                    // Send before clearing so the data is not lost.
                    let snapshot = state.snapshot();
                    transport.send_counters(LogicalChannel::COUNTERS, &snapshot);
                    reset_counters(state, salts);
                    Stage::Escalating
                }
                Stage::Escalating => {
                    let low_water = memory.min_free_heap();
                    if !self.is_low(low_water) {
                        return WatchdogOutcome::Recovered;
                    }

                    tracing::warn!(
                        "Memory still low after reset (heap low water mark = {} bytes), restarting",
                        low_water
                    );
                    restarter.restart();
                    return WatchdogOutcome::Restarted;
                }
            };
        }
    }
}
