//! The housekeeping cycle

use crate::timesync::{SyncOutcome, TimeSyncScheduler};
use crate::uptime::UptimeTracker;
use crate::watchdog::{MemoryWatchdog, WatchdogContext, WatchdogOutcome};
use crate::{HealthState, HousekeeperConfig, HousekeeperError, HousekeepingMetrics};
use std::sync::Arc;
use tallykeeper_domain::traits::{
    BatteryProbe, EnvironmentSensor, MemoryProbe, PeripheralBus, PositionSource, Restarter,
    RollingClock, SaltSource, StackMonitor, Transport,
};
use tallykeeper_domain::{RuntimeMode, TaskId, TimeSource};

/// Firmware collaborators the housekeeper drives
///
/// Optional members are capabilities the hardware may lack; their steps are
/// skipped when absent.
pub struct Platform {
    /// Rolling millisecond clock
    pub clock: Box<dyn RollingClock + Send>,
    /// Heap statistics
    pub memory: Box<dyn MemoryProbe + Send>,
    /// SPI peripheral maintenance
    pub peripherals: Box<dyn PeripheralBus + Send>,
    /// Radio link
    pub transport: Box<dyn Transport + Send>,
    /// Task stack telemetry
    pub stacks: Box<dyn StackMonitor + Send>,
    /// Entropy for privacy salts
    pub salts: Box<dyn SaltSource + Send>,
    /// Device restart
    pub restarter: Box<dyn Restarter + Send>,
    /// GPS receiver, if fitted
    pub position: Option<Box<dyn PositionSource + Send>>,
    /// Environmental sensor, if fitted
    pub sensor: Option<Box<dyn EnvironmentSensor + Send>>,
    /// Battery probe, if fitted
    pub battery: Option<Box<dyn BatteryProbe + Send>>,
}

/// What a single cycle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Uptime in milliseconds at the start of the cycle
    pub uptime_ms: u64,

    /// A restart was requested; the cycle stopped there
    pub restarted: bool,

    /// Network time answer applied this cycle (UTC seconds)
    pub network_time: Option<u32>,

    /// Time sync scheduling result, `None` when time sync is disabled
    pub sync: Option<SyncOutcome>,

    /// Battery voltage sampled this cycle
    pub battery_mv: Option<u32>,

    /// Memory watchdog result, `None` if the cycle ended before it ran
    pub watchdog: Option<WatchdogOutcome>,
}

impl CycleReport {
    fn new(uptime_ms: u64) -> Self {
        Self {
            uptime_ms,
            restarted: false,
            network_time: None,
            sync: None,
            battery_mv: None,
            watchdog: None,
        }
    }
}

/// Periodic health maintenance for the counting device
///
/// Call [`Housekeeper::run_cycle`] once per home cycle. Each cycle:
/// 1. Advances uptime
/// 2. Restarts the device if the runtime mode asks for it (nothing else runs)
/// 3. Runs peripheral and transport housekeeping
/// 4. Synchronizes time when due (if enabled)
/// 5. Refreshes the environmental sensor (if enabled and fitted)
/// 6. Logs stack headroom of the monitored tasks
/// 7. Samples battery voltage (if enabled and fitted)
/// 8. Runs the memory watchdog
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use tallykeeper_housekeeper::{HealthState, Housekeeper, HousekeeperConfig, Platform};
///
/// # fn platform() -> Platform { unimplemented!() }
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let state = Arc::new(HealthState::default());
/// let mut housekeeper = Housekeeper::new(HousekeeperConfig::default(), state, platform())?;
///
/// let report = housekeeper.run_cycle();
/// println!("uptime: {} ms", report.uptime_ms);
/// # Ok(())
/// # }
/// ```
pub struct Housekeeper {
    config: HousekeeperConfig,
    tasks: Vec<TaskId>,
    state: Arc<HealthState>,
    platform: Platform,
    uptime: UptimeTracker,
    timesync: Option<TimeSyncScheduler>,
    watchdog: MemoryWatchdog,
    metrics: HousekeepingMetrics,
}

impl Housekeeper {
    /// Create a housekeeper after validating the configuration
    pub fn new(
        config: HousekeeperConfig,
        state: Arc<HealthState>,
        platform: Platform,
    ) -> Result<Self, HousekeeperError> {
        config.validate()?;

        Ok(Self {
            tasks: config.tasks()?,
            timesync: config.time_sync_interval().map(TimeSyncScheduler::new),
            watchdog: MemoryWatchdog::new(config.low_memory_threshold_bytes),
            uptime: UptimeTracker::new(),
            metrics: HousekeepingMetrics::new(),
            config,
            state,
            platform,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &HousekeeperConfig {
        &self.config
    }

    /// Get the shared health state
    pub fn state(&self) -> &Arc<HealthState> {
        &self.state
    }

    /// Get a reference to the current metrics
    pub fn metrics(&self) -> &HousekeepingMetrics {
        &self.metrics
    }

    /// Reset metrics counters
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }

    /// Uptime (ms) at which time sync next runs, `None` if disabled
    pub fn next_sync_deadline(&self) -> Option<u64> {
        self.timesync.as_ref().map(TimeSyncScheduler::next_sync_deadline)
    }

    /// Run one housekeeping cycle
    pub fn run_cycle(&mut self) -> CycleReport {
        self.metrics.record_cycle();

        let uptime_ms = self.uptime.advance(self.platform.clock.millis());
        self.state.set_uptime_ms(uptime_ms);
        let mut report = CycleReport::new(uptime_ms);
        tracing::debug!("Housekeeping cycle {} at uptime {} ms", self.metrics.cycle_count, uptime_ms);

        if self.state.mode() == RuntimeMode::ForcedRestart {
            tracing::info!("Restart triggered by runtime mode");
            self.platform.restarter.restart();
            self.metrics.record_restart();
            report.restarted = true;
            return report;
        }

        self.platform.peripherals.housekeeping();
        self.platform.transport.housekeeping();

        self.sync_time(uptime_ms, &mut report);
        self.refresh_sensor();
        self.log_stack_headroom();
        report.battery_mv = self.sample_battery();

        let outcome = self.watchdog.check(WatchdogContext {
            state: &self.state,
            memory: &*self.platform.memory,
            transport: &mut *self.platform.transport,
            salts: &mut *self.platform.salts,
            restarter: &mut *self.platform.restarter,
        });
        self.record_watchdog(outcome);
        report.watchdog = Some(outcome);
        report.restarted = outcome == WatchdogOutcome::Restarted;

        report
    }

    fn sync_time(&mut self, now_ms: u64, report: &mut CycleReport) {
        let Some(scheduler) = self.timesync.as_mut() else {
            return;
        };

        if let Some(secs) = scheduler.collect_reply(&self.state) {
            self.metrics.record_time_sync(TimeSource::Network);
            report.network_time = Some(secs);
        }

        let position = self
            .platform
            .position
            .as_deref()
            .map(|position| position as &dyn PositionSource);
        let outcome = scheduler.maybe_sync(
            now_ms,
            &self.state,
            position,
            &mut *self.platform.transport,
        );

        match outcome {
            SyncOutcome::Gps(_) => self.metrics.record_time_sync(TimeSource::Gps),
            SyncOutcome::NetworkRequested => self.metrics.record_network_request(),
            SyncOutcome::NotDue => {}
        }
        report.sync = Some(outcome);
    }

    fn refresh_sensor(&mut self) {
        if !self.config.read_environment {
            return;
        }
        if let Some(sensor) = self.platform.sensor.as_mut() {
            sensor.refresh();
        }
    }

    fn log_stack_headroom(&self) {
        for task in &self.tasks {
            match self.platform.stacks.headroom(*task) {
                Some(bytes) => tracing::debug!("{} {} bytes left", task, bytes),
                None => tracing::trace!("{} not running", task),
            }
        }
    }

    fn sample_battery(&mut self) -> Option<u32> {
        if !self.config.probe_battery {
            return None;
        }
        let battery = self.platform.battery.as_mut()?;

        let mv = battery.read_millivolts();
        self.state.set_battery_millivolts(mv);
        tracing::info!("Measured voltage: {}mV", mv);
        Some(mv)
    }

    fn record_watchdog(&mut self, outcome: WatchdogOutcome) {
        match outcome {
            WatchdogOutcome::Healthy => {}
            WatchdogOutcome::Recovered => {
                self.metrics.record_low_memory();
                self.metrics.record_flush();
                self.metrics.record_reset();
            }
            WatchdogOutcome::Restarted => {
                self.metrics.record_low_memory();
                self.metrics.record_flush();
                self.metrics.record_reset();
                self.metrics.record_restart();
            }
        }
    }
}
