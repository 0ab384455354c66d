//! Simulated device platform.
//!
//! Host stand-ins for the firmware collaborators, good enough to watch the
//! housekeeping loop sync time, recover memory and restart.

use chrono::{Datelike, Timelike, Utc};
use rand::Rng;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tallykeeper_domain::traits::{
    BatteryProbe, EnvironmentSensor, MemoryProbe, NetworkTimeCallback, PeripheralBus,
    PositionSource, Restarter, RollingClock, StackMonitor, Transport,
};
use tallykeeper_domain::{CounterSnapshot, DecodedTime, DetectionSource, LogicalChannel, TaskId};
use tallykeeper_housekeeper::{HealthState, Platform, RandomSalts};

/// Heap taken by firmware other than the detection counters
const BASE_HEAP_USAGE: u32 = 32 * 1024;

/// Heap cost of one tracked identifier (set entry plus allocator overhead)
const BYTES_PER_DETECTION: u32 = 48;

/// Knobs for building a simulated platform.
#[derive(Debug, Clone)]
pub struct SimOptions {
    /// Initial rolling clock value
    pub clock_offset_ms: u32,
    /// Total heap
    pub heap_bytes: u32,
    /// Bytes leaked per peripheral housekeeping call
    pub leak_bytes: u32,
    /// Fit a GPS receiver
    pub gps: bool,
}

/// Rolling clock that starts at an offset and wraps like a 32-bit `millis()`.
pub struct SimClock {
    start: Instant,
    offset_ms: u32,
}

impl SimClock {
    /// Clock reading `offset_ms` now.
    pub fn new(offset_ms: u32) -> Self {
        Self {
            start: Instant::now(),
            offset_ms,
        }
    }
}

impl RollingClock for SimClock {
    fn millis(&self) -> u32 {
        // Truncating to 32 bits is the rollover.
        let elapsed = self.start.elapsed().as_millis() as u32;
        self.offset_ms.wrapping_add(elapsed)
    }
}

/// Heap whose usage grows with the number of tracked identifiers.
///
/// The low-water mark covers the period since it was last read: a read
/// re-arms it, and only later observations (or the current level) lower it
/// again. Clearing the counters therefore shows up on the next read. Clones
/// share the same heap.
#[derive(Clone)]
pub struct SimHeap {
    capacity: u32,
    state: Arc<HealthState>,
    leaked: Arc<AtomicU32>,
    low_water: Arc<AtomicU32>,
}

impl SimHeap {
    /// Heap of `capacity` bytes backing `state`.
    pub fn new(capacity: u32, state: Arc<HealthState>) -> Self {
        Self {
            capacity,
            state,
            leaked: Arc::new(AtomicU32::new(0)),
            low_water: Arc::new(AtomicU32::new(capacity)),
        }
    }

    fn current_free(&self) -> u32 {
        let detections = u32::try_from(self.state.counters().len()).unwrap_or(u32::MAX);
        let used = BASE_HEAP_USAGE
            .saturating_add(detections.saturating_mul(BYTES_PER_DETECTION))
            .saturating_add(self.leaked.load(Ordering::Acquire));
        self.capacity.saturating_sub(used)
    }

    /// Fold the current free heap into the low-water mark.
    pub fn observe(&self) {
        self.low_water.fetch_min(self.current_free(), Ordering::AcqRel);
    }

    /// Lose `bytes` for good.
    pub fn leak(&self, bytes: u32) {
        self.leaked.fetch_add(bytes, Ordering::AcqRel);
        self.observe();
    }
}

impl MemoryProbe for SimHeap {
    fn min_free_heap(&self) -> u32 {
        let low_water = self.low_water.swap(self.capacity, Ordering::AcqRel);
        low_water.min(self.current_free())
    }

    fn free_heap(&self) -> u32 {
        self.current_free()
    }
}

/// SPI bus that optionally leaks memory on every maintenance call.
pub struct SimPeripherals {
    heap: SimHeap,
    leak_bytes: u32,
}

impl PeripheralBus for SimPeripherals {
    fn housekeeping(&mut self) {
        if self.leak_bytes > 0 {
            self.heap.leak(self.leak_bytes);
            tracing::trace!("Peripheral bus leaked {} bytes", self.leak_bytes);
        }
    }
}

/// Radio link that answers network time requests on its next maintenance call.
#[derive(Default)]
pub struct SimTransport {
    pending: Option<NetworkTimeCallback>,
}

impl Transport for SimTransport {
    fn housekeeping(&mut self) {
        if let Some(callback) = self.pending.take() {
            match SystemTime::now().duration_since(UNIX_EPOCH) {
                Ok(now) => callback(u32::try_from(now.as_secs()).unwrap_or(u32::MAX)),
                Err(e) => tracing::warn!("Host clock before epoch, dropping time request: {}", e),
            }
        }
    }

    fn send_counters(&mut self, channel: LogicalChannel, counters: &CounterSnapshot) {
        tracing::info!(
            "Sending counters on {}: wifi={} ble={} total={}",
            channel,
            counters.wifi,
            counters.ble,
            counters.total
        );
    }

    fn request_network_time(&mut self, callback: NetworkTimeCallback) {
        self.pending = Some(callback);
    }
}

/// GPS receiver with a permanent fix taken from the host clock.
pub struct SimGps;

impl PositionSource for SimGps {
    fn time_fix(&self) -> Option<DecodedTime> {
        let now = Utc::now();
        Some(DecodedTime {
            year: u16::try_from(now.year()).ok()?,
            month: u8::try_from(now.month()).ok()?,
            day: u8::try_from(now.day()).ok()?,
            hour: u8::try_from(now.hour()).ok()?,
            minute: u8::try_from(now.minute()).ok()?,
            second: u8::try_from(now.second()).ok()?,
        })
    }
}

/// Environmental sensor that only logs.
pub struct SimSensor;

impl EnvironmentSensor for SimSensor {
    fn refresh(&mut self) {
        tracing::trace!("Environment sensor refreshed");
    }
}

/// Battery discharging slowly from full, with measurement noise.
pub struct SimBattery {
    millivolts: u32,
}

impl Default for SimBattery {
    fn default() -> Self {
        Self { millivolts: 4_200 }
    }
}

impl BatteryProbe for SimBattery {
    fn read_millivolts(&mut self) -> u32 {
        self.millivolts = self.millivolts.saturating_sub(1).max(3_300);
        let noise: i32 = rand::thread_rng().gen_range(-15..=15);
        self.millivolts.saturating_add_signed(noise)
    }
}

/// Fixed stack headroom per task.
pub struct SimStacks {
    gps: bool,
}

impl StackMonitor for SimStacks {
    fn headroom(&self, task: TaskId) -> Option<u32> {
        match task {
            TaskId::WifiSwitch => Some(1_536),
            TaskId::IrqHandler => Some(2_304),
            TaskId::Gps if self.gps => Some(1_184),
            TaskId::Gps | TaskId::Led => None,
        }
    }
}

/// Restart hook that raises a flag instead of resetting the host.
pub struct SimRestarter {
    requested: Arc<AtomicBool>,
}

impl Restarter for SimRestarter {
    fn restart(&mut self) {
        tracing::warn!("Device restart requested");
        self.requested.store(true, Ordering::Release);
    }
}

/// A booted simulated device.
pub struct SimDevice {
    /// Collaborators for the housekeeper
    pub platform: Platform,
    /// Heap shared with the detection feed
    pub heap: SimHeap,
    /// Raised when the housekeeper restarts the device
    pub restart_requested: Arc<AtomicBool>,
}

/// Build the simulated collaborators around `state`.
pub fn boot(options: &SimOptions, state: Arc<HealthState>) -> SimDevice {
    let heap = SimHeap::new(options.heap_bytes, state);
    let restart_requested = Arc::new(AtomicBool::new(false));

    let platform = Platform {
        clock: Box::new(SimClock::new(options.clock_offset_ms)),
        memory: Box::new(heap.clone()),
        peripherals: Box::new(SimPeripherals {
            heap: heap.clone(),
            leak_bytes: options.leak_bytes,
        }),
        transport: Box::new(SimTransport::default()),
        stacks: Box::new(SimStacks { gps: options.gps }),
        salts: Box::new(RandomSalts::new()),
        restarter: Box::new(SimRestarter {
            requested: Arc::clone(&restart_requested),
        }),
        position: if options.gps {
            Some(Box::new(SimGps))
        } else {
            None
        },
        sensor: Some(Box::new(SimSensor)),
        battery: Some(Box::new(SimBattery::default())),
    };

    SimDevice {
        platform,
        heap,
        restart_requested,
    }
}

/// Feed random detections into the shared state until aborted.
pub async fn detection_feed(state: Arc<HealthState>, heap: SimHeap, per_second: u32) {
    if per_second == 0 {
        return;
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(1) / per_second);
    loop {
        ticker.tick().await;

        // Draw before the await point; thread_rng is not Send.
        let (id, source) = {
            let mut rng = rand::thread_rng();
            let source = if rng.gen_bool(0.7) {
                DetectionSource::Wifi
            } else {
                DetectionSource::Ble
            };
            (rng.gen::<u32>(), source)
        };

        if state.record_detection(id, source) {
            heap.observe();
        }
    }
}
