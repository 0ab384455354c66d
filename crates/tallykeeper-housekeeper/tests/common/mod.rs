//! Mock collaborators shared by the integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tallykeeper_domain::traits::{
    BatteryProbe, EnvironmentSensor, MemoryProbe, NetworkTimeCallback, PeripheralBus,
    PositionSource, Restarter, RollingClock, SaltSource, StackMonitor, Transport,
};
use tallykeeper_domain::{CounterSnapshot, DecodedTime, LogicalChannel, PrivacySalt, TaskId};
use tallykeeper_housekeeper::{HousekeeperConfig, Platform};

/// Collaborator call, in the order it happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Peripherals,
    TransportHousekeeping,
    NetworkRequest,
    Sensor,
    Stack(TaskId),
    Battery,
    Flush(LogicalChannel, CounterSnapshot),
    Salt,
    Restart,
}

#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Event>>>);

impl Recorder {
    fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&Event) -> bool) -> usize {
        self.0.lock().unwrap().iter().filter(|e| predicate(e)).count()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

/// Handles for steering the mocks after the platform is handed over
#[derive(Clone)]
pub struct Handles {
    pub recorder: Recorder,
    pub clock: Arc<AtomicU32>,
    pub min_free_heap: Arc<AtomicU32>,
    /// Low-water mark reported once the counters have been reset
    pub heap_after_reset: Arc<Mutex<Option<u32>>>,
    pub callbacks: Arc<Mutex<Vec<NetworkTimeCallback>>>,
    pub gps_fix: Arc<Mutex<Option<DecodedTime>>>,
}

impl Handles {
    pub fn set_clock(&self, millis: u32) {
        self.clock.store(millis, Ordering::SeqCst);
    }

    pub fn set_min_free_heap(&self, bytes: u32) {
        self.min_free_heap.store(bytes, Ordering::SeqCst);
    }

    pub fn set_heap_after_reset(&self, bytes: u32) {
        *self.heap_after_reset.lock().unwrap() = Some(bytes);
    }

    pub fn set_gps_fix(&self, fix: Option<DecodedTime>) {
        *self.gps_fix.lock().unwrap() = fix;
    }

    /// Answer the oldest outstanding network time request
    pub fn answer_network_time(&self, secs: u32) {
        let callback = self.callbacks.lock().unwrap().remove(0);
        callback(secs);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MockOptions {
    pub gps: bool,
    pub sensor: bool,
    pub battery_mv: Option<u32>,
}

struct MockClock(Arc<AtomicU32>);

impl RollingClock for MockClock {
    fn millis(&self) -> u32 {
        self.0.load(Ordering::SeqCst)
    }
}

struct MockMemory(Arc<AtomicU32>);

impl MemoryProbe for MockMemory {
    fn min_free_heap(&self) -> u32 {
        self.0.load(Ordering::SeqCst)
    }

    fn free_heap(&self) -> u32 {
        self.0.load(Ordering::SeqCst) + 1_000
    }
}

struct MockPeripherals(Recorder);

impl PeripheralBus for MockPeripherals {
    fn housekeeping(&mut self) {
        self.0.push(Event::Peripherals);
    }
}

struct MockTransport {
    recorder: Recorder,
    callbacks: Arc<Mutex<Vec<NetworkTimeCallback>>>,
}

impl Transport for MockTransport {
    fn housekeeping(&mut self) {
        self.recorder.push(Event::TransportHousekeeping);
    }

    fn send_counters(&mut self, channel: LogicalChannel, counters: &CounterSnapshot) {
        self.recorder.push(Event::Flush(channel, *counters));
    }

    fn request_network_time(&mut self, callback: NetworkTimeCallback) {
        self.recorder.push(Event::NetworkRequest);
        self.callbacks.lock().unwrap().push(callback);
    }
}

struct MockStacks(Recorder);

impl StackMonitor for MockStacks {
    fn headroom(&self, task: TaskId) -> Option<u32> {
        self.0.push(Event::Stack(task));
        match task {
            TaskId::WifiSwitch | TaskId::IrqHandler => Some(1_024),
            TaskId::Gps | TaskId::Led => None,
        }
    }
}

/// Counting salts; applies the post-reset heap reading when drawn
struct MockSalts {
    recorder: Recorder,
    next: u32,
    min_free_heap: Arc<AtomicU32>,
    heap_after_reset: Arc<Mutex<Option<u32>>>,
}

impl SaltSource for MockSalts {
    fn next_salt(&mut self) -> PrivacySalt {
        self.recorder.push(Event::Salt);
        if let Some(bytes) = *self.heap_after_reset.lock().unwrap() {
            self.min_free_heap.store(bytes, Ordering::SeqCst);
        }
        self.next += 1;
        PrivacySalt(self.next)
    }
}

struct MockRestarter(Recorder);

impl Restarter for MockRestarter {
    fn restart(&mut self) {
        self.0.push(Event::Restart);
    }
}

struct MockPosition(Arc<Mutex<Option<DecodedTime>>>);

impl PositionSource for MockPosition {
    fn time_fix(&self) -> Option<DecodedTime> {
        *self.0.lock().unwrap()
    }
}

struct MockSensor(Recorder);

impl EnvironmentSensor for MockSensor {
    fn refresh(&mut self) {
        self.0.push(Event::Sensor);
    }
}

struct MockBattery(Recorder, u32);

impl BatteryProbe for MockBattery {
    fn read_millivolts(&mut self) -> u32 {
        self.0.push(Event::Battery);
        self.1
    }
}

/// Build a platform of mocks with plenty of free memory
pub fn mock_platform(options: MockOptions) -> (Platform, Handles) {
    let handles = Handles {
        recorder: Recorder::default(),
        clock: Arc::new(AtomicU32::new(0)),
        min_free_heap: Arc::new(AtomicU32::new(100_000)),
        heap_after_reset: Arc::new(Mutex::new(None)),
        callbacks: Arc::new(Mutex::new(Vec::new())),
        gps_fix: Arc::new(Mutex::new(None)),
    };
    let recorder = handles.recorder.clone();

    let platform = Platform {
        clock: Box::new(MockClock(handles.clock.clone())),
        memory: Box::new(MockMemory(handles.min_free_heap.clone())),
        peripherals: Box::new(MockPeripherals(recorder.clone())),
        transport: Box::new(MockTransport {
            recorder: recorder.clone(),
            callbacks: handles.callbacks.clone(),
        }),
        stacks: Box::new(MockStacks(recorder.clone())),
        salts: Box::new(MockSalts {
            recorder: recorder.clone(),
            next: 0,
            min_free_heap: handles.min_free_heap.clone(),
            heap_after_reset: handles.heap_after_reset.clone(),
        }),
        restarter: Box::new(MockRestarter(recorder.clone())),
        position: options
            .gps
            .then(|| Box::new(MockPosition(handles.gps_fix.clone())) as Box<dyn PositionSource + Send>),
        sensor: options
            .sensor
            .then(|| Box::new(MockSensor(recorder.clone())) as Box<dyn EnvironmentSensor + Send>),
        battery: options
            .battery_mv
            .map(|mv| Box::new(MockBattery(recorder.clone(), mv)) as Box<dyn BatteryProbe + Send>),
    };

    (platform, handles)
}

/// Configuration used by most tests: 10 000 byte threshold, hourly sync
pub fn test_config() -> HousekeeperConfig {
    HousekeeperConfig {
        home_cycle_secs: 30,
        time_sync_interval_minutes: Some(60),
        low_memory_threshold_bytes: 10_000,
        ..Default::default()
    }
}

pub fn gps_fix() -> DecodedTime {
    DecodedTime {
        year: 2024,
        month: 3,
        day: 15,
        hour: 12,
        minute: 30,
        second: 45,
    }
}
