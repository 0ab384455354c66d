//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the housekeeping scheduler and
//! the rest of the firmware. Implementations live in platform crates (or in
//! the simulator shipped with the CLI).

use crate::{CounterSnapshot, DecodedTime, LogicalChannel, PrivacySalt, TaskId};

/// Callback invoked with UTC seconds once a network time answer arrives
///
/// May be invoked from any execution context, at most once, or never.
pub type NetworkTimeCallback = Box<dyn FnOnce(u32) + Send + 'static>;

/// Free-running millisecond counter that wraps at `u32::MAX`
pub trait RollingClock {
    /// Current reading in milliseconds
    fn millis(&self) -> u32;
}

/// Heap statistics of the runtime
pub trait MemoryProbe {
    /// Lowest free heap observed since the reference point (boot)
    fn min_free_heap(&self) -> u32;

    /// Free heap right now
    fn free_heap(&self) -> u32;
}

/// Low-level peripheral bus maintenance
pub trait PeripheralBus {
    /// Periodic maintenance; failures are handled internally
    fn housekeeping(&mut self);
}

/// Long-range radio link
pub trait Transport {
    /// Periodic link maintenance; failures are handled internally
    fn housekeeping(&mut self);

    /// Queue the given counters for sending on a logical channel
    fn send_counters(&mut self, channel: LogicalChannel, counters: &CounterSnapshot);

    /// Schedule a network time request at the next opportunity
    ///
    /// Must return immediately; `callback` is invoked later with the answer.
    fn request_network_time(&mut self, callback: NetworkTimeCallback);
}

/// Positioning receiver
pub trait PositionSource {
    /// Decoded UTC time, if the receiver currently holds a valid time fix
    fn time_fix(&self) -> Option<DecodedTime>;
}

/// Environmental sensor (temperature, humidity, air quality)
pub trait EnvironmentSensor {
    /// Take a fresh reading; the sensor keeps it for its own consumers
    fn refresh(&mut self);
}

/// Battery voltage probe
pub trait BatteryProbe {
    /// Battery voltage in millivolts
    fn read_millivolts(&mut self) -> u32;
}

/// Stack usage of background tasks
pub trait StackMonitor {
    /// Unused stack bytes of a task, or `None` if the task is not running
    fn headroom(&self, task: TaskId) -> Option<u32>;
}

/// Entropy source for privacy salts
pub trait SaltSource {
    /// Produce a fresh salt
    fn next_salt(&mut self) -> PrivacySalt;
}

/// Device restart
pub trait Restarter {
    /// Restart the device
    ///
    /// On hardware this never returns. Host implementations record the request
    /// and return; the caller must treat the cycle as finished.
    fn restart(&mut self);
}
