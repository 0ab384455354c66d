//! Shared health state
//!
//! Everything the housekeeping cycle and the concurrently running firmware
//! tasks both touch lives here, behind a mutex or an atomic. The detection
//! feed writes counters, the transport reads them, the scheduler clears them.

use std::sync::atomic::{AtomicU32, AtomicU64, AtomicU8, Ordering};
use std::sync::{Mutex, MutexGuard};
use tallykeeper_domain::{
    CounterSnapshot, DetectionCounters, DetectionSource, PrivacySalt, RuntimeMode,
};

/// Process-wide device state shared between tasks
///
/// Wrap in an `Arc` and hand clones to every task that needs it.
#[derive(Debug, Default)]
pub struct HealthState {
    counters: Mutex<DetectionCounters>,
    salt: AtomicU32,
    uptime_ms: AtomicU64,
    // Seconds since the epoch; 0 until the first successful sync.
    utc_secs: AtomicU32,
    battery_mv: AtomicU32,
    mode: AtomicU8,
}

impl HealthState {
    /// Create an empty state with the given initial salt
    pub fn new(salt: PrivacySalt) -> Self {
        Self {
            salt: AtomicU32::new(salt.value()),
            ..Self::default()
        }
    }

    /// Lock the detection counters
    ///
    /// A panic in another holder does not leave the counters inconsistent
    /// (every mutation is a single call), so poisoning is ignored.
    pub fn counters(&self) -> MutexGuard<'_, DetectionCounters> {
        self.counters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record a hashed identifier; returns `true` if it was new
    pub fn record_detection(&self, id: u32, source: DetectionSource) -> bool {
        self.counters().record(id, source)
    }

    /// Copy of the current tallies
    pub fn snapshot(&self) -> CounterSnapshot {
        self.counters().snapshot()
    }

    /// Salt currently used for hashing identifiers
    pub fn salt(&self) -> PrivacySalt {
        PrivacySalt(self.salt.load(Ordering::Acquire))
    }

    pub(crate) fn set_salt(&self, salt: PrivacySalt) {
        self.salt.store(salt.value(), Ordering::Release);
    }

    /// Milliseconds since boot, as of the last housekeeping cycle
    pub fn uptime_ms(&self) -> u64 {
        self.uptime_ms.load(Ordering::Acquire)
    }

    pub(crate) fn set_uptime_ms(&self, uptime_ms: u64) {
        self.uptime_ms.store(uptime_ms, Ordering::Release);
    }

    /// UTC seconds since the epoch, or `None` before the first time sync
    pub fn utc_time(&self) -> Option<u32> {
        match self.utc_secs.load(Ordering::Acquire) {
            0 => None,
            secs => Some(secs),
        }
    }

    pub(crate) fn set_utc_time(&self, secs: u32) {
        self.utc_secs.store(secs, Ordering::Release);
    }

    /// Last sampled battery voltage in millivolts, or `None` if never sampled
    pub fn battery_millivolts(&self) -> Option<u32> {
        match self.battery_mv.load(Ordering::Acquire) {
            0 => None,
            mv => Some(mv),
        }
    }

    pub(crate) fn set_battery_millivolts(&self, mv: u32) {
        self.battery_mv.store(mv, Ordering::Release);
    }

    /// Current runtime mode
    pub fn mode(&self) -> RuntimeMode {
        RuntimeMode::from_u8(self.mode.load(Ordering::Acquire))
    }

    /// Set the runtime mode (switch handler, update trigger)
    pub fn set_mode(&self, mode: RuntimeMode) {
        self.mode.store(mode.as_u8(), Ordering::Release);
    }
}
