//! Wraparound-safe uptime from a 32-bit millisecond clock

/// 64-bit uptime built from a rolling 32-bit millisecond counter
///
/// The low word is the last clock reading; the high word counts wraps. A wrap
/// is detected when a reading is smaller than the previous one, so at most one
/// wrap can be seen per call: `advance` must be called more often than the
/// clock period (about 49.7 days for a millisecond `u32`). Missed wraps are
/// lost silently. `HousekeeperConfig::validate` enforces the cadence.
#[derive(Debug, Clone, Default)]
pub struct UptimeTracker {
    low32: u32,
    high32: u32,
}

impl UptimeTracker {
    /// Create a tracker at zero uptime
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the current clock reading and return the uptime in milliseconds
    pub fn advance(&mut self, reading: u32) -> u64 {
        if reading < self.low32 {
            self.high32 = self.high32.wrapping_add(1);
        }
        self.low32 = reading;
        self.uptime()
    }

    /// Uptime as of the last `advance`
    pub fn uptime(&self) -> u64 {
        (u64::from(self.high32) << 32) | u64::from(self.low32)
    }

    /// Number of clock wraps observed
    pub fn wraps(&self) -> u32 {
        self.high32
    }
}
