//! Detection counters - identifiers seen since the last reset

use std::collections::HashSet;

/// Radio technology through which a device was detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectionSource {
    /// Wi-Fi probe request
    Wifi,

    /// Bluetooth Low Energy advertisement
    Ble,
}

impl DetectionSource {
    /// Get the source name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionSource::Wifi => "wifi",
            DetectionSource::Ble => "ble",
        }
    }
}

/// Point-in-time copy of the tallies, handed to the transport for sending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterSnapshot {
    /// Distinct devices seen over Wi-Fi
    pub wifi: u32,

    /// Distinct devices seen over BLE
    pub ble: u32,

    /// Distinct devices seen over any source
    pub total: u32,
}

/// Accumulated detection state
///
/// Identifiers are already salted and hashed by the detection subsystem; this
/// type only deduplicates them and keeps the tallies in step with the set.
#[derive(Debug, Clone, Default)]
pub struct DetectionCounters {
    seen: HashSet<u32>,
    wifi: u32,
    ble: u32,
    total: u32,
}

impl DetectionCounters {
    /// Create an empty set of counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a hashed identifier
    ///
    /// Returns `true` if the identifier had not been seen since the last reset.
    /// Tallies only move for new identifiers.
    pub fn record(&mut self, id: u32, source: DetectionSource) -> bool {
        if !self.seen.insert(id) {
            return false;
        }

        match source {
            DetectionSource::Wifi => self.wifi += 1,
            DetectionSource::Ble => self.ble += 1,
        }
        self.total += 1;
        true
    }

    /// Number of distinct identifiers held
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether no identifiers are held
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Whether the given identifier has been seen since the last reset
    pub fn contains(&self, id: u32) -> bool {
        self.seen.contains(&id)
    }

    /// Tally for a single source
    pub fn count(&self, source: DetectionSource) -> u32 {
        match source {
            DetectionSource::Wifi => self.wifi,
            DetectionSource::Ble => self.ble,
        }
    }

    /// Tally across all sources
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Copy the tallies out
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            wifi: self.wifi,
            ble: self.ble,
            total: self.total,
        }
    }

    /// Drop every identifier and zero all tallies
    pub fn clear(&mut self) {
        self.seen.clear();
        // Release the backing storage too; clearing is how memory pressure is relieved.
        self.seen.shrink_to_fit();
        self.wifi = 0;
        self.ble = 0;
        self.total = 0;
    }
}
