//! Metrics collection for housekeeping cycles

use std::collections::HashMap;
use tallykeeper_domain::TimeSource;

/// Metrics collected across housekeeping cycles
///
/// Tracks recovery actions, restarts and time syncs per source.
#[derive(Debug, Clone, Default)]
pub struct HousekeepingMetrics {
    /// Total housekeeping cycles started
    pub cycle_count: usize,

    /// Low-memory conditions detected
    pub low_memory_events: usize,

    /// Counter payloads flushed before a reset
    pub flushes: usize,

    /// Counter resets performed
    pub counter_resets: usize,

    /// Restarts requested (manual trigger or persistent low memory)
    pub restarts: usize,

    /// Successful time syncs per source
    pub time_syncs: HashMap<TimeSource, usize>,

    /// Network time requests issued
    pub network_requests: usize,
}

impl HousekeepingMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the start of a cycle
    pub fn record_cycle(&mut self) {
        self.cycle_count += 1;
    }

    /// Record a low-memory detection
    pub fn record_low_memory(&mut self) {
        self.low_memory_events += 1;
    }

    /// Record a pre-reset flush
    pub fn record_flush(&mut self) {
        self.flushes += 1;
    }

    /// Record a counter reset
    pub fn record_reset(&mut self) {
        self.counter_resets += 1;
    }

    /// Record a restart request
    pub fn record_restart(&mut self) {
        self.restarts += 1;
    }

    /// Record a successful time sync
    pub fn record_time_sync(&mut self, source: TimeSource) {
        *self.time_syncs.entry(source).or_insert(0) += 1;
    }

    /// Record a network time request
    pub fn record_network_request(&mut self) {
        self.network_requests += 1;
    }

    /// Successful syncs across all sources
    pub fn total_time_syncs(&self) -> usize {
        self.time_syncs.values().sum()
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Housekeeping Metrics Summary".to_string(),
            "============================".to_string(),
            format!("Cycles: {}", self.cycle_count),
            format!("Low-memory events: {}", self.low_memory_events),
            format!("Flushes: {}", self.flushes),
            format!("Counter resets: {}", self.counter_resets),
            format!("Restarts: {}", self.restarts),
            format!("Network time requests: {}", self.network_requests),
        ];

        if !self.time_syncs.is_empty() {
            lines.push(String::new());
            lines.push("Time syncs by source:".to_string());
            for source in [TimeSource::Gps, TimeSource::Network] {
                if let Some(count) = self.time_syncs.get(&source) {
                    lines.push(format!("  {}: {}", source.as_str(), count));
                }
            }
            lines.push(format!("  Total: {}", self.total_time_syncs()));
        }

        lines.join("\n")
    }
}
