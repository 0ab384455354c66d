//! Time synchronization scheduling
//!
//! Once per sync interval the scheduler tries to set the device clock, first
//! from a GPS time fix and otherwise by asking the network. The network answer
//! arrives later through a callback; it is handed over on a oneshot channel
//! and applied on a following cycle by [`TimeSyncScheduler::collect_reply`].

use crate::HealthState;
use chrono::NaiveDate;
use std::time::Duration;
use tallykeeper_domain::traits::{PositionSource, Transport};
use tallykeeper_domain::DecodedTime;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

/// Result of a scheduling attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Deadline not reached, nothing done
    NotDue,

    /// Clock set from a GPS fix (UTC seconds)
    Gps(u32),

    /// No GPS fix; a network time request was issued
    NetworkRequested,
}

/// Decides when and from where to synchronize the device clock
#[derive(Debug)]
pub struct TimeSyncScheduler {
    interval_ms: u64,
    next_sync_ms: u64,
    pending: Option<oneshot::Receiver<u32>>,
}

impl TimeSyncScheduler {
    /// Create a scheduler that syncs every `interval`, starting immediately
    pub fn new(interval: Duration) -> Self {
        Self {
            interval_ms: u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            next_sync_ms: 0,
            pending: None,
        }
    }

    /// Uptime (ms) at which the next sync may be attempted
    pub fn next_sync_deadline(&self) -> u64 {
        self.next_sync_ms
    }

    /// Whether a network time request is still awaiting its answer
    pub fn has_pending_request(&self) -> bool {
        self.pending.is_some()
    }

    /// Apply a network time answer if one has arrived
    ///
    /// Never blocks. Returns the applied UTC seconds.
    pub fn collect_reply(&mut self, state: &HealthState) -> Option<u32> {
        let receiver = self.pending.as_mut()?;

        match receiver.try_recv() {
            Ok(secs) => {
                self.pending = None;
                state.set_utc_time(secs);
                tracing::info!("Time synced by network to {} (UTC seconds)", secs);
                Some(secs)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => {
                self.pending = None;
                tracing::debug!("Network time request dropped without an answer");
                None
            }
        }
    }

    /// Synchronize the clock if the deadline has passed
    ///
    /// The deadline moves forward before any attempt, so a slow or failed sync
    /// waits a full interval before the next try.
    pub fn maybe_sync(
        &mut self,
        now_ms: u64,
        state: &HealthState,
        position: Option<&dyn PositionSource>,
        transport: &mut dyn Transport,
    ) -> SyncOutcome {
        if now_ms < self.next_sync_ms {
            return SyncOutcome::NotDue;
        }
        self.next_sync_ms = now_ms.saturating_add(self.interval_ms);

        if let Some(position) = position {
            match position.time_fix().and_then(|fix| utc_seconds(&fix).map(|secs| (fix, secs))) {
                Some((fix, secs)) => {
                    state.set_utc_time(secs);
                    tracing::info!("Time synced by GPS to {}", fix);
                    return SyncOutcome::Gps(secs);
                }
                None => tracing::info!("No valid GPS time"),
            }
        }

        let (tx, rx) = oneshot::channel();
        transport.request_network_time(Box::new(move |secs| {
            // Receiver may already be gone if a newer request replaced it.
            let _ = tx.send(secs);
        }));
        self.pending = Some(rx);
        tracing::info!("Network time request scheduled");

        SyncOutcome::NetworkRequested
    }
}

/// Convert decoded calendar fields to UTC seconds since the epoch
///
/// Returns `None` for fields that do not form a valid date and time, or that
/// fall outside the 32-bit seconds range.
pub fn utc_seconds(time: &DecodedTime) -> Option<u32> {
    let timestamp = NaiveDate::from_ymd_opt(
        i32::from(time.year),
        u32::from(time.month),
        u32::from(time.day),
    )?
    .and_hms_opt(
        u32::from(time.hour),
        u32::from(time.minute),
        u32::from(time.second),
    )?
    .and_utc()
    .timestamp();

    u32::try_from(timestamp).ok().filter(|&secs| secs > 0)
}
