//! Wall-clock time as reported by time sources

use std::fmt;

/// Where an authoritative time came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeSource {
    /// Positioning receiver fix
    Gps,

    /// Network time answer delivered through the transport
    Network,
}

impl TimeSource {
    /// Get the source name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeSource::Gps => "GPS",
            TimeSource::Network => "network",
        }
    }
}

/// UTC calendar fields decoded by a positioning receiver
///
/// Fields are taken as reported; whether they form a real calendar date is
/// checked when the time is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedTime {
    /// Full year (e.g. 2024)
    pub year: u16,
    /// Month, 1-12
    pub month: u8,
    /// Day of month, 1-31
    pub day: u8,
    /// Hour, 0-23
    pub hour: u8,
    /// Minute, 0-59
    pub minute: u8,
    /// Second, 0-59
    pub second: u8,
}

impl fmt::Display for DecodedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}
