//! Logical transport channels

use std::fmt;

/// Logical channel (port) on which the transport delivers a payload
///
/// The transport owns the wire format; the scheduler only picks the port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LogicalChannel(pub u8);

impl LogicalChannel {
    /// Reserved port for accumulated counter payloads
    pub const COUNTERS: LogicalChannel = LogicalChannel(1);

    /// Raw port number
    pub fn port(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for LogicalChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "port {}", self.0)
    }
}
