//! Runtime mode - externally controlled operating flag

/// Operating mode of the device
///
/// Written by an external trigger (switch, update request); the housekeeping
/// scheduler only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeMode {
    /// Normal counting operation
    #[default]
    Normal,

    /// Restart the device at the next housekeeping cycle
    ForcedRestart,
}

impl RuntimeMode {
    /// Encode for storage in an atomic
    pub fn as_u8(&self) -> u8 {
        match self {
            RuntimeMode::Normal => 0,
            RuntimeMode::ForcedRestart => 1,
        }
    }

    /// Decode from an atomic; unknown values are treated as normal operation
    pub fn from_u8(raw: u8) -> Self {
        match raw {
            1 => RuntimeMode::ForcedRestart,
            _ => RuntimeMode::Normal,
        }
    }
}
