//! Privacy salt for identifier hashing

use std::fmt;

/// Salt mixed into device identifiers before hashing
///
/// Rotated on every counter reset so that hashes taken before and after the
/// reset cannot be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PrivacySalt(pub u32);

impl PrivacySalt {
    /// Raw salt value
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for PrivacySalt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}
