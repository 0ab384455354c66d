//! Counter reset: clear detections and rotate the privacy salt

use crate::HealthState;
use tallykeeper_domain::traits::SaltSource;
use tallykeeper_domain::PrivacySalt;

/// How many times the salt source is asked for a value differing from the old salt
const SALT_ATTEMPTS: usize = 4;

/// Clear all detection counters and install a fresh salt
///
/// Identifiers hashed after the reset cannot be matched against those hashed
/// before it. Returns the new salt.
pub fn reset_counters(state: &HealthState, salts: &mut dyn SaltSource) -> PrivacySalt {
    // Held until the new salt is installed so no identifier hashed with the
    // old salt lands in the cleared set.
    let mut counters = state.counters();
    counters.clear();

    let previous = state.salt();
    let mut salt = salts.next_salt();
    for _ in 1..SALT_ATTEMPTS {
        if salt != previous {
            break;
        }
        salt = salts.next_salt();
    }

    if salt == previous {
        tracing::warn!("Salt source repeated salt {} {} times", salt, SALT_ATTEMPTS);
    }

    state.set_salt(salt);
    drop(counters);
    tracing::debug!("Counters cleared, new salt {}", salt);
    salt
}
