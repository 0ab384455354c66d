//! Random salt source

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tallykeeper_domain::traits::SaltSource;
use tallykeeper_domain::PrivacySalt;

/// Salt source backed by an OS-seeded CSPRNG
#[derive(Debug)]
pub struct RandomSalts {
    rng: StdRng,
}

impl RandomSalts {
    /// Seed from operating system entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic source for reproducible runs
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomSalts {
    fn default() -> Self {
        Self::new()
    }
}

impl SaltSource for RandomSalts {
    fn next_salt(&mut self) -> PrivacySalt {
        PrivacySalt(self.rng.gen())
    }
}
