//! Synthetic leaderboard generation
//!
//! Used only when the very first ingestion fails, so the display layer has
//! plausible rows instead of an empty table. Amounts descend with position
//! plus random jitter; the synthetic ordering policy then renumbers ranks.
//! A seed makes the output reproducible (ChaCha8, as with other seeded
//! generation in this codebase).

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::assemble;
use crate::config::FallbackConfig;
use crate::models::{Dataset, Record, SourceMode};

/// Default number of generated rows
pub const DEFAULT_SIZE: usize = 25;

/// Base amount every generated row starts from
const BASE_AMOUNT: f64 = 500.0;

/// Amount added per position from the bottom
const STEP_AMOUNT: f64 = 12_000.0;

/// Upper bound (exclusive) of the random jitter
const JITTER_AMOUNT: f64 = 5_000.0;

/// Generator for synthetic datasets
#[derive(Debug, Clone)]
pub struct FallbackGenerator {
    size: usize,
    seed: Option<u64>,
}

impl Default for FallbackGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE)
    }
}

impl FallbackGenerator {
    /// Create an unseeded generator producing `size` rows
    pub fn new(size: usize) -> Self {
        Self { size, seed: None }
    }

    /// Fix the random seed
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Create from the fallback section of the configuration
    pub fn from_config(config: &FallbackConfig) -> Self {
        Self {
            size: config.size,
            seed: config.seed,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Generate raw records before any ordering policy
    pub fn generate_records(&self) -> Vec<Record> {
        let mut rng = match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        (0..self.size)
            .map(|i| {
                let rank = i as u32 + 1;
                let steps = (self.size - i) as f64;
                let jitter = rng.gen_range(0.0..JITTER_AMOUNT);
                let wagered = (BASE_AMOUNT + steps * STEP_AMOUNT + jitter).max(0.0);
                Record::new(rank, Record::placeholder_name(rank), wagered)
            })
            .collect()
    }

    /// Generate a synthetic dataset, ranked by descending wager
    pub fn generate(&self) -> Dataset {
        assemble(self.generate_records(), SourceMode::Synthetic)
    }
}
