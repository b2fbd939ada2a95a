//! Random key sequences for tree construction.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use tracing::debug;

use crate::domain::{DomainError, Key, TreeResult};

/// Produces unique keys in random order. A fixed seed makes runs repeatable.
#[derive(Debug)]
pub struct KeyGenerator {
    rng: StdRng,
}

impl KeyGenerator {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// `count` distinct keys from `[min, max]`, shuffled.
    pub fn unique(&mut self, count: usize, min: Key, max: Key) -> TreeResult<Vec<Key>> {
        let span = i64::from(max) - i64::from(min) + 1;
        if span <= 0 || (count as u64) > span as u64 {
            return Err(DomainError::InvalidKeyRange { min, max, count });
        }
        debug!(count, min, max, "generating unique keys");
        let keys = index::sample(&mut self.rng, span as usize, count)
            .into_iter()
            .map(|offset| (i64::from(min) + offset as i64) as Key)
            .collect();
        Ok(keys)
    }
}
