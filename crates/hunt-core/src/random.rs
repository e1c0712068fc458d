//! Injectable randomness. Every operation that draws takes a `&mut dyn RandomSource`
//! so replays and tests can pin exact outcomes.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub trait RandomSource {
    /// Uniform draw in `[0, 1)`.
    fn unit(&mut self) -> f64;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "index draw over an empty range");
        let scaled = (self.unit() * len as f64) as usize;
        scaled.min(len.saturating_sub(1))
    }
}

/// ChaCha8 stream seeded from the run configuration.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "index draw over an empty range");
        self.rng.gen_range(0..len)
    }
}

/// Replays a fixed queue of unit draws; once drained it keeps returning zero.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    draws: VecDeque<f64>,
}

impl ScriptedRandom {
    pub fn new(draws: impl IntoIterator<Item = f64>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
        }
    }

    pub fn push(&mut self, draw: f64) {
        self.draws.push_back(draw);
    }

    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn unit(&mut self) -> f64 {
        self.draws
            .pop_front()
            .map(|draw| draw.clamp(0.0, 0.999_999_999))
            .unwrap_or(0.0)
    }
}

/// Draw `count` distinct items uniformly without replacement (partial Fisher-Yates).
pub fn sample_without_replacement<T: Clone>(
    rng: &mut dyn RandomSource,
    pool: &[T],
    count: usize,
) -> Vec<T> {
    let mut scratch: Vec<T> = pool.to_vec();
    let take = count.min(scratch.len());
    for slot in 0..take {
        let pick = slot + rng.index(scratch.len() - slot);
        scratch.swap(slot, pick);
    }
    scratch.truncate(take);
    scratch
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_streams_repeat_for_the_same_seed() {
        let mut a = SeededRandom::new(7);
        let mut b = SeededRandom::new(7);
        let left: Vec<usize> = (0..16).map(|_| a.index(12)).collect();
        let right: Vec<usize> = (0..16).map(|_| b.index(12)).collect();
        assert_eq!(left, right);
        assert!(left.iter().all(|idx| *idx < 12));
    }

    #[test]
    fn scripted_index_scales_unit_draws() {
        let mut rng = ScriptedRandom::new([0.0, 0.5, 0.99, 1.0]);
        assert_eq!(rng.index(4), 0);
        assert_eq!(rng.index(4), 2);
        assert_eq!(rng.index(4), 3);
        assert_eq!(rng.index(4), 3);
        assert_eq!(rng.remaining(), 0);
        assert_eq!(rng.unit(), 0.0);
    }

    #[test]
    fn sampling_never_repeats_and_respects_pool_size() {
        let pool = vec!["a", "b", "c", "d", "e"];
        let mut rng = SeededRandom::new(99);
        for _ in 0..50 {
            let mut picked = sample_without_replacement(&mut rng, &pool, 2);
            assert_eq!(picked.len(), 2);
            picked.dedup();
            assert_eq!(picked.len(), 2);
        }

        let short = sample_without_replacement(&mut rng, &pool[..1], 2);
        assert_eq!(short, vec!["a"]);
    }
}
