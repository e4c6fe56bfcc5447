//! Seeded bounded-random helpers
//!
//! All gameplay randomness flows through one `GameRng` so a session is fully
//! reproducible from its seed.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Deterministic RNG for one game session
#[derive(Debug, Clone)]
pub struct GameRng {
    inner: Pcg32,
}

impl GameRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: Pcg32::seed_from_u64(seed),
        }
    }

    /// Random integer in `[lo, hi]` (inclusive on both ends)
    pub fn int_in(&mut self, lo: u32, hi: u32) -> u32 {
        if lo >= hi {
            return lo;
        }
        self.inner.random_range(lo..=hi)
    }

    /// Random float in `[lo, hi)`
    pub fn float_in(&mut self, lo: f32, hi: f32) -> f32 {
        if lo >= hi {
            return lo;
        }
        self.inner.random_range(lo..hi)
    }

    /// True with probability `p` (clamped to [0, 1])
    pub fn chance(&mut self, p: f32) -> bool {
        self.inner.random_bool(p.clamp(0.0, 1.0) as f64)
    }

    /// Fisher-Yates shuffle in place
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.inner);
    }
}
