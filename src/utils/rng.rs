//! Deterministic seeding and RNG utilities
//!
//! This module provides:
//! - SeedSequence: expands a root u64 seed into deterministic sub-seeds
//! - RngStream: a reproducible PRNG stream (ChaCha8)
//! - labelled streams so stacked factor wrappers seeded from the same episode
//!   seed draw from independent sequences

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Type alias for the default RNG stream used across the crate.
pub type RngStream = ChaCha8Rng;

/// Seed used when a caller does not provide one.
pub const DEFAULT_SEED: u64 = 1_234_567;

/// SplitMix64 mixer used to expand a 64-bit seed into a sequence of pseudo-random u64 values.
#[derive(Clone, Debug)]
pub struct SeedSequence {
    state: u128,
}

impl SeedSequence {
    /// Create a new seed sequence from a 64-bit seed.
    pub fn new(seed: u64) -> Self {
        let init = (seed as u128) ^ 0x9E3779B97F4A7C15u128;
        Self { state: init }
    }

    /// Create a sequence whose stream depends on both `seed` and `label`.
    pub fn labelled(seed: u64, label: &str) -> Self {
        Self::new(seed ^ fnv1a(label))
    }

    /// Generate the next sub-seed deterministically.
    pub fn next_subseed(&mut self) -> u64 {
        let mut z = (self.state as u64).wrapping_add(0x9E3779B97F4A7C15);
        self.state = (self.state ^ (z as u128)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }

    /// Create an RNG stream seeded from the next subseed.
    pub fn next_rng(&mut self) -> RngStream {
        let s = self.next_subseed();
        RngStream::seed_from_u64(s)
    }
}

/// Create a new RNG stream from a root seed.
pub fn rng_from_seed(seed: u64) -> RngStream {
    RngStream::seed_from_u64(seed)
}

/// RNG stream for a named consumer (e.g. a factor) under a root seed.
pub fn labelled_rng(seed: u64, label: &str) -> RngStream {
    SeedSequence::labelled(seed, label).next_rng()
}

// 64-bit FNV-1a, stable across platforms and releases unlike DefaultHasher.
fn fnv1a(label: &str) -> u64 {
    label.bytes().fold(0xcbf29ce484222325u64, |h, b| (h ^ b as u64).wrapping_mul(0x100000001b3))
}
