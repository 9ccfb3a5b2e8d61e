//! Internal random number generator implementation based on PCG32.
//!
//! This module provides a minimal, high-quality PRNG so the engine carries no
//! `rand` dependency. Two draws in the whole engine consume randomness: the
//! position of the winnable flag inside an outcome batch, and the id of the
//! winning box in a winnable round. Both reduce to [`Rng::gen_index`], a
//! uniform draw over `[0, bound)`.
//!
//! # PCG32 Algorithm
//!
//! PCG (Permuted Congruential Generator) is a family of simple fast
//! space-efficient statistically good algorithms for random number
//! generation. PCG32 specifically:
//! - Has 64 bits of state, producing 32-bit output
//! - Period of 2^64
//! - Passes TestU01 statistical tests
//!
//! Reference: <https://www.pcg-random.org/>
//!
//! # Usage
//!
//! ```rust
//! use mystic_grid::rng::{Pcg32, Rng, SeedableRng};
//!
//! // Seeded RNG for deterministic behavior
//! let mut rng = Pcg32::seed_from_u64(12345);
//! let slot = rng.gen_index(5);
//! assert!(slot < 5);
//! ```

use crate::{
    report_violation,
    telemetry::{ViolationKind, ViolationSeverity},
};

/// PCG32 random number generator.
///
/// A minimal implementation of the PCG-XSH-RR variant with 64-bit state.
/// Suitable for game development and testing, but NOT cryptographically
/// secure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pcg32 {
    state: u64,
    inc: u64,
}

/// Default increment for single-stream PCG32.
/// This is a standard value from the PCG paper.
const PCG_DEFAULT_INCREMENT: u64 = 1442695040888963407;

/// Multiplier constant for the LCG step.
/// This is the standard multiplier for 64-bit state PCG.
const PCG_MULTIPLIER: u64 = 6364136223846793005;

impl Pcg32 {
    /// Creates a new PCG32 generator with the given state and stream.
    ///
    /// The stream (increment) allows for multiple independent sequences.
    /// The increment must be odd; if even, it will be made odd by OR-ing
    /// with 1.
    #[must_use]
    pub const fn new(state: u64, stream: u64) -> Self {
        // The increment must be odd
        let inc = (stream << 1) | 1;
        // Initialize state to 0, then advance once, then add the initial state.
        // This is the standard PCG seeding procedure.
        let mut pcg = Self { state: 0, inc };
        pcg.state = pcg.state.wrapping_mul(PCG_MULTIPLIER).wrapping_add(pcg.inc);
        pcg.state = pcg.state.wrapping_add(state);
        pcg.state = pcg.state.wrapping_mul(PCG_MULTIPLIER).wrapping_add(pcg.inc);
        pcg
    }

    /// Generates the next 32-bit random value.
    #[inline]
    #[must_use]
    pub fn next_u32(&mut self) -> u32 {
        let old_state = self.state;
        // Advance internal state
        self.state = old_state
            .wrapping_mul(PCG_MULTIPLIER)
            .wrapping_add(self.inc);
        // Calculate output using XSH-RR (xor-shift, random rotate)
        let xorshifted = (((old_state >> 18) ^ old_state) >> 27) as u32;
        let rot = (old_state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

/// Trait for seeding random number generators.
///
/// Provides a simple interface for creating deterministic RNG instances.
pub trait SeedableRng: Sized {
    /// Creates a new RNG seeded from a 64-bit value.
    ///
    /// Different seeds produce different (statistically independent)
    /// sequences. Sessions built with [`SessionBuilder::with_seed`] use this
    /// path, which makes round layouts reproducible in tests.
    ///
    /// [`SessionBuilder::with_seed`]: crate::SessionBuilder::with_seed
    #[must_use]
    fn seed_from_u64(seed: u64) -> Self;

    /// Creates a new RNG with a random seed derived from system timing.
    ///
    /// This uses timing information and thread identity for entropy, which
    /// is sufficient for a luck game but NOT cryptographically secure.
    #[must_use]
    fn from_entropy() -> Self;
}

impl SeedableRng for Pcg32 {
    fn seed_from_u64(seed: u64) -> Self {
        Self::new(seed, PCG_DEFAULT_INCREMENT)
    }

    fn from_entropy() -> Self {
        Self::seed_from_u64(timing_entropy_seed())
    }
}

/// Trait for random number generation.
///
/// Only the operations the engine actually draws are provided.
pub trait Rng {
    /// Returns the next 32-bit random value.
    fn next_u32(&mut self) -> u32;

    /// Generates a uniform random `usize` in `[0, bound)`.
    ///
    /// Uses rejection sampling to avoid modulo bias, so every index is
    /// exactly equally likely. This property is what turns the outcome
    /// pool's "one flag per batch" into a uniform distribution over batch
    /// positions, and the winner pick into a uniform distribution over the
    /// grid.
    ///
    /// # Empty Bound Behavior
    /// If `bound == 0`, reports a violation via telemetry and returns 0.
    fn gen_index(&mut self, bound: usize) -> usize {
        if bound == 0 {
            report_violation!(
                ViolationSeverity::Error,
                ViolationKind::Configuration,
                "gen_index called with empty bound"
            );
            return 0;
        }

        if bound <= u32::MAX as usize {
            // Use 32-bit arithmetic for the common case (grids and pools
            // are tiny)
            let span = bound as u32;
            let threshold = span.wrapping_neg() % span;
            loop {
                let random_value = self.next_u32();
                if random_value >= threshold {
                    return (random_value % span) as usize;
                }
            }
        } else {
            // 64-bit fallback, assembled from two 32-bit draws
            let span = bound as u64;
            let threshold = span.wrapping_neg() % span;
            loop {
                let high = u64::from(self.next_u32());
                let low = u64::from(self.next_u32());
                let random_value = (high << 32) | low;
                if random_value >= threshold {
                    return (random_value % span) as usize;
                }
            }
        }
    }
}

impl Rng for Pcg32 {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        Self::next_u32(self)
    }
}

/// Gets a timing-based seed for RNG initialization.
///
/// Combines high-precision timing via `web_time::Instant` with thread
/// identity. Intentionally non-deterministic; for reproducible sessions use
/// [`Pcg32::seed_from_u64`] with a fixed seed instead. NOT cryptographically
/// secure, but a luck game does not need unpredictability against adversaries
/// holding a debugger.
fn timing_entropy_seed() -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    use web_time::Instant;

    let now = Instant::now();

    // Mix in thread ID so two sessions created back-to-back on different
    // threads diverge even with identical timing
    let thread_hash = {
        let mut hasher = DefaultHasher::new();
        std::thread::current().id().hash(&mut hasher);
        hasher.finish()
    };

    let timing_hash = {
        let mut hasher = DefaultHasher::new();
        now.elapsed().as_nanos().hash(&mut hasher);
        hasher.finish()
    };

    thread_hash
        .wrapping_mul(timing_hash)
        .wrapping_add(0x9e3779b97f4a7c15)
}


// =============================================================================
// Property-Based Tests
// =============================================================================
