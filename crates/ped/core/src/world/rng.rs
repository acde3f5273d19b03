//! RNG oracle for deterministic random number generation.
//!
//! Combat planning uses randomness only for tie-breaks and variety; keeping
//! it behind a stateless, seed-driven oracle means a fight replays
//! identically from the same inputs.

/// RNG oracle for deterministic random number generation.
///
/// Implementations must be deterministic: the same seed always produces the
/// same value.
pub trait RngOracle: Send + Sync + std::fmt::Debug {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Roll a d100 (1-100 inclusive).
    fn roll_d100(&self, seed: u64) -> u32 {
        (self.next_u32(seed) % 100) + 1
    }

    /// Generate a random value in range [min, max] inclusive.
    fn range(&self, seed: u64, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        let range = max - min + 1;
        min + (self.next_u32(seed) % range)
    }
}

/// PCG random number generator (Permuted Congruential Generator).
///
/// PCG-XSH-RR: 32-bit output from 64-bit state. Small, fast, and of good
/// statistical quality, which is all combat tie-breaking needs.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    /// Advance the PCG state by one LCG step.
    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// XSH-RR output permutation.
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        let state = Self::pcg_step(seed);
        Self::pcg_output(state)
    }
}

/// Compute a deterministic seed from decision components.
///
/// Use a distinct `context` value when one decision needs several
/// independent rolls.
pub fn compute_seed(base_seed: u64, sequence: u64, actor_id: u32, context: u32) -> u64 {
    // SplitMix64 / FxHash-style mix constants
    let mut hash = base_seed;
    hash ^= sequence.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (actor_id as u64).wrapping_mul(0x517cc1b727220a95);
    hash ^= (context as u64).wrapping_mul(0x85ebca6b);
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_value() {
        let rng = PcgRng;
        assert_eq!(rng.next_u32(42), rng.next_u32(42));
        assert_ne!(rng.next_u32(42), rng.next_u32(43));
    }

    #[test]
    fn range_is_inclusive_and_clamped() {
        let rng = PcgRng;
        for seed in 0..64 {
            let v = rng.range(seed, 3, 6);
            assert!((3..=6).contains(&v));
        }
        assert_eq!(rng.range(9, 5, 5), 5);
        assert_eq!(rng.range(9, 7, 2), 7);
    }

    #[test]
    fn seeds_differ_per_context() {
        let a = compute_seed(1, 2, 3, 0);
        let b = compute_seed(1, 2, 3, 1);
        assert_ne!(a, b);
    }
}
