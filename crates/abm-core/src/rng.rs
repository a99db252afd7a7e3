//! Deterministic random draws for choice simulation.
//!
//! # Determinism strategy
//!
//! Every random number consumed by a choice kernel is addressed by a
//! [`DrawKey`]: `(stream, round, index)`.  `stream` is usually the chooser
//! id (a tour id), `round` the scheduling round, and `index` the position of
//! the draw within that chooser's round (always 0 for single choices,
//! `0..n_samples` for sampling with replacement).
//!
//! The key is folded into the run's global seed with a SplitMix64 finalizer
//! and used to seed a fresh `SmallRng` whose first `f64` is the draw.  This
//! means:
//!
//! - Draws never depend on the order choosers are visited, or on how a
//!   population is chunked.
//! - Adding choosers does not disturb the draws of existing ones.
//! - Re-running a round reproduces it exactly; there is no hidden state.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// SplitMix64 output function.
#[inline]
fn mix(mut z: u64) -> u64 {
    z = z.wrapping_add(MIXING_CONSTANT);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

// ── DrawKey ───────────────────────────────────────────────────────────────────

/// Address of one uniform draw.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DrawKey {
    pub stream: u64,
    pub round:  u32,
    pub index:  u32,
}

impl DrawKey {
    #[inline]
    pub fn new(stream: u64, round: u32, index: u32) -> Self {
        Self { stream, round, index }
    }
}

// ── DrawStream ────────────────────────────────────────────────────────────────

/// Keyed source of uniform draws in `[0, 1)`.
///
/// Cheap to copy; holds only the seed.  Safe to share across threads.
#[derive(Copy, Clone, Debug)]
pub struct DrawStream {
    seed: u64,
}

impl DrawStream {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Derive a stream for a separate model step so its draws are
    /// independent of every other channel under the same run seed.
    pub fn channel(&self, channel: u32) -> DrawStream {
        DrawStream { seed: mix(self.seed ^ (channel as u64).wrapping_mul(MIXING_CONSTANT)) }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The draw addressed by `key`.
    pub fn uniform(&self, key: DrawKey) -> f64 {
        let folded = mix(mix(mix(self.seed ^ key.stream) ^ key.round as u64) ^ key.index as u64);
        SmallRng::seed_from_u64(folded).r#gen::<f64>()
    }

    /// `n` draws for `(stream, round)` with indices `0..n`.
    pub fn uniforms(&self, stream: u64, round: u32, n: usize) -> Vec<f64> {
        (0..n as u32)
            .map(|index| self.uniform(DrawKey::new(stream, round, index)))
            .collect()
    }
}
