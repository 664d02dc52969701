//! Random sources for dice, attack selection and awareness draws.
//!
//! Every draw in the engine goes through [`RollSource`], so a battle can be
//! replayed from a seed ([`GameRng`]) or pinned roll by roll in tests
//! (see [`crate::testing::ScriptedRolls`]).

use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// The only points of nondeterminism in a battle.
pub trait RollSource {
    /// Uniform value in `1..=sides`.
    fn roll_die(&mut self, sides: u32) -> u32;

    /// Uniform index in `0..len`, or `None` when `len` is zero.
    fn choose_index(&mut self, len: usize) -> Option<usize>;

    /// Index drawn with probability proportional to `weights[i]`.
    ///
    /// Returns `None` when the weights are empty, negative, or all zero.
    fn weighted_index(&mut self, weights: &[f64]) -> Option<usize>;
}

/// Seedable game RNG.
///
/// Wraps `ChaCha8Rng` so the same seed always replays the same battle.
#[derive(Debug, Clone)]
pub struct GameRng {
    rng: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create a new RNG with a random seed.
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// The seed this RNG was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RollSource for GameRng {
    fn roll_die(&mut self, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        self.rng.gen_range(1..=sides)
    }

    fn choose_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.rng.gen_range(0..len))
    }

    fn weighted_index(&mut self, weights: &[f64]) -> Option<usize> {
        let dist = WeightedIndex::new(weights).ok()?;
        Some(dist.sample(&mut self.rng))
    }
}
