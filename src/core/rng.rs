//! Randomness seam for dice, opponent quiz answers and Chance tiles.
//!
//! ## Key Features
//!
//! - **Injectable**: the scheduler only sees `RandomSource`, so tests can
//!   script exact dice and coin sequences
//! - **Deterministic**: same seed produces identical matches
//! - **Serializable**: O(1) state capture and restore
//! - **Context streams**: independent sequences for different purposes
//!
//! ## Usage
//!
//! ```
//! use health_board::core::{GameRng, RandomSource, ScriptedRng};
//!
//! let mut rng = GameRng::new(42);
//! let face = rng.roll_die();
//! assert!((1..=6).contains(&face));
//!
//! // Scripted values are served first, then the seeded fallback takes over.
//! let mut scripted = ScriptedRng::new(7).with_dice([3, 5]);
//! assert_eq!(scripted.roll_die(), 3);
//! assert_eq!(scripted.roll_die(), 5);
//! ```

use std::collections::VecDeque;
use std::hash::{Hash, Hasher};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Number of faces on the die.
pub const DIE_FACES: u8 = 6;

/// Source of every random decision the engine makes.
pub trait RandomSource: Send {
    /// Roll one die, uniform over `1..=6`.
    fn roll_die(&mut self) -> u8;

    /// Return `true` with the given probability.
    fn chance(&mut self, probability: f64) -> bool;

    /// Pick an index uniformly in `0..len`. `len` must be non-zero.
    fn pick(&mut self, len: usize) -> usize;
}

/// Deterministic seeded RNG backed by ChaCha8.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create an independent stream for a specific context.
    ///
    /// The same context always produces the same stream from the same seed.
    #[must_use]
    pub fn for_context(&self, context: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;

        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        context.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// The seed this stream was created from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Get the current state for serialization.
    #[must_use]
    pub fn state(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Restore from a saved state.
    #[must_use]
    pub fn from_state(state: &GameRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
        }
    }
}

impl RandomSource for GameRng {
    fn roll_die(&mut self) -> u8 {
        self.inner.gen_range(1..=DIE_FACES)
    }

    fn chance(&mut self, probability: f64) -> bool {
        self.inner.gen_bool(probability.clamp(0.0, 1.0))
    }

    fn pick(&mut self, len: usize) -> usize {
        self.inner.gen_range(0..len.max(1))
    }
}

/// Serializable RNG state for checkpointing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRngState {
    /// Original seed
    pub seed: u64,
    /// ChaCha8 word position (128-bit counter)
    pub word_pos: u128,
}

/// Replays queued values, then falls back to a seeded `GameRng`.
///
/// Each kind of draw has its own queue, so a test can pin the dice without
/// caring how many coin flips happen in between.
#[derive(Clone, Debug)]
pub struct ScriptedRng {
    dice: VecDeque<u8>,
    coins: VecDeque<bool>,
    picks: VecDeque<usize>,
    fallback: GameRng,
}

impl ScriptedRng {
    /// Create an empty script with a seeded fallback.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            dice: VecDeque::new(),
            coins: VecDeque::new(),
            picks: VecDeque::new(),
            fallback: GameRng::new(seed),
        }
    }

    /// Queue die faces. Values outside `1..=6` are clamped.
    #[must_use]
    pub fn with_dice(mut self, faces: impl IntoIterator<Item = u8>) -> Self {
        self.dice
            .extend(faces.into_iter().map(|f| f.clamp(1, DIE_FACES)));
        self
    }

    /// Queue coin results for `chance`.
    #[must_use]
    pub fn with_coins(mut self, coins: impl IntoIterator<Item = bool>) -> Self {
        self.coins.extend(coins);
        self
    }

    /// Queue indices for `pick`.
    #[must_use]
    pub fn with_picks(mut self, picks: impl IntoIterator<Item = usize>) -> Self {
        self.picks.extend(picks);
        self
    }

    /// Number of scripted dice not yet consumed.
    #[must_use]
    pub fn dice_remaining(&self) -> usize {
        self.dice.len()
    }
}

impl RandomSource for ScriptedRng {
    fn roll_die(&mut self) -> u8 {
        self.dice
            .pop_front()
            .unwrap_or_else(|| self.fallback.roll_die())
    }

    fn chance(&mut self, probability: f64) -> bool {
        self.coins
            .pop_front()
            .unwrap_or_else(|| self.fallback.chance(probability))
    }

    fn pick(&mut self, len: usize) -> usize {
        match self.picks.pop_front() {
            Some(index) => index.min(len.saturating_sub(1)),
            None => self.fallback.pick(len),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = GameRng::new(42);
        let mut rng2 = GameRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.roll_die(), rng2.roll_die());
        }
    }

    #[test]
    fn test_different_seeds() {
        let mut rng1 = GameRng::new(1);
        let mut rng2 = GameRng::new(2);

        let seq1: Vec<_> = (0..20).map(|_| rng1.roll_die()).collect();
        let seq2: Vec<_> = (0..20).map(|_| rng2.roll_die()).collect();

        assert_ne!(seq1, seq2);
    }

    #[test]
    fn test_die_range() {
        let mut rng = GameRng::new(7);
        for _ in 0..1000 {
            let face = rng.roll_die();
            assert!((1..=6).contains(&face), "face {} out of range", face);
        }
    }

    #[test]
    fn test_die_distribution_is_uniform() {
        let mut rng = GameRng::new(2024);
        let trials = 60_000;
        let mut counts = [0u32; 6];

        for _ in 0..trials {
            counts[(rng.roll_die() - 1) as usize] += 1;
        }

        // Chi-square with 5 degrees of freedom; 20.5 is the p = 0.001 cutoff.
        let expected = trials as f64 / 6.0;
        let chi_square: f64 = counts
            .iter()
            .map(|&c| {
                let diff = c as f64 - expected;
                diff * diff / expected
            })
            .sum();
        assert!(chi_square < 20.5, "chi-square {} counts {:?}", chi_square, counts);
    }

    #[test]
    fn test_context_produces_different_sequence() {
        let rng = GameRng::new(42);
        let mut dice = rng.for_context("dice");
        let mut chance = rng.for_context("chance");

        let seq1: Vec<_> = (0..20).map(|_| dice.pick(1000)).collect();
        let seq2: Vec<_> = (0..20).map(|_| chance.pick(1000)).collect();

        assert_ne!(seq1, seq2);
    }

    #[test]
    fn test_chance_extremes() {
        let mut rng = GameRng::new(3);
        for _ in 0..50 {
            assert!(rng.chance(1.0));
            assert!(!rng.chance(0.0));
        }
        // Out-of-range probabilities are clamped rather than panicking.
        assert!(rng.chance(1.5));
        assert!(!rng.chance(-0.5));
    }

    #[test]
    fn test_state_serialization() {
        let mut rng = GameRng::new(42);
        for _ in 0..100 {
            rng.roll_die();
        }

        let state = rng.state();
        let expected: Vec<_> = (0..10).map(|_| rng.roll_die()).collect();

        let mut restored = GameRng::from_state(&state);
        let actual: Vec<_> = (0..10).map(|_| restored.roll_die()).collect();

        assert_eq!(expected, actual);
    }

    #[test]
    fn test_state_serde() {
        let state = GameRngState {
            seed: 42,
            word_pos: 12345,
        };

        let json = serde_json::to_string(&state).unwrap();
        let deserialized: GameRngState = serde_json::from_str(&json).unwrap();

        assert_eq!(state, deserialized);
    }

    #[test]
    fn test_scripted_queues_are_independent() {
        let mut rng = ScriptedRng::new(1)
            .with_dice([4, 9])
            .with_coins([false])
            .with_picks([2, 50]);

        assert_eq!(rng.roll_die(), 4);
        assert!(!rng.chance(0.99));
        assert_eq!(rng.pick(4), 2);
        assert_eq!(rng.roll_die(), 6, "out-of-range face is clamped");
        assert_eq!(rng.pick(4), 3, "out-of-range pick is clamped");
        assert_eq!(rng.dice_remaining(), 0);

        let fallback = rng.roll_die();
        assert!((1..=6).contains(&fallback));
    }
}
