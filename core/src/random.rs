//! Injectable randomness used for dice, placement, and initiative.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of uniform integer draws.
///
/// Every random decision in the engine goes through this trait so that a
/// session replays exactly when the same source is supplied again.
pub trait RandomSource {
    /// Draws an integer uniformly from the closed interval `[low, high]`.
    ///
    /// Implementations return `low` when `high <= low`.
    fn uniform_int(&mut self, low: u32, high: u32) -> u32;
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn uniform_int(&mut self, low: u32, high: u32) -> u32 {
        (**self).uniform_int(low, high)
    }
}

/// Seedable random source backed by ChaCha8.
#[derive(Clone, Debug)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    /// Creates a source whose sequence is fully determined by `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn uniform_int(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        self.rng.gen_range(low..=high)
    }
}

/// Random source that replays a fixed list of draws.
///
/// Each draw is clamped into the requested interval. Degenerate intervals do
/// not consume a draw. Once the script is exhausted every draw returns the
/// interval's lower bound.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRandom {
    draws: VecDeque<u32>,
}

impl ScriptedRandom {
    /// Creates a source that yields the provided draws in order.
    #[must_use]
    pub fn new(draws: impl IntoIterator<Item = u32>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
        }
    }

    /// Number of scripted draws not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn uniform_int(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        self.draws
            .pop_front()
            .map_or(low, |draw| draw.clamp(low, high))
    }
}

/// Rolls a `die`-sided die and adds `plus` after the roll.
///
/// The result always lies in `[1 + plus, die + plus]`. A zero-sided die is
/// treated as a one-sided die.
pub fn roll_die<R: RandomSource + ?Sized>(rng: &mut R, die: u32, plus: i32) -> i32 {
    let face = rng.uniform_int(1, die.max(1));
    i32::try_from(face).unwrap_or(i32::MAX).saturating_add(plus)
}

/// Shuffles the slice in place with a Fisher–Yates pass driven by `rng`.
///
/// Draws go through [`RandomSource`] rather than `SliceRandom::shuffle` so
/// that scripted sources can fix the initiative order in tests.
pub fn shuffle<T, R: RandomSource + ?Sized>(items: &mut [T], rng: &mut R) {
    for index in (1..items.len()).rev() {
        let bound = u32::try_from(index).unwrap_or(u32::MAX);
        let swap_index = usize::try_from(rng.uniform_int(0, bound)).unwrap_or(index);
        items.swap(index, swap_index.min(index));
    }
}
