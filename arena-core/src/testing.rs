//! Testing utilities for the arena engine.
//!
//! This module provides tools for deterministic battles:
//! - `ScriptedRolls` to pin die results, attack choices and awareness draws
//! - `trained_fighter` to build a fighter with fixed weights and known attacks

use crate::attack::Attack;
use crate::fighter::{Awareness, AwarenessWeights, Fighter};
use crate::rng::{GameRng, RollSource};
use std::collections::VecDeque;
use std::sync::Arc;

/// A random source that returns scripted values in order.
///
/// Each kind of draw has its own queue. When a queue runs dry the draw falls
/// back to a seeded [`GameRng`], so tests only script what they assert on.
#[derive(Debug, Clone)]
pub struct ScriptedRolls {
    rolls: VecDeque<u32>,
    choices: VecDeque<usize>,
    weighted: VecDeque<usize>,
    fallback: GameRng,
}

impl ScriptedRolls {
    pub fn new() -> Self {
        Self::with_fallback_seed(0)
    }

    pub fn with_fallback_seed(seed: u64) -> Self {
        Self {
            rolls: VecDeque::new(),
            choices: VecDeque::new(),
            weighted: VecDeque::new(),
            fallback: GameRng::new(seed),
        }
    }

    /// Queue die results, consumed in roll order.
    pub fn with_rolls(mut self, rolls: impl IntoIterator<Item = u32>) -> Self {
        self.push_rolls(rolls);
        self
    }

    /// Queue attack-selection indices.
    pub fn with_choices(mut self, choices: impl IntoIterator<Item = usize>) -> Self {
        self.choices.extend(choices);
        self
    }

    /// Queue awareness draws.
    pub fn with_awareness(mut self, states: impl IntoIterator<Item = Awareness>) -> Self {
        self.push_awareness(states);
        self
    }

    pub fn push_rolls(&mut self, rolls: impl IntoIterator<Item = u32>) {
        self.rolls.extend(rolls);
    }

    pub fn push_awareness(&mut self, states: impl IntoIterator<Item = Awareness>) {
        let all = Awareness::all();
        self.weighted.extend(
            states
                .into_iter()
                .filter_map(|s| all.iter().position(|a| *a == s)),
        );
    }

    /// Scripted die results not yet consumed.
    pub fn remaining_rolls(&self) -> usize {
        self.rolls.len()
    }
}

impl Default for ScriptedRolls {
    fn default() -> Self {
        Self::new()
    }
}

impl RollSource for ScriptedRolls {
    fn roll_die(&mut self, sides: u32) -> u32 {
        match self.rolls.pop_front() {
            Some(value) => {
                assert!(
                    (1..=sides).contains(&value),
                    "scripted roll {value} does not fit a d{sides}"
                );
                value
            }
            None => self.fallback.roll_die(sides),
        }
    }

    fn choose_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        match self.choices.pop_front() {
            Some(index) => {
                assert!(index < len, "scripted choice {index} out of {len}");
                Some(index)
            }
            None => self.fallback.choose_index(len),
        }
    }

    fn weighted_index(&mut self, weights: &[f64]) -> Option<usize> {
        match self.weighted.pop_front() {
            Some(index) if index < weights.len() => Some(index),
            _ => self.fallback.weighted_index(weights),
        }
    }
}

/// A fighter with default weights that already knows `attacks`.
pub fn trained_fighter(name: &str, hit_points: i32, attacks: &[Arc<Attack>]) -> Fighter {
    let mut fighter = Fighter::with_weights(name, hit_points, AwarenessWeights::default());
    for attack in attacks {
        fighter.learn_attack(attack.clone());
    }
    fighter
}
