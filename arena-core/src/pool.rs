//! Dice pools and the advantage/disadvantage roll algorithm.
//!
//! A [`DicePool`] holds dice of one kind plus an append-only history of
//! [`RollSnapshot`]s. Snapshot 0 is the unrolled state; every [`DicePool::roll`]
//! appends one. Removing dice only touches the live pool, never the history.

use crate::dice::{Advantage, DiceError, Die, DieType};
use crate::rng::RollSource;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Immutable record of a pool's dice at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollSnapshot {
    pub die_type: DieType,
    pub values: Vec<u32>,
}

impl RollSnapshot {
    fn capture(die_type: DieType, dice: &[Die]) -> Self {
        Self {
            die_type,
            values: dice.iter().map(Die::rolled).collect(),
        }
    }

    pub fn total(&self) -> u32 {
        self.values.iter().sum()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for RollSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<String> = self.values.iter().map(|v| v.to_string()).collect();
        write!(
            f,
            "{}{}, [{}]",
            self.values.len(),
            self.die_type,
            values.join(", ")
        )
    }
}

/// Result of rolling a pool once, with or without advantage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolRoll {
    pub die_type: DieType,
    pub advantage: Advantage,
    /// Every value rolled, in pool order (including the extra die).
    pub rolls: Vec<u32>,
    /// The value discarded by advantage or disadvantage.
    pub dropped: Option<u32>,
    pub kept: Vec<u32>,
    pub total: u32,
}

impl PoolRoll {
    /// Format the dice for display, dropped die in parentheses.
    pub fn dice_display(&self) -> String {
        let mut dropped = self.dropped;
        let shown: Vec<String> = self
            .rolls
            .iter()
            .map(|&roll| {
                if dropped == Some(roll) {
                    dropped = None;
                    format!("({roll})")
                } else {
                    roll.to_string()
                }
            })
            .collect();
        format!("[{}]", shown.join(", "))
    }
}

impl fmt::Display for PoolRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.dice_display(), self.total)
    }
}

/// An ordered collection of same-kind dice with a roll history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DicePool {
    die_type: DieType,
    dice: Vec<Die>,
    history: Vec<RollSnapshot>,
}

impl DicePool {
    /// Create `count` unrolled dice of one kind.
    pub fn new(die_type: DieType, count: u32) -> Result<Self, DiceError> {
        if count == 0 {
            return Err(DiceError::NoDice);
        }
        Ok(Self::filled(die_type, count))
    }

    /// Build a pool from existing dice, which must all share a kind.
    pub fn from_dice(dice: Vec<Die>) -> Result<Self, DiceError> {
        let die_type = dice.first().ok_or(DiceError::NoDice)?.die_type;
        if let Some(other) = dice.iter().find(|d| d.die_type != die_type) {
            return Err(DiceError::MixedDieTypes {
                expected: die_type,
                found: other.die_type,
            });
        }
        let history = vec![RollSnapshot::capture(die_type, &dice)];
        Ok(Self {
            die_type,
            dice,
            history,
        })
    }

    pub(crate) fn filled(die_type: DieType, count: u32) -> Self {
        let dice: Vec<Die> = (0..count).map(|_| Die::new(die_type)).collect();
        let history = vec![RollSnapshot::capture(die_type, &dice)];
        Self {
            die_type,
            dice,
            history,
        }
    }

    pub fn die_type(&self) -> DieType {
        self.die_type
    }

    pub fn len(&self) -> usize {
        self.dice.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dice.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Die> {
        self.dice.iter()
    }

    pub fn history(&self) -> &[RollSnapshot] {
        &self.history
    }

    /// Roll every die, record a snapshot, and return the new values.
    pub fn roll<R: RollSource + ?Sized>(&mut self, rng: &mut R) -> Vec<u32> {
        let values: Vec<u32> = self.dice.iter_mut().map(|d| d.roll(rng)).collect();
        self.history.push(RollSnapshot::capture(self.die_type, &self.dice));
        values
    }

    /// Append `count` unrolled dice. Does not roll and does not snapshot.
    pub fn add_dice(&mut self, count: u32) {
        self.dice.extend((0..count).map(|_| Die::new(self.die_type)));
    }

    /// Remove the die with the lowest rolled value (first one on ties).
    pub fn remove_lowest(&mut self) -> Result<Die, DiceError> {
        self.take_extreme(Ordering::Less).ok_or(DiceError::EmptyPool)
    }

    /// Remove the die with the highest rolled value (first one on ties).
    pub fn remove_highest(&mut self) -> Result<Die, DiceError> {
        self.take_extreme(Ordering::Greater).ok_or(DiceError::EmptyPool)
    }

    /// Remove the first die that beats every other die in direction `wanted`.
    fn take_extreme(&mut self, wanted: Ordering) -> Option<Die> {
        let mut best: Option<usize> = None;
        for (i, die) in self.dice.iter().enumerate() {
            match best {
                Some(b) if die.cmp(&self.dice[b]) != wanted => {}
                _ => best = Some(i),
            }
        }
        best.map(|i| self.dice.remove(i))
    }

    /// The latest snapshot.
    pub fn current_roll(&self) -> &RollSnapshot {
        // history always holds the construction snapshot
        &self.history[self.history.len() - 1]
    }

    pub fn previous_roll(&self) -> Result<&RollSnapshot, DiceError> {
        let n = self.history.len();
        if n < 2 {
            return Err(DiceError::InsufficientHistory { snapshots: n });
        }
        Ok(&self.history[n - 2])
    }

    pub fn current_total(&self) -> u32 {
        self.current_roll().total()
    }

    pub fn previous_total(&self) -> Result<u32, DiceError> {
        self.previous_roll().map(RollSnapshot::total)
    }

    /// Sum of the live dice, which differs from `current_total` after a removal.
    pub fn live_total(&self) -> u32 {
        self.dice.iter().map(Die::rolled).sum()
    }

    /// Roll the pool with the given advantage.
    ///
    /// Advantage adds one die, rolls everything, and drops the lowest;
    /// disadvantage drops the highest. The pool keeps its extra die removed,
    /// so its size is unchanged afterwards.
    pub fn roll_with<R: RollSource + ?Sized>(
        &mut self,
        advantage: Advantage,
        rng: &mut R,
    ) -> PoolRoll {
        let dropped = match advantage {
            Advantage::Normal => {
                self.roll(rng);
                None
            }
            Advantage::Advantage => {
                self.add_dice(1);
                self.roll(rng);
                self.take_extreme(Ordering::Less)
            }
            Advantage::Disadvantage => {
                self.add_dice(1);
                self.roll(rng);
                self.take_extreme(Ordering::Greater)
            }
        };

        PoolRoll {
            die_type: self.die_type,
            advantage,
            rolls: self.current_roll().values.clone(),
            dropped: dropped.map(|d| d.rolled()),
            kept: self.dice.iter().map(Die::rolled).collect(),
            total: self.live_total(),
        }
    }

    /// One line per snapshot, oldest first.
    pub fn history_display(&self) -> String {
        self.history
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for DicePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.current_roll())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::GameRng;
    use crate::testing::ScriptedRolls;

    #[test]
    fn test_new_requires_dice() {
        assert_eq!(DicePool::new(DieType::D6, 0).unwrap_err(), DiceError::NoDice);
        let pool = DicePool::new(DieType::D6, 3).unwrap();
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.history().len(), 1);
        assert_eq!(pool.current_total(), 0);
        assert_eq!(pool.to_string(), "3d6, [0, 0, 0]");
    }

    #[test]
    fn test_from_dice_rejects_mixed_kinds() {
        assert_eq!(DicePool::from_dice(vec![]).unwrap_err(), DiceError::NoDice);
        let err = DicePool::from_dice(vec![Die::new(DieType::D6), Die::new(DieType::D8)])
            .unwrap_err();
        assert_eq!(
            err,
            DiceError::MixedDieTypes {
                expected: DieType::D6,
                found: DieType::D8
            }
        );
    }

    #[test]
    fn test_roll_appends_snapshot() {
        let mut rng = ScriptedRolls::new().with_rolls([3, 4, 2, 5, 6, 6, 1, 1]);
        let mut pool = DicePool::new(DieType::D6, 4).unwrap();

        assert_eq!(pool.roll(&mut rng), vec![3, 4, 2, 5]);
        assert_eq!(pool.history().len(), 2);
        assert_eq!(pool.current_total(), 14);
        assert_eq!(pool.previous_total(), Ok(0));

        pool.roll(&mut rng);
        assert_eq!(pool.history().len(), 3);
        assert_eq!(pool.current_total(), 14);
        assert_eq!(pool.previous_total(), Ok(14));
        assert_eq!(pool.previous_roll().unwrap().values, vec![3, 4, 2, 5]);
    }

    #[test]
    fn test_previous_total_needs_two_snapshots() {
        let pool = DicePool::new(DieType::D4, 1).unwrap();
        assert_eq!(
            pool.previous_total(),
            Err(DiceError::InsufficientHistory { snapshots: 1 })
        );
    }

    #[test]
    fn test_add_dice_does_not_snapshot() {
        let mut pool = DicePool::new(DieType::D8, 2).unwrap();
        pool.add_dice(3);
        assert_eq!(pool.len(), 5);
        assert_eq!(pool.history().len(), 1);
        assert!(pool.iter().all(|d| d.rolled() == 0));
    }

    #[test]
    fn test_remove_until_empty() {
        let mut rng = ScriptedRolls::new().with_rolls([5, 2]);
        let mut pool = DicePool::new(DieType::D6, 2).unwrap();
        pool.roll(&mut rng);

        assert_eq!(pool.remove_lowest().unwrap().rolled(), 2);
        assert_eq!(pool.remove_highest().unwrap().rolled(), 5);
        assert!(pool.is_empty());
        assert_eq!(pool.remove_lowest().unwrap_err(), DiceError::EmptyPool);
        // History is untouched by removals
        assert_eq!(pool.current_roll().values, vec![5, 2]);
    }

    #[test]
    fn test_remove_takes_first_on_ties() {
        let mut rng = ScriptedRolls::new().with_rolls([4, 1, 6, 1, 6]);
        let mut pool = DicePool::new(DieType::D6, 5).unwrap();
        pool.roll(&mut rng);

        pool.remove_lowest().unwrap();
        let left: Vec<u32> = pool.iter().map(Die::rolled).collect();
        assert_eq!(left, vec![4, 6, 1, 6]);

        pool.remove_highest().unwrap();
        let left: Vec<u32> = pool.iter().map(Die::rolled).collect();
        assert_eq!(left, vec![4, 1, 6]);
    }

    #[test]
    fn test_roll_with_advantage_drops_lowest() {
        let mut rng = ScriptedRolls::new().with_rolls([2, 6, 1]);
        let mut pool = DicePool::new(DieType::D6, 2).unwrap();
        let roll = pool.roll_with(Advantage::Advantage, &mut rng);

        assert_eq!(roll.rolls, vec![2, 6, 1]);
        assert_eq!(roll.dropped, Some(1));
        assert_eq!(roll.kept, vec![2, 6]);
        assert_eq!(roll.total, 8);
        assert_eq!(pool.len(), 2);
        assert_eq!(roll.to_string(), "[2, 6, (1)] = 8");
    }

    #[test]
    fn test_roll_with_disadvantage_drops_highest() {
        let mut rng = ScriptedRolls::new().with_rolls([2, 6, 6]);
        let mut pool = DicePool::new(DieType::D6, 2).unwrap();
        let roll = pool.roll_with(Advantage::Disadvantage, &mut rng);

        assert_eq!(roll.dropped, Some(6));
        assert_eq!(roll.kept, vec![2, 6]);
        assert_eq!(roll.total, 8);
        assert_eq!(roll.dice_display(), "[2, (6), 6]");
    }

    #[test]
    fn test_advantage_totals_match_definition() {
        let mut rng = GameRng::new(99);
        for _ in 0..500 {
            let mut pool = DicePool::new(DieType::D10, 3).unwrap();
            let adv = pool.roll_with(Advantage::Advantage, &mut rng);
            let sum: u32 = adv.rolls.iter().sum();
            assert_eq!(adv.rolls.len(), 4);
            assert_eq!(adv.total, sum - adv.rolls.iter().min().unwrap());

            let mut pool = DicePool::new(DieType::D10, 3).unwrap();
            let dis = pool.roll_with(Advantage::Disadvantage, &mut rng);
            let sum: u32 = dis.rolls.iter().sum();
            assert_eq!(dis.total, sum - dis.rolls.iter().max().unwrap());
        }
    }

    #[test]
    fn test_history_display() {
        let mut rng = ScriptedRolls::new().with_rolls([1, 2]);
        let mut pool = DicePool::new(DieType::D4, 2).unwrap();
        pool.roll(&mut rng);
        assert_eq!(pool.history_display(), "2d4, [0, 0]\n2d4, [1, 2]");
    }
}
