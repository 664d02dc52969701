//! Battle arbitration.
//!
//! The [`BattleArbiter`] runs one two-fighter battle at a time:
//! 1. Both fighters roll initiative; the higher d20 attacks first
//! 2. Each turn the attacker updates awareness and picks a learned attack
//! 3. Opposed d20 rolls decide the hit; damage follows awareness
//! 4. The battle ends when the defender drops to 0 HP or below
//!
//! Every step is reported as a [`BattleEvent`] so callers can render it.

use crate::fighter::{AwarenessChange, Fighter, FighterError, FighterStatus};
use crate::pool::PoolRoll;
use crate::rng::RollSource;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Error type for battle arbitration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BattleError {
    #[error("{fighter} cannot enter battle without any attacks")]
    NoAttacksAvailable { fighter: String },

    #[error("{fighter} cannot enter battle with {hit_points} HP")]
    AlreadyDefeated { fighter: String, hit_points: i32 },

    #[error("a battle is already in progress")]
    AlreadyInProgress,

    #[error("no battle is in progress")]
    NotInProgress,

    #[error("fighter error: {0}")]
    Fighter(#[from] FighterError),
}

/// Why a battle stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    Defeat,
    Cancelled,
}

/// Something that happened during a battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BattleEvent {
    /// Battle started with these fighters
    BattleStarted { fighters: Vec<FighterStatus> },

    /// Both fighters rolled the same initiative and roll again
    InitiativeTied { roll: u32 },

    /// Initiative decided who attacks first
    InitiativeRolled {
        attacker: String,
        attacker_roll: u32,
        defender: String,
        defender_roll: u32,
    },

    /// A new turn began
    TurnStarted {
        turn: u32,
        attacker: String,
        defender: String,
    },

    /// The attacker's awareness changed
    AwarenessChanged(AwarenessChange),

    /// The opposed roll went to the attacker
    AttackHit {
        attacker: String,
        defender: String,
        attack: String,
        attack_roll: u32,
        defense_roll: u32,
    },

    /// The opposed roll went to the defender (ties included)
    AttackMissed {
        attacker: String,
        defender: String,
        attack: String,
        attack_roll: u32,
        defense_roll: u32,
    },

    /// Damage was rolled and applied
    DamageDealt {
        attacker: String,
        defender: String,
        attack: String,
        roll: PoolRoll,
        remaining_hp: i32,
    },

    /// Hit points and awareness after a turn
    StatusUpdate { fighters: Vec<FighterStatus> },

    /// A fighter dropped to 0 HP or below
    FighterDefeated { defeated: String, victor: String },

    /// Battle is over
    BattleEnded { reason: EndReason, turns: u32 },
}

/// Outcome of a single turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub attack: String,
    pub attack_roll: u32,
    pub defense_roll: u32,
    /// Damage dealt, if the attack hit.
    pub damage: Option<u32>,
    pub defender_defeated: bool,
}

impl TurnOutcome {
    pub fn hit(&self) -> bool {
        self.damage.is_some()
    }
}

/// Result of initiative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Initiative {
    /// True when the first fighter passed in attacks first.
    pub first_attacks: bool,
    pub first_roll: u32,
    pub second_roll: u32,
    /// How many tied rounds were re-rolled.
    pub ties: u32,
}

/// Everything that happened in one battle.
#[derive(Debug, Clone)]
pub struct BattleReport {
    pub winner: Option<String>,
    pub loser: Option<String>,
    pub turns: u32,
    pub reason: EndReason,
    pub events: Vec<BattleEvent>,
}

/// Runs battles between two fighters.
///
/// An arbiter holds no fighters; they are borrowed for one battle and the
/// arbiter can be reused once it is idle again.
#[derive(Debug, Default)]
pub struct BattleArbiter {
    in_progress: bool,
    turn: u32,
    cancel: Option<Arc<AtomicBool>>,
}

impl BattleArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop the battle at the start of the next turn once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    /// Turns played in the current (or last) battle.
    pub fn turn(&self) -> u32 {
        self.turn
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Validate both fighters and mark the battle as in progress.
    pub fn begin_battle(&mut self, first: &Fighter, second: &Fighter) -> Result<(), BattleError> {
        if self.in_progress {
            return Err(BattleError::AlreadyInProgress);
        }
        for fighter in [first, second] {
            if fighter.attacks().is_empty() {
                return Err(BattleError::NoAttacksAvailable {
                    fighter: fighter.name.clone(),
                });
            }
            if fighter.is_defeated() {
                return Err(BattleError::AlreadyDefeated {
                    fighter: fighter.name.clone(),
                    hit_points: fighter.hit_points,
                });
            }
        }
        self.in_progress = true;
        self.turn = 0;
        tracing::info!(first = %first.name, second = %second.name, "battle started");
        Ok(())
    }

    pub fn end_battle(&mut self) {
        if self.in_progress {
            tracing::info!(turns = self.turn, "battle ended");
        }
        self.in_progress = false;
    }

    /// Both fighters roll a d20 until the results differ; the higher attacks first.
    pub fn roll_initiative<R, O>(
        &mut self,
        first: &mut Fighter,
        second: &mut Fighter,
        rng: &mut R,
        observer: &mut O,
    ) -> Initiative
    where
        R: RollSource + ?Sized,
        O: FnMut(&BattleEvent) + ?Sized,
    {
        let mut ties = 0;
        loop {
            let first_roll = first.roll_d20(rng);
            let second_roll = second.roll_d20(rng);
            if first_roll == second_roll {
                tracing::debug!(roll = first_roll, "initiative tied, rolling again");
                observer(&BattleEvent::InitiativeTied { roll: first_roll });
                ties += 1;
                continue;
            }

            let first_attacks = first_roll > second_roll;
            let (attacker, attacker_roll, defender, defender_roll) = if first_attacks {
                (&first.name, first_roll, &second.name, second_roll)
            } else {
                (&second.name, second_roll, &first.name, first_roll)
            };
            tracing::debug!(%attacker, attacker_roll, %defender, defender_roll, "initiative");
            observer(&BattleEvent::InitiativeRolled {
                attacker: attacker.clone(),
                attacker_roll,
                defender: defender.clone(),
                defender_roll,
            });

            return Initiative {
                first_attacks,
                first_roll,
                second_roll,
                ties,
            };
        }
    }

    /// Play one turn: awareness, attack selection, opposed roll, damage, defeat.
    pub fn play_turn<R, O>(
        &mut self,
        attacker: &mut Fighter,
        defender: &mut Fighter,
        rng: &mut R,
        observer: &mut O,
    ) -> Result<TurnOutcome, BattleError>
    where
        R: RollSource + ?Sized,
        O: FnMut(&BattleEvent) + ?Sized,
    {
        if !self.in_progress {
            return Err(BattleError::NotInProgress);
        }
        self.turn += 1;
        observer(&BattleEvent::TurnStarted {
            turn: self.turn,
            attacker: attacker.name.clone(),
            defender: defender.name.clone(),
        });

        if let Some(change) = attacker.update_awareness(rng)? {
            observer(&BattleEvent::AwarenessChanged(change));
        }

        let attack = attacker.choose_attack(rng)?;
        let attack_roll = attacker.roll_d20(rng);
        let defense_roll = defender.roll_d20(rng);

        let mut outcome = TurnOutcome {
            attack: attack.name().to_string(),
            attack_roll,
            defense_roll,
            damage: None,
            defender_defeated: false,
        };

        if attack_roll > defense_roll {
            observer(&BattleEvent::AttackHit {
                attacker: attacker.name.clone(),
                defender: defender.name.clone(),
                attack: outcome.attack.clone(),
                attack_roll,
                defense_roll,
            });

            let roll = attacker.strike(&attack, rng)?;
            let remaining_hp = defender.take_damage(roll.total);
            tracing::debug!(
                attacker = %attacker.name,
                defender = %defender.name,
                attack = %outcome.attack,
                damage = roll.total,
                remaining_hp,
                "hit"
            );
            outcome.damage = Some(roll.total);
            observer(&BattleEvent::DamageDealt {
                attacker: attacker.name.clone(),
                defender: defender.name.clone(),
                attack: outcome.attack.clone(),
                roll,
                remaining_hp,
            });
        } else {
            tracing::debug!(
                attacker = %attacker.name,
                attack_roll,
                defense_roll,
                "miss"
            );
            observer(&BattleEvent::AttackMissed {
                attacker: attacker.name.clone(),
                defender: defender.name.clone(),
                attack: outcome.attack.clone(),
                attack_roll,
                defense_roll,
            });
        }

        if defender.is_defeated() {
            outcome.defender_defeated = true;
            self.end_battle();
            observer(&BattleEvent::FighterDefeated {
                defeated: defender.name.clone(),
                victor: attacker.name.clone(),
            });
        }

        observer(&BattleEvent::StatusUpdate {
            fighters: vec![attacker.status(), defender.status()],
        });

        Ok(outcome)
    }

    /// Run a full battle and collect its events.
    pub fn start_battle<R>(
        &mut self,
        first: &mut Fighter,
        second: &mut Fighter,
        rng: &mut R,
    ) -> Result<BattleReport, BattleError>
    where
        R: RollSource + ?Sized,
    {
        self.start_battle_observed(first, second, rng, &mut |_: &BattleEvent| {})
    }

    /// Run a full battle, passing each event to `observer` as it happens.
    pub fn start_battle_observed<R, O>(
        &mut self,
        first: &mut Fighter,
        second: &mut Fighter,
        rng: &mut R,
        observer: &mut O,
    ) -> Result<BattleReport, BattleError>
    where
        R: RollSource + ?Sized,
        O: FnMut(&BattleEvent) + ?Sized,
    {
        self.begin_battle(first, second)?;

        let mut events = Vec::new();
        let mut record = |event: &BattleEvent| {
            observer(event);
            events.push(event.clone());
        };

        record(&BattleEvent::BattleStarted {
            fighters: vec![first.status(), second.status()],
        });

        let initiative = self.roll_initiative(first, second, rng, &mut record);
        let (mut attacker, mut defender) = if initiative.first_attacks {
            (first, second)
        } else {
            (second, first)
        };

        let mut reason = EndReason::Defeat;
        while self.in_progress {
            if self.is_cancelled() {
                tracing::info!(turn = self.turn, "battle cancelled");
                self.end_battle();
                reason = EndReason::Cancelled;
                break;
            }
            if let Err(e) = self.play_turn(attacker, defender, rng, &mut record) {
                self.end_battle();
                return Err(e);
            }
            if self.in_progress {
                std::mem::swap(&mut attacker, &mut defender);
            }
        }

        let turns = self.turn;
        record(&BattleEvent::BattleEnded { reason, turns });

        let (winner, loser) = if defender.is_defeated() {
            (Some(attacker.name.clone()), Some(defender.name.clone()))
        } else {
            (None, None)
        };

        Ok(BattleReport {
            winner,
            loser,
            turns,
            reason,
            events,
        })
    }
}
