//! Fighters and their awareness state machine.
//!
//! Awareness moves between [`Awareness::Focused`], [`Awareness::Present`] and
//! [`Awareness::Distracted`] by weighted draws. Each fighter carries its own
//! fixed [`AwarenessWeights`]; every draw is independent of the previous state.

use crate::attack::Attack;
use crate::dice::{Advantage, Die, DieType};
use crate::pool::{DicePool, PoolRoll};
use crate::rng::RollSource;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Error type for fighter actions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FighterError {
    #[error("{fighter} has not learned {attack}")]
    UnknownAttack { fighter: String, attack: String },
    #[error("{fighter} has no attacks to use")]
    NoAttacksAvailable { fighter: String },
    #[error(
        "awareness weights must be non-negative and sum to 1.0 \
         (focused {focused}, present {present}, distracted {distracted})"
    )]
    InvalidWeights {
        focused: f64,
        present: f64,
        distracted: f64,
    },
    #[error("{fighter} drew no awareness from its weights")]
    AwarenessDraw { fighter: String },
}

/// Unique identifier for fighters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FighterId(pub Uuid);

impl FighterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FighterId {
    fn default() -> Self {
        Self::new()
    }
}

/// A fighter's combat disposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Awareness {
    Focused,
    #[default]
    Present,
    Distracted,
}

impl Awareness {
    /// All states, in the order weights are given.
    pub fn all() -> [Awareness; 3] {
        [Awareness::Focused, Awareness::Present, Awareness::Distracted]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Awareness::Focused => "focused",
            Awareness::Present => "present",
            Awareness::Distracted => "distracted",
        }
    }

    /// How this state modifies damage rolls.
    pub fn advantage(&self) -> Advantage {
        match self {
            Awareness::Focused => Advantage::Advantage,
            Awareness::Present => Advantage::Normal,
            Awareness::Distracted => Advantage::Disadvantage,
        }
    }
}

impl fmt::Display for Awareness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name().to_uppercase())
    }
}

/// Fixed transition weights `[focused, present, distracted]`.
///
/// Always non-negative and summing to 1.0; deserialization goes through
/// [`AwarenessWeights::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWeights")]
pub struct AwarenessWeights {
    focused: f64,
    present: f64,
    distracted: f64,
}

#[derive(Deserialize)]
struct RawWeights {
    focused: f64,
    present: f64,
    distracted: f64,
}

impl TryFrom<RawWeights> for AwarenessWeights {
    type Error = FighterError;

    fn try_from(raw: RawWeights) -> Result<Self, Self::Error> {
        Self::new(raw.focused, raw.present, raw.distracted)
    }
}

impl AwarenessWeights {
    const TOLERANCE: f64 = 1e-9;

    pub fn new(focused: f64, present: f64, distracted: f64) -> Result<Self, FighterError> {
        let valid = [focused, present, distracted]
            .iter()
            .all(|w| w.is_finite() && *w >= 0.0)
            && ((focused + present + distracted) - 1.0).abs() <= Self::TOLERANCE;
        if !valid {
            return Err(FighterError::InvalidWeights {
                focused,
                present,
                distracted,
            });
        }
        Ok(Self {
            focused,
            present,
            distracted,
        })
    }

    /// Focused and distracted chances drawn from {0.1, 0.2, 0.3}; present
    /// takes the remainder.
    pub fn random<R: RollSource + ?Sized>(rng: &mut R) -> Self {
        let distracted = rng.roll_die(3) as f64 / 10.0;
        let focused = rng.roll_die(3) as f64 / 10.0;
        Self {
            focused,
            present: 1.0 - (focused + distracted),
            distracted,
        }
    }

    pub fn focused(&self) -> f64 {
        self.focused
    }

    pub fn present(&self) -> f64 {
        self.present
    }

    pub fn distracted(&self) -> f64 {
        self.distracted
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.focused, self.present, self.distracted]
    }

    pub fn weight(&self, awareness: Awareness) -> f64 {
        match awareness {
            Awareness::Focused => self.focused,
            Awareness::Present => self.present,
            Awareness::Distracted => self.distracted,
        }
    }
}

impl Default for AwarenessWeights {
    fn default() -> Self {
        Self {
            focused: 0.2,
            present: 0.6,
            distracted: 0.2,
        }
    }
}

/// A notable awareness transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwarenessChange {
    pub fighter: String,
    pub from: Awareness,
    pub to: Awareness,
}

/// The six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Ability::Strength => "STR",
            Ability::Dexterity => "DEX",
            Ability::Constitution => "CON",
            Ability::Intelligence => "INT",
            Ability::Wisdom => "WIS",
            Ability::Charisma => "CHA",
        }
    }

    pub fn all() -> [Ability; 6] {
        [
            Ability::Strength,
            Ability::Dexterity,
            Ability::Constitution,
            Ability::Intelligence,
            Ability::Wisdom,
            Ability::Charisma,
        ]
    }
}

/// Ability score modifier: `floor((score - 10) / 2)`.
pub fn score_to_modifier(score: u8) -> i8 {
    (score as i16 - 10).div_euclid(2) as i8
}

/// Ability scores container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    pub strength: u8,
    pub dexterity: u8,
    pub constitution: u8,
    pub intelligence: u8,
    pub wisdom: u8,
    pub charisma: u8,
}

impl AbilityScores {
    pub fn new(str: u8, dex: u8, con: u8, int: u8, wis: u8, cha: u8) -> Self {
        Self {
            strength: str,
            dexterity: dex,
            constitution: con,
            intelligence: int,
            wisdom: wis,
            charisma: cha,
        }
    }

    /// Roll each score as 4d6, dropping the lowest die.
    pub fn roll<R: RollSource + ?Sized>(rng: &mut R) -> Self {
        // 4d6 drop lowest is 3d6 rolled with advantage
        let mut score = || {
            DicePool::filled(DieType::D6, 3)
                .roll_with(Advantage::Advantage, rng)
                .total as u8
        };
        Self::new(score(), score(), score(), score(), score(), score())
    }

    pub fn get(&self, ability: Ability) -> u8 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    pub fn modifier(&self, ability: Ability) -> i8 {
        score_to_modifier(self.get(ability))
    }
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self::new(10, 10, 10, 10, 10, 10)
    }
}

/// Name, awareness and hit points at a point in the battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FighterStatus {
    pub name: String,
    pub awareness: Awareness,
    pub hit_points: i32,
}

impl fmt::Display for FighterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {} HP", self.name, self.awareness, self.hit_points)
    }
}

/// A combat participant.
#[derive(Debug, Clone)]
pub struct Fighter {
    pub id: FighterId,
    pub name: String,
    /// May go negative before the arbiter checks for defeat.
    pub hit_points: i32,
    pub max_hit_points: i32,
    pub ability_scores: AbilityScores,
    attacks: Vec<Arc<Attack>>,
    awareness: Awareness,
    weights: AwarenessWeights,
    d20: Die,
}

impl Fighter {
    /// Create a fighter with random awareness weights and rolled ability scores.
    pub fn new<R: RollSource + ?Sized>(
        name: impl Into<String>,
        hit_points: i32,
        rng: &mut R,
    ) -> Self {
        let weights = AwarenessWeights::random(rng);
        let ability_scores = AbilityScores::roll(rng);
        Self::with_weights(name, hit_points, weights).with_ability_scores(ability_scores)
    }

    /// Create a fighter with explicit weights and average ability scores.
    pub fn with_weights(
        name: impl Into<String>,
        hit_points: i32,
        weights: AwarenessWeights,
    ) -> Self {
        Self {
            id: FighterId::new(),
            name: name.into(),
            hit_points,
            max_hit_points: hit_points,
            ability_scores: AbilityScores::default(),
            attacks: Vec::new(),
            awareness: Awareness::Present,
            weights,
            d20: Die::new(DieType::D20),
        }
    }

    pub fn with_ability_scores(mut self, scores: AbilityScores) -> Self {
        self.ability_scores = scores;
        self
    }

    pub fn awareness(&self) -> Awareness {
        self.awareness
    }

    pub fn weights(&self) -> AwarenessWeights {
        self.weights
    }

    pub fn set_awareness(&mut self, awareness: Awareness) {
        self.awareness = awareness;
    }

    /// Draw a new awareness from the fighter's weights.
    ///
    /// Returns the change when the drawn state differs from the current one.
    pub fn update_awareness<R: RollSource + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<Option<AwarenessChange>, FighterError> {
        let states = Awareness::all();
        let drawn = rng
            .weighted_index(&self.weights.as_array())
            .and_then(|i| states.get(i).copied())
            .ok_or_else(|| FighterError::AwarenessDraw {
                fighter: self.name.clone(),
            })?;

        if drawn == self.awareness {
            return Ok(None);
        }

        let change = AwarenessChange {
            fighter: self.name.clone(),
            from: self.awareness,
            to: drawn,
        };
        self.set_awareness(drawn);
        tracing::debug!(
            fighter = %self.name,
            from = %change.from,
            to = %change.to,
            "awareness changed"
        );
        Ok(Some(change))
    }

    /// Learn an attack. Returns false if it was already known.
    pub fn learn_attack(&mut self, attack: Arc<Attack>) -> bool {
        if self.knows(&attack) {
            return false;
        }
        self.attacks.push(attack);
        true
    }

    pub fn knows(&self, attack: &Attack) -> bool {
        self.attacks.iter().any(|a| a.id() == attack.id())
    }

    pub fn attacks(&self) -> &[Arc<Attack>] {
        &self.attacks
    }

    /// Pick one learned attack uniformly at random.
    pub fn choose_attack<R: RollSource + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<Arc<Attack>, FighterError> {
        rng.choose_index(self.attacks.len())
            .and_then(|i| self.attacks.get(i).cloned())
            .ok_or_else(|| FighterError::NoAttacksAvailable {
                fighter: self.name.clone(),
            })
    }

    pub fn attack<R: RollSource + ?Sized>(
        &self,
        attack: &Attack,
        rng: &mut R,
    ) -> Result<PoolRoll, FighterError> {
        self.cast(attack, Advantage::Normal, rng)
    }

    pub fn attack_with_advantage<R: RollSource + ?Sized>(
        &self,
        attack: &Attack,
        rng: &mut R,
    ) -> Result<PoolRoll, FighterError> {
        self.cast(attack, Advantage::Advantage, rng)
    }

    pub fn attack_with_disadvantage<R: RollSource + ?Sized>(
        &self,
        attack: &Attack,
        rng: &mut R,
    ) -> Result<PoolRoll, FighterError> {
        self.cast(attack, Advantage::Disadvantage, rng)
    }

    /// Roll damage with the modifier implied by current awareness.
    pub fn strike<R: RollSource + ?Sized>(
        &self,
        attack: &Attack,
        rng: &mut R,
    ) -> Result<PoolRoll, FighterError> {
        match self.awareness {
            Awareness::Focused => self.attack_with_advantage(attack, rng),
            Awareness::Distracted => self.attack_with_disadvantage(attack, rng),
            Awareness::Present => self.attack(attack, rng),
        }
    }

    fn cast<R: RollSource + ?Sized>(
        &self,
        attack: &Attack,
        advantage: Advantage,
        rng: &mut R,
    ) -> Result<PoolRoll, FighterError> {
        if !self.knows(attack) {
            return Err(FighterError::UnknownAttack {
                fighter: self.name.clone(),
                attack: attack.name().to_string(),
            });
        }
        Ok(attack.roll_damage_as(advantage, rng))
    }

    /// Roll the fighter's d20 (initiative and opposed rolls).
    pub fn roll_d20<R: RollSource + ?Sized>(&mut self, rng: &mut R) -> u32 {
        self.d20.roll(rng)
    }

    /// Subtract damage and return the remaining hit points.
    pub fn take_damage(&mut self, amount: u32) -> i32 {
        self.hit_points = self.hit_points.saturating_sub(amount.min(i32::MAX as u32) as i32);
        self.hit_points
    }

    pub fn is_defeated(&self) -> bool {
        self.hit_points <= 0
    }

    pub fn status(&self) -> FighterStatus {
        FighterStatus {
            name: self.name.clone(),
            awareness: self.awareness,
            hit_points: self.hit_points,
        }
    }
}

impl fmt::Display for Fighter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Fighter: {}", self.name)?;
        writeln!(f, "    {} hp", self.hit_points)?;
        writeln!(f, "    awareness: {}", self.awareness)?;
        let scores: Vec<String> = Ability::all()
            .iter()
            .map(|a| format!("{} {}", a.abbreviation(), self.ability_scores.get(*a)))
            .collect();
        writeln!(f, "    {}", scores.join(", "))?;
        writeln!(f, "    Attacks:")?;
        for attack in &self.attacks {
            writeln!(f, "        {attack}")?;
        }
        Ok(())
    }
}
