//! Attacks: named, fixed compositions of one die kind.
//!
//! An [`Attack`] never changes after creation. Every cast rolls a fresh working
//! [`DicePool`], so the extra die of an advantage roll exists only for that cast.

use crate::dice::{Advantage, DiceError, DieType};
use crate::pool::{DicePool, PoolRoll};
use crate::rng::RollSource;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for attacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttackId(pub Uuid);

impl AttackId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AttackId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AttackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named bundle of dice, e.g. Fireball = 8d6.
#[derive(Debug, Clone, Serialize)]
pub struct Attack {
    id: AttackId,
    name: String,
    die_type: DieType,
    count: u32,
}

impl Attack {
    pub fn new(name: impl Into<String>, die_type: DieType, count: u32) -> Result<Self, DiceError> {
        if count == 0 {
            return Err(DiceError::NoDice);
        }
        Ok(Self::from_parts(name, die_type, count))
    }

    pub(crate) fn from_parts(name: impl Into<String>, die_type: DieType, count: u32) -> Self {
        Self {
            id: AttackId::new(),
            name: name.into(),
            die_type,
            count,
        }
    }

    /// Create an attack from `NdS` notation (`8d6`, `d20`).
    pub fn from_notation(name: impl Into<String>, notation: &str) -> Result<Self, DiceError> {
        let (count, die_type) = parse_notation(notation)?;
        Self::new(name, die_type, count)
    }

    pub fn id(&self) -> AttackId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn die_type(&self) -> DieType {
        self.die_type
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn notation(&self) -> String {
        format!("{}{}", self.count, self.die_type)
    }

    /// A fresh, unrolled pool with this attack's composition.
    pub fn working_pool(&self) -> DicePool {
        DicePool::filled(self.die_type, self.count)
    }

    pub fn roll_damage<R: RollSource + ?Sized>(&self, rng: &mut R) -> PoolRoll {
        self.roll_damage_as(Advantage::Normal, rng)
    }

    pub fn roll_damage_with_advantage<R: RollSource + ?Sized>(&self, rng: &mut R) -> PoolRoll {
        self.roll_damage_as(Advantage::Advantage, rng)
    }

    pub fn roll_damage_with_disadvantage<R: RollSource + ?Sized>(&self, rng: &mut R) -> PoolRoll {
        self.roll_damage_as(Advantage::Disadvantage, rng)
    }

    pub fn roll_damage_as<R: RollSource + ?Sized>(
        &self,
        advantage: Advantage,
        rng: &mut R,
    ) -> PoolRoll {
        self.working_pool().roll_with(advantage, rng)
    }
}

impl PartialEq for Attack {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Attack {}

impl fmt::Display for Attack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.notation())
    }
}

/// Parse single-kind dice notation into `(count, die type)`.
pub fn parse_notation(notation: &str) -> Result<(u32, DieType), DiceError> {
    let s = notation.trim().to_lowercase();
    if s.is_empty() {
        return Err(DiceError::NoDice);
    }

    let d_pos = s
        .find('d')
        .ok_or_else(|| DiceError::InvalidNotation(notation.to_string()))?;
    let count_str = &s[..d_pos];
    let sides_str = &s[d_pos + 1..];

    let count: u32 = if count_str.is_empty() {
        1
    } else {
        count_str
            .parse()
            .map_err(|_| DiceError::InvalidNotation(notation.to_string()))?
    };
    if count == 0 {
        return Err(DiceError::NoDice);
    }

    let sides: u32 = sides_str
        .parse()
        .map_err(|_| DiceError::InvalidNotation(notation.to_string()))?;
    let die_type = DieType::from_sides(sides).ok_or(DiceError::InvalidDieSize(sides))?;

    Ok((count, die_type))
}
