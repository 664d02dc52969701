//! Attack catalogs.
//!
//! A catalog is a list of [`AttackDef`] records (`{"name": "Fireball", "dice": "8d6"}`)
//! turned into shared [`Attack`]s. [`Catalog::standard`] holds the built-in set.

use crate::attack::Attack;
use crate::dice::{DiceError, DieType};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Error type for loading catalogs.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid attack '{name}': {source}")]
    Dice { name: String, source: DiceError },

    #[error("duplicate attack name: {0}")]
    DuplicateName(String),

    #[error("catalog has no attacks")]
    Empty,
}

/// Serializable attack definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackDef {
    pub name: String,
    /// Single-kind dice notation, e.g. `4d12`.
    pub dice: String,
}

impl AttackDef {
    pub fn new(name: impl Into<String>, dice: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dice: dice.into(),
        }
    }

    pub fn build(&self) -> Result<Attack, CatalogError> {
        Attack::from_notation(self.name.clone(), &self.dice).map_err(|source| CatalogError::Dice {
            name: self.name.clone(),
            source,
        })
    }
}

impl From<&Attack> for AttackDef {
    fn from(attack: &Attack) -> Self {
        Self::new(attack.name(), attack.notation())
    }
}

const STANDARD_ATTACKS: [(&str, DieType, u32); 6] = [
    ("Fireball", DieType::D6, 8),
    ("Acid Splash", DieType::D6, 4),
    ("Eldritch Blast", DieType::D10, 1),
    ("Poison Spray", DieType::D12, 4),
    ("Thunderclap", DieType::D6, 4),
    ("Thorn Whip", DieType::D6, 4),
];

/// A named set of shared attacks.
#[derive(Debug, Clone)]
pub struct Catalog {
    attacks: Vec<Arc<Attack>>,
}

impl Catalog {
    /// The built-in attacks.
    pub fn standard() -> Self {
        Self {
            attacks: STANDARD_ATTACKS
                .iter()
                .map(|(name, die_type, count)| {
                    Arc::new(Attack::from_parts(*name, *die_type, *count))
                })
                .collect(),
        }
    }

    pub fn from_defs(defs: &[AttackDef]) -> Result<Self, CatalogError> {
        if defs.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut attacks: Vec<Arc<Attack>> = Vec::with_capacity(defs.len());
        for def in defs {
            if attacks.iter().any(|a| a.name().eq_ignore_ascii_case(&def.name)) {
                return Err(CatalogError::DuplicateName(def.name.clone()));
            }
            attacks.push(Arc::new(def.build()?));
        }
        Ok(Self { attacks })
    }

    /// Parse a JSON array of attack definitions.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let defs: Vec<AttackDef> = serde_json::from_str(json)?;
        Self::from_defs(&defs)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, CatalogError> {
        let defs: Vec<AttackDef> = self
            .attacks
            .iter()
            .map(|a| AttackDef::from(a.as_ref()))
            .collect();
        Ok(serde_json::to_string_pretty(&defs)?)
    }

    /// Look up an attack by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<Arc<Attack>> {
        self.attacks
            .iter()
            .find(|a| a.name().eq_ignore_ascii_case(name))
            .cloned()
    }

    pub fn attacks(&self) -> &[Arc<Attack>] {
        &self.attacks
    }

    pub fn len(&self) -> usize {
        self.attacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attacks.is_empty()
    }
}
