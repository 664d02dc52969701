//! Polyhedral dice.
//!
//! A [`Die`] is a face kind plus the value it last rolled. Dice combine with
//! each other and with plain integers through checked arithmetic on their
//! rolled values; see [`Die::apply`].

use crate::rng::RollSource;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use thiserror::Error;

/// Error type for dice arithmetic, pools and notation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error("unsupported ({op}) operands: '{lhs}' and '{rhs}'")]
    UnsupportedOperand {
        op: ArithOp,
        lhs: String,
        rhs: String,
    },
    #[error("{dividend} cannot be divided by 0")]
    DivisionByZero { dividend: i64 },
    #[error("({op}) overflowed on {lhs} and {rhs}")]
    Overflow { op: ArithOp, lhs: i64, rhs: i64 },
    #[error("no dice to remove")]
    EmptyPool,
    #[error("not enough roll history to obtain a previous roll ({snapshots} snapshot(s))")]
    InsufficientHistory { snapshots: usize },
    #[error("no dice specified")]
    NoDice,
    #[error("cannot mix {expected} and {found} in one pool")]
    MixedDieTypes { expected: DieType, found: DieType },
    #[error("invalid dice notation: {0}")]
    InvalidNotation(String),
    #[error("invalid die size: {0}")]
    InvalidDieSize(u32),
}

/// Advantage state for a roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Advantage {
    #[default]
    Normal,
    Advantage,
    Disadvantage,
}

impl Advantage {
    /// Combine two advantage states (advantage + disadvantage = normal).
    pub fn combine(self, other: Advantage) -> Advantage {
        match (self, other) {
            (Advantage::Normal, x) | (x, Advantage::Normal) => x,
            (Advantage::Advantage, Advantage::Disadvantage)
            | (Advantage::Disadvantage, Advantage::Advantage) => Advantage::Normal,
            (Advantage::Advantage, Advantage::Advantage) => Advantage::Advantage,
            (Advantage::Disadvantage, Advantage::Disadvantage) => Advantage::Disadvantage,
        }
    }
}

/// Standard die kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DieType {
    D4,
    D6,
    D8,
    D10,
    D12,
    D20,
    D100,
}

impl DieType {
    pub fn sides(&self) -> u32 {
        match self {
            DieType::D4 => 4,
            DieType::D6 => 6,
            DieType::D8 => 8,
            DieType::D10 => 10,
            DieType::D12 => 12,
            DieType::D20 => 20,
            DieType::D100 => 100,
        }
    }

    pub fn from_sides(sides: u32) -> Option<DieType> {
        match sides {
            4 => Some(DieType::D4),
            6 => Some(DieType::D6),
            8 => Some(DieType::D8),
            10 => Some(DieType::D10),
            12 => Some(DieType::D12),
            20 => Some(DieType::D20),
            100 => Some(DieType::D100),
            _ => None,
        }
    }

    pub fn all() -> [DieType; 7] {
        [
            DieType::D4,
            DieType::D6,
            DieType::D8,
            DieType::D10,
            DieType::D12,
            DieType::D20,
            DieType::D100,
        ]
    }
}

impl fmt::Display for DieType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.sides())
    }
}

/// Arithmetic operation between dice and integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    /// Floor division.
    Div,
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
        };
        write!(f, "{symbol}")
    }
}

/// One side of a dice expression.
#[derive(Debug, Clone, Copy)]
pub enum Operand<'a> {
    Die(&'a Die),
    Int(i64),
}

impl Operand<'_> {
    fn value(&self) -> i64 {
        match self {
            Operand::Die(die) => die.rolled as i64,
            Operand::Int(n) => *n,
        }
    }

    fn describe(&self) -> String {
        match self {
            Operand::Die(die) => die.die_type.to_string(),
            Operand::Int(_) => "int".to_string(),
        }
    }
}

impl<'a> From<&'a Die> for Operand<'a> {
    fn from(die: &'a Die) -> Self {
        Operand::Die(die)
    }
}

impl From<i64> for Operand<'_> {
    fn from(n: i64) -> Self {
        Operand::Int(n)
    }
}

impl From<i32> for Operand<'_> {
    fn from(n: i32) -> Self {
        Operand::Int(n as i64)
    }
}

impl From<u32> for Operand<'_> {
    fn from(n: u32) -> Self {
        Operand::Int(n as i64)
    }
}

/// A single die: its kind and the value it last rolled (0 before any roll).
///
/// Dice compare and order by `rolled` only, so the lowest or highest die of a
/// pool can be found regardless of kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Die {
    pub die_type: DieType,
    rolled: u32,
}

impl Die {
    pub fn new(die_type: DieType) -> Self {
        Self {
            die_type,
            rolled: 0,
        }
    }

    /// The most recent roll, or 0 if the die was never rolled.
    pub fn rolled(&self) -> u32 {
        self.rolled
    }

    pub fn sides(&self) -> u32 {
        self.die_type.sides()
    }

    /// Roll the die and keep the result.
    pub fn roll<R: RollSource + ?Sized>(&mut self, rng: &mut R) -> u32 {
        self.rolled = rng.roll_die(self.die_type.sides());
        self.rolled
    }

    /// Evaluate `lhs op rhs` on rolled values.
    ///
    /// Two dice must share a kind. Division floors toward negative infinity.
    pub fn apply<'a>(
        op: ArithOp,
        lhs: impl Into<Operand<'a>>,
        rhs: impl Into<Operand<'a>>,
    ) -> Result<i64, DiceError> {
        let lhs = lhs.into();
        let rhs = rhs.into();

        if let (Operand::Die(a), Operand::Die(b)) = (lhs, rhs) {
            if a.die_type != b.die_type {
                return Err(DiceError::UnsupportedOperand {
                    op,
                    lhs: lhs.describe(),
                    rhs: rhs.describe(),
                });
            }
        }

        let (a, b) = (lhs.value(), rhs.value());
        let result = match op {
            ArithOp::Add => a.checked_add(b),
            ArithOp::Sub => a.checked_sub(b),
            ArithOp::Mul => a.checked_mul(b),
            ArithOp::Div => {
                if b == 0 {
                    return Err(DiceError::DivisionByZero { dividend: a });
                }
                floor_div(a, b)
            }
        };
        result.ok_or(DiceError::Overflow { op, lhs: a, rhs: b })
    }

    pub fn checked_add<'a>(&'a self, rhs: impl Into<Operand<'a>>) -> Result<i64, DiceError> {
        Self::apply(ArithOp::Add, self, rhs)
    }

    pub fn checked_sub<'a>(&'a self, rhs: impl Into<Operand<'a>>) -> Result<i64, DiceError> {
        Self::apply(ArithOp::Sub, self, rhs)
    }

    pub fn checked_mul<'a>(&'a self, rhs: impl Into<Operand<'a>>) -> Result<i64, DiceError> {
        Self::apply(ArithOp::Mul, self, rhs)
    }

    pub fn checked_div<'a>(&'a self, rhs: impl Into<Operand<'a>>) -> Result<i64, DiceError> {
        Self::apply(ArithOp::Div, self, rhs)
    }
}

/// `None` on overflow (`i64::MIN / -1`).
fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        q.checked_sub(1)
    } else {
        Some(q)
    }
}

impl PartialEq for Die {
    fn eq(&self, other: &Self) -> bool {
        self.rolled == other.rolled
    }
}

impl Eq for Die {}

impl PartialOrd for Die {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Die {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rolled.cmp(&other.rolled)
    }
}

impl fmt::Display for Die {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.die_type)
    }
}
