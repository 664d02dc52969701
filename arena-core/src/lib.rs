//! Dice resolution and combat arbitration for two-fighter battles.
//!
//! This crate provides:
//! - Polyhedral dice with checked arithmetic and roll history
//! - Advantage/disadvantage rolls over dice pools
//! - Fighters with a probabilistic awareness state machine
//! - A battle arbiter that reports every step as a structured event
//!
//! # Quick Start
//!
//! ```
//! use arena_core::{BattleArbiter, Catalog, Fighter, GameRng};
//!
//! let mut rng = GameRng::new(42);
//! let catalog = Catalog::standard();
//!
//! let mut chrulk = Fighter::new("Chrulk", 100, &mut rng);
//! let mut silvia = Fighter::new("Silvia", 100, &mut rng);
//! for attack in catalog.attacks() {
//!     chrulk.learn_attack(attack.clone());
//!     silvia.learn_attack(attack.clone());
//! }
//!
//! let mut arbiter = BattleArbiter::new();
//! let report = arbiter.start_battle(&mut chrulk, &mut silvia, &mut rng).unwrap();
//! assert!(report.winner.is_some());
//! ```

pub mod arena;
pub mod attack;
pub mod catalog;
pub mod dice;
pub mod fighter;
pub mod pool;
pub mod rng;
pub mod testing;

// Primary public API
pub use arena::{BattleArbiter, BattleError, BattleEvent, BattleReport, EndReason, TurnOutcome};
pub use attack::{Attack, AttackId};
pub use catalog::{AttackDef, Catalog, CatalogError};
pub use dice::{Advantage, DiceError, Die, DieType};
pub use fighter::{Awareness, AwarenessWeights, Fighter, FighterError, FighterStatus};
pub use pool::{DicePool, PoolRoll, RollSnapshot};
pub use rng::{GameRng, RollSource};
