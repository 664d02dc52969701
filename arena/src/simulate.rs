//! Many independent battles in parallel.
//!
//! Each battle gets its own fighters, arbiter and `GameRng` seeded with
//! `base_seed + index`, so a batch is reproducible from its base seed.

use crate::config::ArenaConfig;
use anyhow::Context;
use arena_core::{BattleArbiter, BattleError, Catalog, EndReason, GameRng};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Which side of the battle a fighter was set up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seat {
    First,
    Second,
}

/// What one battle contributes to a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BattleOutcome {
    pub winner: Option<Seat>,
    pub turns: u32,
    pub reason: EndReason,
}

/// Wins for one seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatRecord {
    pub name: String,
    pub wins: usize,
}

/// Aggregate results of a batch of battles.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub base_seed: u64,
    pub battles: usize,
    pub first: SeatRecord,
    pub second: SeatRecord,
    pub cancelled: usize,
    pub average_turns: f64,
}

impl fmt::Display for SimulationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} battles (base seed {})", self.battles, self.base_seed)?;
        writeln!(f, "    {} (first): {} wins", self.first.name, self.first.wins)?;
        writeln!(f, "    {} (second): {} wins", self.second.name, self.second.wins)?;
        if self.cancelled > 0 {
            writeln!(f, "    cancelled: {}", self.cancelled)?;
        }
        writeln!(f, "    average turns: {:.1}", self.average_turns)
    }
}

/// Play one seeded battle to the end.
pub fn run_seeded(
    config: &ArenaConfig,
    catalog: &Catalog,
    seed: u64,
    cancel: Arc<AtomicBool>,
) -> Result<BattleOutcome, BattleError> {
    let mut rng = GameRng::new(seed);
    let (mut first, mut second) = config.build_fighters(catalog, &mut rng);
    let mut arbiter = BattleArbiter::new().with_cancel_flag(cancel);
    let report = arbiter.start_battle(&mut first, &mut second, &mut rng)?;

    let winner = match report.reason {
        EndReason::Defeat if second.is_defeated() => Some(Seat::First),
        EndReason::Defeat if first.is_defeated() => Some(Seat::Second),
        _ => None,
    };
    Ok(BattleOutcome {
        winner,
        turns: report.turns,
        reason: report.reason,
    })
}

/// Run `battles` battles on blocking tasks and aggregate their outcomes.
pub async fn simulate(
    config: &ArenaConfig,
    catalog: &Catalog,
    battles: usize,
    cancel: Arc<AtomicBool>,
) -> anyhow::Result<SimulationSummary> {
    let base_seed = config.seed.unwrap_or_else(|| GameRng::from_entropy().seed());
    tracing::info!(battles, base_seed, "starting simulation");

    let handles = (0..battles).map(|i| {
        let config = config.clone();
        let catalog = catalog.clone();
        let cancel = cancel.clone();
        let seed = base_seed.wrapping_add(i as u64);
        tokio::task::spawn_blocking(move || run_seeded(&config, &catalog, seed, cancel))
    });
    let results = futures::future::join_all(handles).await;

    let mut summary = SimulationSummary {
        base_seed,
        battles,
        first: SeatRecord {
            name: config.first.clone(),
            wins: 0,
        },
        second: SeatRecord {
            name: config.second.clone(),
            wins: 0,
        },
        cancelled: 0,
        average_turns: 0.0,
    };
    let mut total_turns = 0u64;
    for result in results {
        let outcome = result.context("battle task failed")??;
        total_turns += u64::from(outcome.turns);
        match outcome.winner {
            Some(Seat::First) => summary.first.wins += 1,
            Some(Seat::Second) => summary.second.wins += 1,
            None => summary.cancelled += 1,
        }
    }
    if battles > 0 {
        summary.average_turns = total_turns as f64 / battles as f64;
    }

    tracing::info!(battles, average_turns = summary.average_turns, "simulation finished");
    Ok(summary)
}
