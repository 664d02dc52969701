//! Two-fighter dice battles on the command line.
//!
//! ```bash
//! cargo run -p arena -- --seed 42
//! cargo run -p arena -- --simulate 1000 --hp 60
//! cargo run -p arena -- --catalog attacks.json --json
//! ```
//!
//! Flags can also be set through the environment or a `.env` file
//! (`ARENA_SEED`, `ARENA_HP`, `ARENA_CATALOG`). Logs go to stderr and are
//! filtered with `RUST_LOG`.

mod config;
mod render;
mod simulate;

use anyhow::Context;
use arena_core::arena::BattleEvent;
use arena_core::{BattleArbiter, Catalog, GameRng};
use clap::Parser;
use config::ArenaConfig;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "arena", version, about = "Two-fighter dice battles")]
struct Args {
    /// Seed for the battle RNG (random when omitted)
    #[arg(long, env = "ARENA_SEED")]
    seed: Option<u64>,

    /// Starting hit points for both fighters
    #[arg(
        long,
        env = "ARENA_HP",
        default_value_t = 100,
        value_parser = clap::value_parser!(i32).range(1..)
    )]
    hp: i32,

    /// Name of the first fighter
    #[arg(long, default_value = "Chrulk")]
    first: String,

    /// Name of the second fighter
    #[arg(long, default_value = "Steve")]
    second: String,

    /// JSON attack catalog (defaults to the standard attacks)
    #[arg(long, env = "ARENA_CATALOG")]
    catalog: Option<PathBuf>,

    /// Print events as JSON lines
    #[arg(long)]
    json: bool,

    /// Run N battles in parallel and print win counts
    #[arg(long, value_name = "N")]
    simulate: Option<usize>,

    /// List the catalog's attacks and exit
    #[arg(long)]
    list_attacks: bool,
}

impl Args {
    fn config(&self) -> ArenaConfig {
        ArenaConfig::quick_start()
            .with_names(&self.first, &self.second)
            .with_hit_points(self.hp)
            .with_seed(self.seed)
            .with_catalog(self.catalog.clone())
            .with_json(self.json)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.config();
    let catalog = config.load_catalog()?;

    if args.list_attacks {
        for attack in catalog.attacks() {
            println!("{attack}");
        }
        return Ok(());
    }

    let cancel = Arc::new(AtomicBool::new(false));
    let flag = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, stopping after the current turn");
            flag.store(true, Ordering::Relaxed);
        }
    });

    match args.simulate {
        Some(battles) => {
            let summary = simulate::simulate(&config, &catalog, battles, cancel).await?;
            if config.json {
                println!("{}", serde_json::to_string(&summary)?);
            } else {
                print!("{summary}");
            }
        }
        None => run_battle(&config, &catalog, cancel)?,
    }

    Ok(())
}

/// Play one battle, streaming events to stdout.
fn run_battle(
    config: &ArenaConfig,
    catalog: &Catalog,
    cancel: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let mut rng = match config.seed {
        Some(seed) => GameRng::new(seed),
        None => GameRng::from_entropy(),
    };
    tracing::info!(seed = rng.seed(), "battle rng");

    let (mut first, mut second) = config.build_fighters(catalog, &mut rng);
    if !config.json {
        println!("Seed: {}", rng.seed());
        println!("Fighters in current battle:");
        println!("{first}");
        println!("{second}");
    }

    let json = config.json;
    let mut print_event = |event: &BattleEvent| {
        if json {
            match serde_json::to_string(event) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::warn!(error = %e, "failed to serialize event"),
            }
        } else if let Some(text) = render::render_event(event) {
            println!("{text}");
        }
    };

    let mut arbiter = BattleArbiter::new().with_cancel_flag(cancel);
    let report = arbiter
        .start_battle_observed(&mut first, &mut second, &mut rng, &mut print_event)
        .context("battle failed")?;

    if !json {
        match &report.winner {
            Some(winner) => println!("{winner} wins after {} turns", report.turns),
            None => println!("Battle stopped after {} turns", report.turns),
        }
    }
    Ok(())
}
