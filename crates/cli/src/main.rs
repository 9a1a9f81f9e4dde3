//! Headless runner for the gem collector demo.
//!
//! Drives a [`GameProcess`] with a seeded random agent and prints a summary.
//! Logs go to stderr; set `RUST_LOG=gridrule=debug` to trace every action.
//!
//! ```bash
//! cargo run -p gridrule-cli -- --ticks 200 --seed 7 --json
//! ```

mod demo;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use gridrule_core::{PcgRng, TerminationState};
use gridrule_runtime::{GameProcess, RuntimeConfig, Scenario};

/// Runs the gem collector demo with a random agent
#[derive(Parser)]
#[command(name = "gridrule")]
#[command(about = "Headless grid rule engine demo", long_about = None)]
#[command(version)]
struct Cli {
    /// Maximum number of ticks to simulate
    #[arg(short, long, default_value_t = 100)]
    ticks: u64,

    /// Seed for the engine and the random agent
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Glyph map to load instead of the built-in level
    #[arg(short, long, value_name = "FILE")]
    level: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Summary {
    ticks: u64,
    seed: u64,
    score: i32,
    won: bool,
    gems_left: usize,
    objects: usize,
    digest: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let summary = run(&cli)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("ticks:     {}", summary.ticks);
        println!("seed:      {}", summary.seed);
        println!("score:     {}", summary.score);
        println!("won:       {}", summary.won);
        println!("gems left: {}", summary.gems_left);
        println!("objects:   {}", summary.objects);
        println!("digest:    {}", summary.digest);
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<Summary> {
    let generator = demo::generator()?;
    let level = match &cli.level {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read level file: {}", path.display()))?,
        None => demo::LEVEL.to_owned(),
    };
    let scenario = Scenario::parse(&level, &generator)?;

    let config = RuntimeConfig::with_seed(cli.seed).max_steps(cli.ticks);
    let mut process = GameProcess::new(generator, scenario, config);
    let player = process.add_player("random")?;
    process.init()?;
    info!(ticks = cli.ticks, seed = cli.seed, "starting demo");

    let mut won = false;
    let mut agent = PcgRng::seeded(cli.seed.rotate_left(32) ^ 0x9e37_79b9_7f4a_7c15);
    loop {
        let actions = if process.avatar(player).is_some() {
            let action_id = agent.range_inclusive(1, 4) as u32;
            vec![process.avatar_action(player, "move", action_id)?]
        } else {
            Vec::new()
        };

        let result = process.step(player, &actions)?;
        let reward = result.reward_for(player);
        if reward != 0 {
            debug!(tick = result.tick.0, reward, "agent rewarded");
        }
        if result.done {
            won = result.state_for(player) == Some(TerminationState::Win);
            break;
        }
    }

    let score = process.player(player).map_or(0, |p| p.score());
    info!(score, "demo finished");

    let grid = process.grid();
    Ok(Summary {
        ticks: grid.tick().0,
        seed: cli.seed,
        score,
        won,
        gems_left: grid.objects().filter(|object| object.name() == "gem").count(),
        objects: grid.object_count(),
        digest: hex::encode(grid.state_digest()),
    })
}
