#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Grid Skirmish sessions and experiments.

mod report;
mod scenario;

use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use scenario::{load_scenario, ScenarioArgs};
use skirmish_core::{ScenarioConfig, SeededRandom, Strategy};
use skirmish_rendering::{FrameSink, Glyphs, TextFrame, TextSink};
use skirmish_system_experiment::{run_batch, sweep, BatchPlan, SweepAxes};
use skirmish_system_scheduler::{Session, DEFAULT_ROUND_CAP};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Turn-based grid combat simulator.
#[derive(Parser, Debug)]
#[command(name = "skirmish", version, about, long_about = None)]
struct Cli {
    /// TOML scenario file; command-line flags override its fields.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed of the (first) session.
    #[arg(long, global = true, default_value_t = 0)]
    seed: u64,

    #[command(flatten)]
    scenario: ScenarioArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a single session and print its outcome.
    Run(RunArgs),
    /// Run many sessions and print aggregate statistics.
    Batch(BatchArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Print the grid after every round.
    #[arg(long)]
    render: bool,

    /// Stop after this many rounds.
    #[arg(long, default_value_t = DEFAULT_ROUND_CAP)]
    max_rounds: u32,

    /// Print the outcome as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Number of sessions per scenario.
    #[arg(long, default_value_t = 100)]
    sessions: u32,

    /// Round cap of each session.
    #[arg(long, default_value_t = DEFAULT_ROUND_CAP)]
    max_rounds: u32,

    /// Sweep every enemy strategy and every enemy count up to the scenario's.
    #[arg(long)]
    sweep: bool,

    /// Print the results as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_scenario(cli.config.as_deref(), &cli.scenario)?;
    info!(seed = cli.seed, ?config, "scenario loaded");

    match cli.command {
        Command::Run(args) => run(&config, cli.seed, &args),
        Command::Batch(args) => batch(&config, cli.seed, &args),
    }
}

fn run(config: &ScenarioConfig, seed: u64, args: &RunArgs) -> Result<()> {
    let mut session =
        Session::new(config, SeededRandom::new(seed)).context("failed to set up session")?;
    let stdout = io::stdout();

    if args.render {
        let glyphs = Glyphs::default();
        let mut sink = TextSink::new(stdout.lock());
        sink.present(0, &TextFrame::from_snapshot(&session.grid_snapshot(), &glyphs))?;
        while !session.is_finished() && session.round() < args.max_rounds {
            let report = session.run_round();
            let frame = TextFrame::from_snapshot(&session.grid_snapshot(), &glyphs);
            sink.present(report.round, &frame)?;
        }
    }

    let outcome = session.run_to_completion(args.max_rounds);
    let mut out = stdout.lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &outcome).context("failed to encode outcome")?;
        writeln!(out)?;
    } else {
        report::write_outcome(&mut out, &outcome)?;
    }
    Ok(())
}

fn batch(config: &ScenarioConfig, seed: u64, args: &BatchArgs) -> Result<()> {
    let plan = BatchPlan {
        sessions: args.sessions,
        seed,
        max_rounds: args.max_rounds,
    };
    let mut out = io::stdout().lock();

    if args.sweep {
        let axes = SweepAxes {
            enemy_counts: (1..=config.enemies).collect(),
            strategies: Strategy::ALL.to_vec(),
            enemy_max_health: vec![config.enemy_max_health],
        };
        let points = sweep(config, &axes, plan).context("sweep failed")?;
        if args.json {
            serde_json::to_writer_pretty(&mut out, &points).context("failed to encode sweep")?;
            writeln!(out)?;
        } else {
            report::write_sweep(&mut out, &points)?;
        }
        return Ok(());
    }

    let summary = run_batch(config, plan).context("batch failed")?;
    if args.json {
        serde_json::to_writer_pretty(&mut out, &summary).context("failed to encode summary")?;
        writeln!(out)?;
    } else {
        report::write_summary(&mut out, &summary)?;
    }
    Ok(())
}
