#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a skirmish scenario and reports unit movement.

mod report;
mod scenario;
mod simulation;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::{scenario::Scenario, simulation::Simulation};

/// Runs a scenario file through turn-based movement resolution.
#[derive(Debug, Parser)]
#[command(name = "skirmish", version)]
struct Cli {
    /// Scenario TOML describing the board, terrain and units.
    #[arg(short, long, value_name = "PATH")]
    config: PathBuf,

    /// Seed for terrain generation and spawn placement; overrides the scenario.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of rounds to play; overrides the scenario.
    #[arg(short, long)]
    turns: Option<u32>,

    /// Output format of the final report.
    #[arg(short, long, value_enum, default_value = "text")]
    report: ReportFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    /// Board drawing followed by moves and unit states.
    Text,
    /// Machine readable JSON document.
    Json,
}

/// Entry point for the skirmish command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let scenario = Scenario::load(&cli.config)?;
    let seed = cli.seed.unwrap_or(scenario.seed);

    let mut simulation = Simulation::prepare(&scenario, seed)?;
    simulation.run(cli.turns.unwrap_or(scenario.rounds));
    let report = simulation.report();

    match cli.report {
        ReportFormat::Text => print!("{}", report.render_text()),
        ReportFormat::Json => println!("{}", report.to_json()?),
    }
    Ok(())
}
