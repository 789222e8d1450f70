//! Command-line host for the kinship engine: loads families, answers kinship
//! and pairing queries, and drives the life-event simulator.

mod commands;
mod state;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use simulation::seed::REFERENCE_FAMILY;
use simulation::SimulationConfig;

use commands::kinship::LineageKind;
use state::AppState;

#[derive(Parser, Debug)]
#[command(name = "kinship-host", version, about = "Family kinship engine and life-event simulator")]
struct Cli {
    /// Simulation config as JSON; missing fields fall back to defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Roster JSON to load instead of the reference family.
    #[arg(long, global = true)]
    roster: Option<PathBuf>,

    /// Family the commands operate on.
    #[arg(short, long, global = true, default_value = REFERENCE_FAMILY)]
    family: String,

    /// RNG seed; overrides the config file.
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Virtual start date (YYYY-MM-DD); overrides the config file.
    #[arg(long, global = true)]
    start_date: Option<NaiveDate>,

    #[arg(long, global = true, default_value_t = Level::INFO)]
    log_level: Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every non-trivial relation in the selected family.
    Demo,
    /// List loaded families with their populations.
    Families,
    /// Kinship between two people.
    Relation { a: String, b: String },
    /// Cousins, ancestors or living descendants of a person.
    Lineage {
        #[arg(value_enum)]
        kind: LineageKind,
        person: String,
    },
    /// Search names and civil ids across all families.
    Search { query: String },
    /// Full profile of one person.
    Person { key: String },
    /// Ages of the living and ages at death of the deceased.
    Ages,
    /// Check whether two people may form a union.
    Validate { a: String, b: String },
    /// Form a union when the pair is eligible.
    Union { a: String, b: String },
    /// Run ticks synchronously, printing change records as JSON lines.
    Simulate {
        #[arg(short, long, default_value_t = 10)]
        ticks: u32,
    },
    /// Tick on the wall clock for a while, printing one summary per tick.
    Run {
        #[arg(short, long, default_value_t = 30)]
        seconds: u64,
        /// Tick interval in milliseconds; overrides the config file.
        #[arg(long)]
        interval_ms: Option<u64>,
    },
}

fn load_config(cli: &Cli) -> Result<SimulationConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            SimulationConfig::from_json_str(&raw)?
        }
        None => SimulationConfig::default(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if cli.start_date.is_some() {
        config.start_date = cli.start_date;
    }
    if let Command::Run {
        interval_ms: Some(ms),
        ..
    } = &cli.command
    {
        config.tick_interval_ms = *ms;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable
    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config(&cli)?;
    info!(?config, "configuration loaded");
    let state = AppState::new(config, cli.roster.as_deref(), &cli.family)?;

    match cli.command {
        Command::Demo => commands::kinship::demo(&state),
        Command::Families => commands::families::list(&state),
        Command::Relation { a, b } => commands::kinship::relation(&state, &a, &b),
        Command::Lineage { kind, person } => commands::kinship::lineage(&state, kind, &person),
        Command::Search { query } => commands::people::search(&state, &query),
        Command::Person { key } => commands::people::person(&state, &key),
        Command::Ages => commands::people::ages(&state),
        Command::Validate { a, b } => commands::pairing::validate(&state, &a, &b),
        Command::Union { a, b } => commands::pairing::union(&state, &a, &b),
        Command::Simulate { ticks } => commands::calendar::simulate(&state, ticks),
        Command::Run { seconds, .. } => commands::calendar::run(&state, seconds),
    }
}
