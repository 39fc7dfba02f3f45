//! Dilemma CLI - Command-line interface
//!
//! Commands:
//! - tournament: Rank strategies in a round-robin or Swiss tournament
//! - evolve: Breed genetic strategies against an opponent pool

mod evolve_cmd;
mod tournament_cmd;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use evolve_cmd::EvolveArgs;
use tournament_cmd::TournamentArgs;

#[derive(Parser)]
#[command(name = "dilemma")]
#[command(about = "Iterated Prisoner's Dilemma tournaments and strategy evolution")]
#[command(version)]
struct Cli {
    /// Log level when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a tournament between catalog strategies
    Tournament(TournamentArgs),
    /// Evolve genetic strategies against an opponent pool
    Evolve(EvolveArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Commands::Tournament(args) => tournament_cmd::run(args),
        Commands::Evolve(args) => evolve_cmd::run(args),
    }
}

/// Logs go to stderr so `--json` output stays clean
fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
