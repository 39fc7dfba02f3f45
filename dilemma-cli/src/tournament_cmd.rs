//! Tournament command - rank catalog strategies
//!
//! ## Architecture
//!
//! - run() - orchestration
//! - build_config(), resolve_strategies() - setup
//! - print_standings(), print_swiss_rounds() - reporting

use anyhow::{Context, Result};
use clap::Args;

use dilemma_core::strategies::{by_name, catalog};
use dilemma_core::{PayoffMatrix, Seed, SharedStrategy};
use dilemma_tournament::{simulate_tournament, TieBreaker, TournamentConfig, TournamentFormat, TournamentOutcome};

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

#[derive(Args)]
pub struct TournamentArgs {
    /// Comma-separated catalog ids (default: the whole catalog)
    #[arg(long, value_name = "LIST")]
    pub strategies: Option<String>,

    /// round-robin, double-round-robin, swiss or swiss:<rounds>
    #[arg(long, default_value = "round-robin")]
    pub format: TournamentFormat,

    /// Swiss tie-breaker: buchholz, sonneborn-berger or total-score
    #[arg(long)]
    pub tie_breaker: Option<TieBreaker>,

    /// Rounds per match
    #[arg(long, default_value = "10")]
    pub rounds: usize,

    /// Probability of a move being inverted (0.0-1.0)
    #[arg(long, default_value = "0.0")]
    pub error_rate: f64,

    /// Payoff table as T,R,P,S (default 5,3,1,0)
    #[arg(long, value_name = "T,R,P,S", value_parser = parse_payoffs)]
    pub payoffs: Option<PayoffMatrix>,

    /// Number or text; makes the run reproducible
    #[arg(long)]
    pub seed: Option<Seed>,

    /// Output the full outcome as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// ORCHESTRATION
// ============================================================================

pub fn run(args: TournamentArgs) -> Result<()> {
    let strategies = match args.strategies.as_deref() {
        Some(list) => resolve_strategies(list)?,
        None => catalog(),
    };
    let config = build_config(&args);

    tracing::info!(
        "Starting tournament: format={}, strategies={}, rounds={}",
        config.format,
        strategies.len(),
        config.rounds_per_match
    );

    let outcome = simulate_tournament(&config, &strategies).context("Tournament failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        if config.format.is_swiss() {
            print_swiss_rounds(&outcome);
        }
        print_standings(&outcome);
    }

    Ok(())
}

// ============================================================================
// SETUP
// ============================================================================

fn build_config(args: &TournamentArgs) -> TournamentConfig {
    let format = match (args.format, args.tie_breaker) {
        (TournamentFormat::Swiss { rounds, .. }, Some(tie_breaker)) => TournamentFormat::swiss(rounds, tie_breaker),
        (format, Some(tie_breaker)) => {
            tracing::warn!("Tie-breaker {} ignored for {} format", tie_breaker, format);
            format
        }
        (format, None) => format,
    };

    let payoffs = args.payoffs.unwrap_or_default();
    if !payoffs.is_classic_dilemma() {
        tracing::warn!("Payoffs {:?} do not satisfy T > R > P > S", payoffs);
    }

    TournamentConfig {
        format,
        rounds_per_match: args.rounds,
        seed: args.seed.clone(),
        ..Default::default()
    }
    .with_error_rate(args.error_rate)
    .with_payoffs(payoffs)
}

fn parse_payoffs(value: &str) -> Result<PayoffMatrix, String> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid payoff value: {}", e))?;
    match parts[..] {
        [temptation, reward, punishment, sucker] => Ok(PayoffMatrix::new(temptation, reward, punishment, sucker)),
        _ => Err(format!("expected 4 comma-separated values, got {}", parts.len())),
    }
}

/// Look up a comma-separated list of catalog ids
pub(crate) fn resolve_strategies(list: &str) -> Result<Vec<SharedStrategy>> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| by_name(name).with_context(|| format!("Unknown strategy in --strategies: {}", name)))
        .collect()
}

// ============================================================================
// REPORTING
// ============================================================================

pub(crate) fn print_standings(outcome: &TournamentOutcome) {
    println!("\n=== Standings ({}) ===", outcome.format);
    println!(
        "{:>3}  {:<24} {:>9} {:>8} {:>7} {:>6} {:>8} {:>6} {:>7}",
        "#", "Strategy", "Total", "Avg", "StdDev", "Wins", "Matches", "Win%", "Elo"
    );
    for (rank, result) in outcome.results.iter().enumerate() {
        println!(
            "{:>3}  {:<24} {:>9.1} {:>8.2} {:>7.2} {:>6} {:>8} {:>5.0}% {:>7.0}",
            rank + 1,
            result.name,
            result.total_score,
            result.average_score,
            result.std_deviation,
            result.wins,
            result.matches_played,
            result.win_rate() * 100.0,
            result.elo_rating.unwrap_or(f64::NAN)
        );
    }

    if let Some(winner) = outcome.winner() {
        println!("\nWinner: {} ({:.1} points)", winner.name, winner.total_score);
        if let Some(best) = winner.head_to_head.first() {
            println!(
                "Best matchup: vs {} ({:.2} avg, {}W/{}D/{}L)",
                best.opponent, best.average_score, best.stats.wins, best.stats.draws, best.stats.losses
            );
        }
    }
}

fn print_swiss_rounds(outcome: &TournamentOutcome) {
    let Some(rounds) = &outcome.swiss_rounds else {
        return;
    };
    for summary in rounds {
        let leaders: Vec<String> = summary
            .leaderboard
            .iter()
            .map(|entry| format!("{} {:.0}", entry.name, entry.score))
            .collect();
        let byes = if summary.byes.is_empty() {
            String::new()
        } else {
            format!(" | bye: {}", summary.byes.join(", "))
        };
        println!("Round {}: {}{}", summary.round, leaders.join(", "), byes);
    }
}

// ============================================================================
// TESTS
// ============================================================================
