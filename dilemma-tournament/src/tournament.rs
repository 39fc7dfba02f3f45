//! Tournament execution - round-robin, double round-robin and Swiss formats
//!
//! Every run goes initialize -> play pairings -> finalize. Matches are
//! played strictly in order so a seeded run consumes its single random
//! stream identically every time.

use std::collections::BTreeMap;

use dilemma_core::{play_match, MatchResult, PayoffMatrix, RandomSource, Seed, SharedStrategy};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::config::{TieBreaker, TournamentConfig, TournamentFormat};
use crate::elo::EloOptions;
use crate::error::TournamentError;
use crate::standings::{Ledger, TournamentResult};

/// Number of leaderboard rows kept in each Swiss round summary
const SWISS_LEADERBOARD_SIZE: usize = 5;

/// One Swiss pairing as played
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwissMatchRecord {
    pub player1: String,
    pub player2: String,
    pub player1_score: f64,
    pub player2_score: f64,
    /// None on a draw
    pub winner: Option<String>,
}

/// Leaderboard row in a round snapshot
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: f64,
    pub wins: u32,
    pub matches: u32,
    pub tie_break: f64,
}

/// Snapshot of one Swiss round
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwissRoundSummary {
    /// 1-based
    pub round: usize,
    pub matches: Vec<SwissMatchRecord>,
    pub byes: Vec<String>,
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// Everything a run produces
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentOutcome {
    pub format: TournamentFormat,
    /// Final standings, best first
    pub results: Vec<TournamentResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swiss_rounds: Option<Vec<SwissRoundSummary>>,
    pub ratings: BTreeMap<String, f64>,
}

impl TournamentOutcome {
    /// Get winner (top standing)
    pub fn winner(&self) -> Option<&TournamentResult> {
        self.results.first()
    }

    /// Get top N performers
    pub fn top_n(&self, n: usize) -> &[TournamentResult] {
        let n = n.min(self.results.len());
        &self.results[..n]
    }

    /// Get the standing for a strategy by name
    pub fn result_for(&self, name: &str) -> Option<&TournamentResult> {
        self.results.iter().find(|r| r.name == name)
    }
}

/// Entry point namespace for running tournaments
pub struct Tournament;

impl Tournament {
    /// Run a tournament of `strategies` in the given format.
    ///
    /// With a seed, every match draws from one shared stream created from
    /// it. Without one, each match gets its own entropy stream.
    pub fn run_with_format(
        format: TournamentFormat,
        strategies: &[SharedStrategy],
        rounds_per_match: usize,
        error_rate: f64,
        payoffs: &PayoffMatrix,
        seed: Option<&Seed>,
    ) -> Result<TournamentOutcome, TournamentError> {
        let settings = MatchSettings {
            rounds_per_match,
            error_rate,
            payoffs: *payoffs,
        };
        run(format, strategies, &settings, seed, &EloOptions::default())
    }

    /// Run with a full configuration (including Elo parameters)
    pub fn run(config: &TournamentConfig, strategies: &[SharedStrategy]) -> Result<TournamentOutcome, TournamentError> {
        let settings = MatchSettings {
            rounds_per_match: config.rounds_per_match,
            error_rate: config.error_rate,
            payoffs: config.payoff_matrix,
        };
        run(config.format, strategies, &settings, config.seed.as_ref(), &config.elo)
    }
}

/// Convenience entry point for callers holding a config
pub fn simulate_tournament(
    config: &TournamentConfig,
    strategies: &[SharedStrategy],
) -> Result<TournamentOutcome, TournamentError> {
    Tournament::run(config, strategies)
}

// ============================================================================
// Orchestration
// ============================================================================

#[derive(Clone, Copy, Debug)]
struct MatchSettings {
    rounds_per_match: usize,
    error_rate: f64,
    payoffs: PayoffMatrix,
}

fn run(
    format: TournamentFormat,
    strategies: &[SharedStrategy],
    settings: &MatchSettings,
    seed: Option<&Seed>,
    elo: &EloOptions,
) -> Result<TournamentOutcome, TournamentError> {
    if strategies.len() < 2 {
        return Err(TournamentError::NotEnoughStrategies {
            found: strategies.len(),
        });
    }

    let mut streams = MatchStreams::new(seed);
    let mut ledger = Ledger::new(strategies.iter().map(|s| s.name()));

    let outcome = match format {
        TournamentFormat::SingleRoundRobin => {
            play_round_robin(strategies, settings, &mut streams, &mut ledger, false);
            let order = ledger.score_order();
            build_outcome(format, &ledger, &order, None, elo)
        }
        TournamentFormat::DoubleRoundRobin => {
            play_round_robin(strategies, settings, &mut streams, &mut ledger, true);
            let order = ledger.score_order();
            build_outcome(format, &ledger, &order, None, elo)
        }
        TournamentFormat::Swiss { rounds, tie_breaker } => {
            let tie_breaker = tie_breaker.unwrap_or_default();
            let rounds = rounds.unwrap_or_else(|| default_swiss_rounds(strategies.len()));
            let summaries = play_swiss(strategies, settings, &mut streams, &mut ledger, rounds, tie_breaker);
            let order = ledger.ranking(&ledger.tie_breaks(tie_breaker));
            build_outcome(format, &ledger, &order, Some(summaries), elo)
        }
    };

    tracing::info!(
        format = %format,
        strategies = strategies.len(),
        matches = ledger.elo_log.len(),
        winner = outcome.winner().map(|w| w.name.as_str()).unwrap_or("-"),
        "tournament complete"
    );

    Ok(outcome)
}

fn build_outcome(
    format: TournamentFormat,
    ledger: &Ledger,
    order: &[usize],
    swiss_rounds: Option<Vec<SwissRoundSummary>>,
    elo: &EloOptions,
) -> TournamentOutcome {
    let (results, ratings) = ledger.finalize(order, elo);
    TournamentOutcome {
        format,
        results,
        swiss_rounds,
        ratings: ratings.into_iter().collect(),
    }
}

/// ceil(log2(n)) + 1
pub fn default_swiss_rounds(strategy_count: usize) -> usize {
    if strategy_count <= 1 {
        return 1;
    }
    (strategy_count as f64).log2().ceil() as usize + 1
}

// ============================================================================
// Randomness per match
// ============================================================================

/// Hands out the random stream for each match: the one shared seeded
/// stream, or a fresh entropy stream per match. Never a mix of both.
struct MatchStreams {
    shared: Option<RandomSource>,
}

impl MatchStreams {
    fn new(seed: Option<&Seed>) -> Self {
        Self {
            shared: seed.map(RandomSource::seeded),
        }
    }

    fn play(
        &mut self,
        a: &SharedStrategy,
        b: &SharedStrategy,
        settings: &MatchSettings,
    ) -> MatchResult {
        let mut fresh;
        let rng = match self.shared.as_mut() {
            Some(shared) => shared,
            None => {
                fresh = RandomSource::entropy();
                &mut fresh
            }
        };
        play_match(
            a.as_ref(),
            b.as_ref(),
            settings.rounds_per_match,
            settings.error_rate,
            &settings.payoffs,
            rng,
        )
    }
}

// ============================================================================
// Round-robin
// ============================================================================

fn play_round_robin(
    strategies: &[SharedStrategy],
    settings: &MatchSettings,
    streams: &mut MatchStreams,
    ledger: &mut Ledger,
    double: bool,
) {
    for (i, j) in generate_round_robin_pairings(strategies.len()) {
        let result = streams.play(&strategies[i], &strategies[j], settings);
        tracing::debug!(player1 = %result.player1, player2 = %result.player2,
            score1 = result.player1_score, score2 = result.player2_score, "round-robin match");
        ledger.record_match(i, j, &result);

        if double {
            let rematch = streams.play(&strategies[j], &strategies[i], settings);
            ledger.record_match(j, i, &rematch);
        }
    }
}

/// Generate all pairings for round-robin, (i, j) with i < j
fn generate_round_robin_pairings(n: usize) -> Vec<(usize, usize)> {
    let mut pairings = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            pairings.push((i, j));
        }
    }
    pairings
}

// ============================================================================
// Swiss
// ============================================================================

fn play_swiss(
    strategies: &[SharedStrategy],
    settings: &MatchSettings,
    streams: &mut MatchStreams,
    ledger: &mut Ledger,
    rounds: usize,
    tie_breaker: TieBreaker,
) -> Vec<SwissRoundSummary> {
    let mut played: FxHashSet<(usize, usize)> = FxHashSet::default();
    let mut summaries = Vec::with_capacity(rounds);
    let bye_score = settings.rounds_per_match as f64 * settings.payoffs.reward;

    for round in 1..=rounds {
        let tie_breaks = ledger.tie_breaks(tie_breaker);
        let mut ranked = ledger.ranking(&tie_breaks);

        let mut byes = Vec::new();
        if ranked.len() % 2 == 1 {
            let bye = select_bye(ledger, &ranked);
            ranked.retain(|&i| i != bye);
            ledger.record_bye(bye, bye_score);
            tracing::debug!(round, player = %ledger.entries[bye].name, "swiss bye");
            byes.push(ledger.entries[bye].name.clone());
        }

        let pairings = generate_swiss_pairings(&ranked, &played);
        let mut matches = Vec::with_capacity(pairings.len());
        for (a, b) in pairings {
            let result = streams.play(&strategies[a], &strategies[b], settings);
            ledger.record_match(a, b, &result);
            played.insert(pair_key(a, b));

            matches.push(SwissMatchRecord {
                winner: result.winner().map(str::to_string),
                player1: result.player1,
                player2: result.player2,
                player1_score: result.player1_score,
                player2_score: result.player2_score,
            });
        }

        let post_round = ledger.tie_breaks(tie_breaker);
        let leaderboard = ledger
            .ranking(&post_round)
            .into_iter()
            .take(SWISS_LEADERBOARD_SIZE)
            .map(|i| {
                let entry = &ledger.entries[i];
                LeaderboardEntry {
                    name: entry.name.clone(),
                    score: entry.total_score,
                    wins: entry.wins,
                    matches: entry.matches_played,
                    tie_break: post_round[i],
                }
            })
            .collect();

        tracing::debug!(round, matches = matches.len(), byes = byes.len(), "swiss round complete");
        summaries.push(SwissRoundSummary {
            round,
            matches,
            byes,
            leaderboard,
        });
    }

    summaries
}

/// Lowest-ranked entry without a bye yet, else the lowest-ranked overall
fn select_bye(ledger: &Ledger, ranked: &[usize]) -> usize {
    ranked
        .iter()
        .rev()
        .copied()
        .find(|&i| ledger.entries[i].byes == 0)
        .or_else(|| ranked.last().copied())
        .unwrap_or(0)
}

/// Greedy pairing in rank order. Each top remaining entry takes the next
/// opponent it has not met; if it has met everyone left, it takes the
/// next one regardless.
fn generate_swiss_pairings(ranked: &[usize], played: &FxHashSet<(usize, usize)>) -> Vec<(usize, usize)> {
    let mut pool: Vec<usize> = ranked.to_vec();
    let mut pairings = Vec::with_capacity(pool.len() / 2);

    while pool.len() >= 2 {
        let top = pool.remove(0);
        let pick = pool
            .iter()
            .position(|&other| !played.contains(&pair_key(top, other)))
            .unwrap_or(0);
        let opponent = pool.remove(pick);
        pairings.push((top, opponent));
    }

    pairings
}

fn pair_key(a: usize, b: usize) -> (usize, usize) {
    (a.min(b), a.max(b))
}
