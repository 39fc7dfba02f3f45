//! Dilemma Tournament - many strategies, one ranking
//!
//! This crate provides tournament infrastructure:
//! - Round-robin, double round-robin and Swiss pairing
//! - Head-to-head records, score dispersion and tie-breakers
//! - Sequential Elo ratings over the match log
//!
//! ## Architecture
//!
//! - `Tournament::run_with_format` / `simulate_tournament` (orchestration)
//! - pairing generation and match dispatch (phases)
//! - `Ledger` aggregation and finalization (steps)
//! - configuration, Elo arithmetic (utilities)

mod config;
mod elo;
mod error;
mod standings;
mod tournament;

pub use config::{TieBreaker, TournamentConfig, TournamentFormat};
pub use elo::{expected_score, process_elo_matches, update_elo_rating, EloMatch, EloOptions, EloOutcome, EloRatings};
pub use error::TournamentError;
pub use standings::{population_std_dev, HeadToHeadStats, HeadToHeadSummary, TournamentResult};
pub use tournament::{
    default_swiss_rounds, simulate_tournament, LeaderboardEntry, SwissMatchRecord, SwissRoundSummary, Tournament,
    TournamentOutcome,
};
