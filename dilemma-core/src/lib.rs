//! Dilemma Core - Iterated Prisoner's Dilemma primitives
//!
//! This crate provides the building blocks every other crate plays with:
//! - Moves and the payoff table
//! - Deterministic random sources (seed normalization, mulberry32)
//! - Per-match history and the `Strategy` capability
//! - The match engine (noise, scoring, transcripts)
//! - A catalog of classic reference strategies

pub mod error;
pub mod history;
pub mod match_play;
pub mod moves;
pub mod random;
pub mod strategies;
pub mod strategy;

// Re-exports for convenient access
pub use error::DilemmaError;
pub use history::GameHistory;
pub use match_play::{play_match, MatchResult, RoundRecord};
pub use moves::{Move, PayoffMatrix};
pub use random::{next_unit, pick_index, FixedRandom, Mulberry32, RandomSource, Seed};
pub use strategy::{SharedStrategy, Strategy};
