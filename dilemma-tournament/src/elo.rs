//! Elo rating updates
//!
//! Ratings are folded over the match log in the order matches were played.
//! Replaying the same log in another order gives different ratings, so
//! callers must keep chronological order.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Running rating map, keyed by strategy name
pub type EloRatings = FxHashMap<String, f64>;

/// Elo parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EloOptions {
    pub k_factor: f64,
    pub base_rating: f64,
}

impl Default for EloOptions {
    fn default() -> Self {
        Self {
            k_factor: 32.0,
            base_rating: 1500.0,
        }
    }
}

/// Result of a match from the first player's point of view
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EloOutcome {
    Win,
    Draw,
    Loss,
}

impl EloOutcome {
    /// Compare two scores from the first player's side
    pub fn from_scores(own: f64, opponent: f64) -> Self {
        if own > opponent {
            EloOutcome::Win
        } else if own < opponent {
            EloOutcome::Loss
        } else {
            EloOutcome::Draw
        }
    }

    pub fn actual_score(self) -> f64 {
        match self {
            EloOutcome::Win => 1.0,
            EloOutcome::Draw => 0.5,
            EloOutcome::Loss => 0.0,
        }
    }

    /// Same match seen from the other side
    pub fn reversed(self) -> Self {
        match self {
            EloOutcome::Win => EloOutcome::Loss,
            EloOutcome::Draw => EloOutcome::Draw,
            EloOutcome::Loss => EloOutcome::Win,
        }
    }
}

/// One logged match, outcome from `player`'s side
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EloMatch {
    pub player: String,
    pub opponent: String,
    pub outcome: EloOutcome,
}

/// Logistic expectation of `player` scoring against `opponent`
pub fn expected_score(player: f64, opponent: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((opponent - player) / 400.0))
}

/// New rating for `player` after one match. Missing ratings start at the
/// base rating.
pub fn update_elo_rating(
    player_rating: Option<f64>,
    opponent_rating: Option<f64>,
    outcome: EloOutcome,
    options: &EloOptions,
) -> f64 {
    let player = player_rating.unwrap_or(options.base_rating);
    let opponent = opponent_rating.unwrap_or(options.base_rating);
    let expected = expected_score(player, opponent);
    player + options.k_factor * (outcome.actual_score() - expected)
}

/// Apply every match in order, each one seeing the ratings left by the
/// previous ones. Both sides update from their pre-match ratings.
pub fn process_elo_matches(initial: &EloRatings, matches: &[EloMatch], options: &EloOptions) -> EloRatings {
    let mut ratings = initial.clone();

    for m in matches {
        let player_before = ratings.get(&m.player).copied();
        let opponent_before = ratings.get(&m.opponent).copied();

        let player_after = update_elo_rating(player_before, opponent_before, m.outcome, options);
        let opponent_after = update_elo_rating(opponent_before, player_before, m.outcome.reversed(), options);

        ratings.insert(m.player.clone(), player_after);
        ratings.insert(m.opponent.clone(), opponent_after);
    }

    ratings
}
