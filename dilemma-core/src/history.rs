//! Per-match transcript as seen from one player's side

use serde::{Deserialize, Serialize};

use crate::moves::Move;

/// One player's view of a match so far.
///
/// All four vectors are indexed by round and always have the same length.
/// Moves are recorded after noise, so a strategy sees what was actually
/// enacted in earlier rounds.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameHistory {
    pub own_moves: Vec<Move>,
    pub opponent_moves: Vec<Move>,
    pub own_scores: Vec<f64>,
    pub opponent_scores: Vec<f64>,
}

impl GameHistory {
    pub fn with_capacity(rounds: usize) -> Self {
        Self {
            own_moves: Vec::with_capacity(rounds),
            opponent_moves: Vec::with_capacity(rounds),
            own_scores: Vec::with_capacity(rounds),
            opponent_scores: Vec::with_capacity(rounds),
        }
    }

    /// Build a view from raw move lists, scores zeroed. Mostly for tests
    /// and replaying a transcript.
    pub fn from_moves(own: &[Move], opponent: &[Move]) -> Self {
        let len = own.len().min(opponent.len());
        Self {
            own_moves: own[..len].to_vec(),
            opponent_moves: opponent[..len].to_vec(),
            own_scores: vec![0.0; len],
            opponent_scores: vec![0.0; len],
        }
    }

    pub fn rounds_played(&self) -> usize {
        self.own_moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.own_moves.is_empty()
    }

    pub fn last_own_move(&self) -> Option<Move> {
        self.own_moves.last().copied()
    }

    pub fn last_opponent_move(&self) -> Option<Move> {
        self.opponent_moves.last().copied()
    }

    pub fn own_total(&self) -> f64 {
        self.own_scores.iter().sum()
    }

    pub fn opponent_total(&self) -> f64 {
        self.opponent_scores.iter().sum()
    }

    pub fn opponent_defections(&self) -> usize {
        self.opponent_moves.iter().filter(|m| **m == Move::Defect).count()
    }

    pub(crate) fn record(&mut self, own: Move, opponent: Move, own_score: f64, opponent_score: f64) {
        self.own_moves.push(own);
        self.opponent_moves.push(opponent);
        self.own_scores.push(own_score);
        self.opponent_scores.push(opponent_score);
    }
}
