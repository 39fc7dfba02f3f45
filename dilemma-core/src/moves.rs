//! Moves and the payoff table

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DilemmaError;

/// A move in the Prisoner's Dilemma
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Move {
    Cooperate,
    Defect,
}

impl Move {
    /// The other move
    pub fn flipped(self) -> Move {
        match self {
            Move::Cooperate => Move::Defect,
            Move::Defect => Move::Cooperate,
        }
    }
}

impl FromStr for Move {
    type Err = DilemmaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" | "cooperate" => Ok(Move::Cooperate),
            "d" | "defect" => Ok(Move::Defect),
            other => Err(DilemmaError::UnknownMove(other.to_string())),
        }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Move::Cooperate => write!(f, "COOPERATE"),
            Move::Defect => write!(f, "DEFECT"),
        }
    }
}

/// The 2x2 reward table.
///
/// The classic dilemma has temptation > reward > punishment > sucker, but
/// any values are accepted so other games (Stag Hunt, Chicken) can be
/// played with the same engine.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PayoffMatrix {
    pub temptation: f64,
    pub reward: f64,
    pub punishment: f64,
    pub sucker: f64,
}

impl Default for PayoffMatrix {
    fn default() -> Self {
        Self {
            temptation: 5.0,
            reward: 3.0,
            punishment: 1.0,
            sucker: 0.0,
        }
    }
}

impl PayoffMatrix {
    pub fn new(temptation: f64, reward: f64, punishment: f64, sucker: f64) -> Self {
        Self {
            temptation,
            reward,
            punishment,
            sucker,
        }
    }

    /// Returns (score_a, score_b)
    pub fn payoff(&self, a: Move, b: Move) -> (f64, f64) {
        match (a, b) {
            (Move::Cooperate, Move::Cooperate) => (self.reward, self.reward),
            (Move::Cooperate, Move::Defect) => (self.sucker, self.temptation),
            (Move::Defect, Move::Cooperate) => (self.temptation, self.sucker),
            (Move::Defect, Move::Defect) => (self.punishment, self.punishment),
        }
    }

    /// Whether T > R > P > S holds
    pub fn is_classic_dilemma(&self) -> bool {
        self.temptation > self.reward && self.reward > self.punishment && self.punishment > self.sucker
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payoff_matrix() {
        let matrix = PayoffMatrix::default();
        assert_eq!(matrix.payoff(Move::Cooperate, Move::Cooperate), (3.0, 3.0));
        assert_eq!(matrix.payoff(Move::Cooperate, Move::Defect), (0.0, 5.0));
        assert_eq!(matrix.payoff(Move::Defect, Move::Cooperate), (5.0, 0.0));
        assert_eq!(matrix.payoff(Move::Defect, Move::Defect), (1.0, 1.0));
    }

    #[test]
    fn test_custom_matrix_not_dilemma() {
        // Stag Hunt: mutual cooperation beats temptation
        let stag_hunt = PayoffMatrix::new(3.0, 4.0, 2.0, 0.0);
        assert!(!stag_hunt.is_classic_dilemma());
        assert_eq!(stag_hunt.payoff(Move::Cooperate, Move::Cooperate), (4.0, 4.0));
        assert!(PayoffMatrix::default().is_classic_dilemma());
    }

    #[test]
    fn test_move_parse() {
        assert_eq!("C".parse::<Move>().unwrap(), Move::Cooperate);
        assert_eq!("defect".parse::<Move>().unwrap(), Move::Defect);
        assert!("maybe".parse::<Move>().is_err());
    }

    #[test]
    fn test_move_flip_and_serde() {
        assert_eq!(Move::Cooperate.flipped(), Move::Defect);
        assert_eq!(Move::Defect.flipped(), Move::Cooperate);
        assert_eq!(serde_json::to_string(&Move::Defect).unwrap(), "\"DEFECT\"");
    }
}
