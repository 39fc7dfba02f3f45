//! Configuration types for tournament play

use std::str::FromStr;

use dilemma_core::{PayoffMatrix, Seed};
use serde::{Deserialize, Serialize};

use crate::elo::EloOptions;
use crate::error::TournamentError;

/// Secondary ranking key for Swiss standings
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreaker {
    /// Sum of opponents' total scores
    #[default]
    Buchholz,
    /// Sum of opponents' total scores weighted by result (1 win, 0.5 draw)
    SonnebornBerger,
    /// Total score again (effectively falls through to wins, then name)
    TotalScore,
}

impl FromStr for TieBreaker {
    type Err = TournamentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buchholz" => Ok(TieBreaker::Buchholz),
            "sonneborn-berger" | "sonneborn_berger" | "sb" => Ok(TieBreaker::SonnebornBerger),
            "total-score" | "total_score" | "total" => Ok(TieBreaker::TotalScore),
            other => Err(TournamentError::UnknownTieBreaker(other.to_string())),
        }
    }
}

impl std::fmt::Display for TieBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TieBreaker::Buchholz => write!(f, "buchholz"),
            TieBreaker::SonnebornBerger => write!(f, "sonneborn-berger"),
            TieBreaker::TotalScore => write!(f, "total-score"),
        }
    }
}

/// Tournament format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TournamentFormat {
    /// Everyone plays everyone once
    #[default]
    SingleRoundRobin,
    /// Everyone plays everyone twice, home and away
    DoubleRoundRobin,
    /// Pair by standing each round
    #[serde(rename_all = "camelCase")]
    Swiss {
        /// Defaults to ceil(log2(n)) + 1
        rounds: Option<usize>,
        tie_breaker: Option<TieBreaker>,
    },
}

impl TournamentFormat {
    pub fn swiss(rounds: Option<usize>, tie_breaker: TieBreaker) -> Self {
        TournamentFormat::Swiss {
            rounds,
            tie_breaker: Some(tie_breaker),
        }
    }

    pub fn is_swiss(&self) -> bool {
        matches!(self, TournamentFormat::Swiss { .. })
    }
}

impl FromStr for TournamentFormat {
    type Err = TournamentError;

    /// Accepts `round-robin`, `double-round-robin`, `swiss` or `swiss:<rounds>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let (name, arg) = match lowered.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (lowered.as_str(), None),
        };

        match (name, arg) {
            ("round-robin" | "single-round-robin" | "single", None) => Ok(TournamentFormat::SingleRoundRobin),
            ("double-round-robin" | "double", None) => Ok(TournamentFormat::DoubleRoundRobin),
            ("swiss", None) => Ok(TournamentFormat::Swiss {
                rounds: None,
                tie_breaker: None,
            }),
            ("swiss", Some(rounds)) => {
                let rounds = rounds
                    .parse::<usize>()
                    .map_err(|_| TournamentError::UnknownFormat(s.to_string()))?;
                Ok(TournamentFormat::Swiss {
                    rounds: Some(rounds),
                    tie_breaker: None,
                })
            }
            _ => Err(TournamentError::UnknownFormat(s.to_string())),
        }
    }
}

impl std::fmt::Display for TournamentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentFormat::SingleRoundRobin => write!(f, "round-robin"),
            TournamentFormat::DoubleRoundRobin => write!(f, "double-round-robin"),
            TournamentFormat::Swiss { rounds: Some(r), .. } => write!(f, "swiss:{}", r),
            TournamentFormat::Swiss { rounds: None, .. } => write!(f, "swiss"),
        }
    }
}

/// Tournament configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TournamentConfig {
    /// Tournament format
    pub format: TournamentFormat,
    /// Rounds played in every match
    pub rounds_per_match: usize,
    /// Per-move probability of inverting the chosen move
    pub error_rate: f64,
    /// Reward table
    pub payoff_matrix: PayoffMatrix,
    /// Seed for one shared stream (None = independent entropy per match)
    pub seed: Option<Seed>,
    /// Elo parameters applied after the last match
    pub elo: EloOptions,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            format: TournamentFormat::SingleRoundRobin,
            rounds_per_match: 10,
            error_rate: 0.0,
            payoff_matrix: PayoffMatrix::default(),
            seed: None,
            elo: EloOptions::default(),
        }
    }
}

impl TournamentConfig {
    /// Create round-robin tournament config
    pub fn round_robin(rounds_per_match: usize) -> Self {
        Self {
            format: TournamentFormat::SingleRoundRobin,
            rounds_per_match,
            ..Default::default()
        }
    }

    /// Create double round-robin tournament config
    pub fn double_round_robin(rounds_per_match: usize) -> Self {
        Self {
            format: TournamentFormat::DoubleRoundRobin,
            rounds_per_match,
            ..Default::default()
        }
    }

    /// Create Swiss tournament config
    pub fn swiss(rounds: Option<usize>, tie_breaker: TieBreaker, rounds_per_match: usize) -> Self {
        Self {
            format: TournamentFormat::swiss(rounds, tie_breaker),
            rounds_per_match,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: impl Into<Seed>) -> Self {
        self.seed = Some(seed.into());
        self
    }

    pub fn with_error_rate(mut self, error_rate: f64) -> Self {
        self.error_rate = error_rate;
        self
    }

    pub fn with_payoffs(mut self, payoff_matrix: PayoffMatrix) -> Self {
        self.payoff_matrix = payoff_matrix;
        self
    }
}
