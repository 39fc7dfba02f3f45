//! Tournament errors

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TournamentError {
    #[error("a tournament needs at least 2 strategies, got {found}")]
    NotEnoughStrategies { found: usize },

    #[error("unknown tournament format '{0}' (expected round-robin, double-round-robin or swiss[:rounds])")]
    UnknownFormat(String),

    #[error("unknown tie-breaker '{0}' (expected buchholz, sonneborn-berger or total-score)")]
    UnknownTieBreaker(String),
}
