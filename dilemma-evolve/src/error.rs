//! Evolution errors

use dilemma_tournament::TournamentError;
use thiserror::Error;

/// Setup failures of the evolution engine
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvolutionError {
    #[error("seed pool must contain at least one genetic strategy")]
    EmptySeedPool,

    #[error("opponent pool must contain at least one strategy")]
    EmptyOpponents,

    #[error("unknown selection method: {0}")]
    UnknownSelectionMethod(String),

    #[error(transparent)]
    Tournament(#[from] TournamentError),
}
