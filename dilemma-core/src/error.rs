//! Error types for the core crate

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DilemmaError {
    #[error("unknown move '{0}' (expected cooperate or defect)")]
    UnknownMove(String),

    #[error("unknown strategy '{0}'")]
    UnknownStrategy(String),
}
