//! Strategy capability
//!
//! Every strategy family (hand-written, genetic, anything later) satisfies
//! this one narrow contract.

use std::sync::Arc;

use rand::RngCore;

use crate::history::GameHistory;
use crate::moves::Move;

/// A named decision rule producing a move from the match so far.
///
/// `round` is 0-based. `rng` is the match's random stream; strategies that
/// need randomness must draw from it so seeded runs stay reproducible.
pub trait Strategy: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn play(&self, history: &GameHistory, round: usize, rng: &mut dyn RngCore) -> Move;
}

/// Strategies are immutable once built and shared by reference
pub type SharedStrategy = Arc<dyn Strategy>;

impl std::fmt::Debug for dyn Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Strategy").field("name", &self.name()).finish()
    }
}
