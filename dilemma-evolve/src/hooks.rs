//! Observation taps for the evolution loop
//!
//! Hooks run synchronously on the engine thread. They see borrowed data
//! only and cannot change engine state.

use crate::population::GenerationSnapshot;

/// Callbacks fired while a run progresses. Every method defaults to a
/// no-op, so implementors override only what they watch.
pub trait EvolutionHooks {
    /// Before the generation's population is evaluated (0-based)
    fn on_generation_start(&self, _generation: usize) {}

    /// After evaluation, with the frozen snapshot
    fn on_generation_complete(&self, _snapshot: &GenerationSnapshot) {}

    /// A newly created individual received `events` gene-field changes
    fn on_mutation_applied(&self, _individual_id: &str, _events: usize) {}

    /// Two parents were crossed into a pair of children
    fn on_crossover_applied(&self, _first_parent: &str, _second_parent: &str) {}
}

/// Hooks that ignore everything
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHooks;

impl EvolutionHooks for NoHooks {}
