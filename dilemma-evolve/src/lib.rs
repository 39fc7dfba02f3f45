//! Dilemma Evolution - Genetic algorithm for strategy discovery
//!
//! This crate provides evolutionary algorithms over rule-based genomes:
//! - Genome representation and the genetic strategy
//! - Mutation and single-point crossover
//! - Selection (tournament, roulette wheel, rank, elitist)
//! - The generation loop with hooks, snapshots and profiling
//! - Tournament-based fitness and the post-run showcase

pub mod crossover;
pub mod engine;
pub mod error;
pub mod fitness;
pub mod genome;
pub mod hooks;
pub mod mutation;
pub mod naming;
pub mod population;
pub mod presets;
pub mod selection;
pub mod settings;

pub use crossover::single_point_crossover;
pub use engine::{create_basic_evolution_engine, EngineOptions, EvolutionEngine, RunOptions};
pub use error::EvolutionError;
pub use fitness::{showcase_tournament, FitnessEvaluator, TournamentFitness};
pub use genome::{
    create_genetic_strategy, Gene, GeneCondition, GeneticStrategy, GeneticStrategyConfig, Genome, RoundRange,
};
pub use hooks::{EvolutionHooks, NoHooks};
pub use mutation::{mutate_genome, mutate_genome_counted, MutationOptions};
pub use population::{
    EvolutionSummary, GenerationMetrics, GenerationSnapshot, Origin, PopulationIndividual, RuntimeMetrics,
};
pub use presets::default_seed_pool;
pub use selection::{roulette_select, select_parents, tournament_select, SelectionMethod};
pub use settings::{validate_settings, EvolutionSettings, SettingsIssue};
