//! Evolution engine
//!
//! Generation loop: evaluate, snapshot, then breed the next population
//! unless this was the last generation.
//!
//! ## Determinism
//!
//! All selection, crossover and mutation draws come from one stream built
//! from `settings.seed` at the start of each run, consumed in population
//! order. The default evaluator never touches that stream: each evaluation
//! builds its own from the same seed, so running it on rayon's pool yields
//! the same fitness as running it in order.

use std::time::Instant;

use chrono::Utc;
use dilemma_core::{next_unit, RandomSource, SharedStrategy};
use rayon::prelude::*;

use crate::crossover::single_point_crossover;
use crate::error::EvolutionError;
use crate::fitness::{FitnessEvaluator, TournamentFitness};
use crate::genome::GeneticStrategyConfig;
use crate::hooks::{EvolutionHooks, NoHooks};
use crate::mutation::{mutate_genome_counted, MutationOptions};
use crate::naming::genome_name;
use crate::population::{
    EvolutionSummary, GenerationMetrics, GenerationSnapshot, Origin, PopulationIndividual, RuntimeMetrics,
};
use crate::selection::{clamp_tournament_size, select_parents, SelectionMethod};
use crate::settings::EvolutionSettings;

/// Everything needed to build an engine
#[derive(Default)]
pub struct EngineOptions {
    pub settings: EvolutionSettings,
    /// Genomes the first population is cloned from
    pub seed_pool: Vec<GeneticStrategyConfig>,
    /// Fixed pool the default evaluator plays against
    pub opponents: Vec<SharedStrategy>,
    pub hooks: Option<Box<dyn EvolutionHooks>>,
    /// Replaces the default tournament evaluator
    pub fitness: Option<Box<dyn FitnessEvaluator>>,
}

/// Per-run overrides
#[derive(Default)]
pub struct RunOptions<'a> {
    /// Takes precedence over the engine's evaluator
    pub evaluator: Option<&'a dyn FitnessEvaluator>,
    /// Used instead of cloning the seed pool when non-empty
    pub initial_population: Option<Vec<PopulationIndividual>>,
}

/// Build an engine, rejecting an empty seed pool or opponent pool
pub fn create_basic_evolution_engine(options: EngineOptions) -> Result<EvolutionEngine, EvolutionError> {
    let mut engine = EvolutionEngine::new(options.settings, options.seed_pool, options.opponents)?;
    if let Some(hooks) = options.hooks {
        engine.hooks = hooks;
    }
    engine.fitness = options.fitness;
    Ok(engine)
}

pub struct EvolutionEngine {
    settings: EvolutionSettings,
    seed_pool: Vec<GeneticStrategyConfig>,
    opponents: Vec<SharedStrategy>,
    hooks: Box<dyn EvolutionHooks>,
    fitness: Option<Box<dyn FitnessEvaluator>>,
    /// Last individual id handed out; owned per engine
    next_id: u64,
}

impl EvolutionEngine {
    pub fn new(
        settings: EvolutionSettings,
        seed_pool: Vec<GeneticStrategyConfig>,
        opponents: Vec<SharedStrategy>,
    ) -> Result<Self, EvolutionError> {
        if seed_pool.is_empty() {
            return Err(EvolutionError::EmptySeedPool);
        }
        if opponents.is_empty() {
            return Err(EvolutionError::EmptyOpponents);
        }
        Ok(Self {
            settings,
            seed_pool,
            opponents,
            hooks: Box::new(NoHooks),
            fitness: None,
            next_id: 0,
        })
    }

    pub fn with_hooks(mut self, hooks: impl EvolutionHooks + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    pub fn with_fitness(mut self, fitness: impl FitnessEvaluator + 'static) -> Self {
        self.fitness = Some(Box::new(fitness));
        self
    }

    pub fn settings(&self) -> &EvolutionSettings {
        &self.settings
    }

    pub fn opponents(&self) -> &[SharedStrategy] {
        &self.opponents
    }

    pub fn run(&mut self) -> Result<EvolutionSummary, EvolutionError> {
        self.run_with(RunOptions::default())
    }

    pub fn run_with(&mut self, options: RunOptions<'_>) -> Result<EvolutionSummary, EvolutionError> {
        let run_started = Instant::now();
        warn_degenerate_settings(&self.settings);

        let default_fitness = TournamentFitness::new(&self.settings, self.opponents.clone());
        let evaluation = if let Some(evaluator) = options.evaluator {
            Evaluation::Custom(evaluator)
        } else if let Some(evaluator) = self.fitness.as_deref() {
            Evaluation::Custom(evaluator)
        } else {
            Evaluation::Tournament {
                fitness: &default_fitness,
                parallel: self.settings.parallel_evaluation,
            }
        };

        let mut breeder = Breeder {
            settings: &self.settings,
            hooks: &*self.hooks,
            rng: RandomSource::new(self.settings.seed.as_ref()),
            next_id: &mut self.next_id,
            mutation_events: 0,
            crossover_events: 0,
        };

        let mut population = match options.initial_population {
            Some(supplied) if !supplied.is_empty() => supplied,
            _ => breeder.initialize(&self.seed_pool),
        };

        tracing::info!(
            "Starting evolution: pop={}, gen={}, selection={}",
            population.len(),
            self.settings.generations,
            self.settings.selection_method
        );

        let mut history = Vec::with_capacity(self.settings.generations);
        let mut best_ever: Option<PopulationIndividual> = None;
        let mut generation_ms = Vec::with_capacity(self.settings.generations);

        for generation in 0..self.settings.generations {
            let generation_started = Instant::now();
            breeder.hooks.on_generation_start(generation);

            evaluate_population(&mut population, &evaluation)?;

            let generation_best = fittest(&population).cloned();
            if let Some(candidate) = &generation_best {
                let improves = best_ever
                    .as_ref()
                    .map_or(true, |best| candidate.sort_key() > best.sort_key());
                if improves {
                    best_ever = Some(candidate.clone());
                }
            }

            let metrics =
                GenerationMetrics::compute(&population, breeder.mutation_events, breeder.crossover_events);
            tracing::info!(
                "Generation {}: best={:.3}, avg={:.3}, median={:.3}",
                generation + 1,
                metrics.best_fitness.unwrap_or(f64::NAN),
                metrics.average_fitness.unwrap_or(f64::NAN),
                metrics.median_fitness.unwrap_or(f64::NAN)
            );

            let snapshot = GenerationSnapshot {
                generation,
                timestamp: Utc::now(),
                population: population.clone(),
                metrics,
                best_individual: generation_best,
            };
            breeder.hooks.on_generation_complete(&snapshot);
            history.push(snapshot);

            if generation + 1 < self.settings.generations {
                population = breeder.next_generation(population, generation + 1);
            }
            generation_ms.push(elapsed_ms(generation_started));
        }

        let runtime = self.settings.enable_profiling.then(|| RuntimeMetrics {
            total_ms: elapsed_ms(run_started),
            generation_ms,
        });

        Ok(EvolutionSummary {
            best_individual: best_ever,
            final_population: population,
            history,
            settings: self.settings.clone(),
            runtime,
        })
    }
}

impl std::fmt::Debug for EvolutionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvolutionEngine")
            .field("settings", &self.settings)
            .field("seed_pool", &self.seed_pool.len())
            .field("opponents", &self.opponents.len())
            .field("custom_fitness", &self.fitness.is_some())
            .finish()
    }
}

// ============================================================================
// Evaluation
// ============================================================================

enum Evaluation<'a> {
    Custom(&'a dyn FitnessEvaluator),
    Tournament { fitness: &'a TournamentFitness, parallel: bool },
}

fn evaluate_population(
    population: &mut [PopulationIndividual],
    evaluation: &Evaluation<'_>,
) -> Result<(), EvolutionError> {
    match evaluation {
        Evaluation::Tournament { fitness, parallel: true } => {
            let scores: Vec<Result<f64, EvolutionError>> =
                population.par_iter().map(|ind| fitness.evaluate(ind)).collect();
            for (individual, score) in population.iter_mut().zip(scores) {
                individual.fitness = Some(score?);
            }
        }
        Evaluation::Tournament { fitness, parallel: false } => {
            for individual in population.iter_mut() {
                individual.fitness = Some(fitness.evaluate(individual)?);
            }
        }
        Evaluation::Custom(evaluator) => {
            for individual in population.iter_mut() {
                individual.fitness = Some(evaluator.evaluate(individual)?);
            }
        }
    }
    Ok(())
}

/// First individual with the highest usable fitness
fn fittest(population: &[PopulationIndividual]) -> Option<&PopulationIndividual> {
    population
        .iter()
        .filter(|ind| matches!(ind.fitness, Some(f) if !f.is_nan()))
        .fold(None, |best: Option<&PopulationIndividual>, ind| match best {
            Some(b) if b.sort_key() >= ind.sort_key() => Some(b),
            _ => Some(ind),
        })
}

// ============================================================================
// Breeding
// ============================================================================

/// Mutable state of one run: the shared stream, id counter and event tallies
struct Breeder<'a> {
    settings: &'a EvolutionSettings,
    hooks: &'a dyn EvolutionHooks,
    rng: RandomSource,
    next_id: &'a mut u64,
    mutation_events: usize,
    crossover_events: usize,
}

impl Breeder<'_> {
    fn fresh_id(&mut self) -> String {
        *self.next_id += 1;
        format!("ind-{:04}", self.next_id)
    }

    fn record_mutations(&mut self, individual: &mut PopulationIndividual, events: usize) {
        individual.mutations = events;
        self.mutation_events += events;
        if events > 0 {
            self.hooks.on_mutation_applied(&individual.id, events);
        }
    }

    /// Fill the population round-robin from the seed pool, each clone
    /// mutated at half the configured rate
    fn initialize(&mut self, seed_pool: &[GeneticStrategyConfig]) -> Vec<PopulationIndividual> {
        let options = MutationOptions::new(self.settings.mutation_rate / 2.0);
        let mut population = Vec::with_capacity(self.settings.population_size);

        for slot in 0..self.settings.population_size {
            let seed = &seed_pool[slot % seed_pool.len()];
            let (genome, events) = mutate_genome_counted(&seed.genome, &options, &mut self.rng);
            let config = GeneticStrategyConfig {
                genome,
                ..seed.clone()
            };
            let mut individual = PopulationIndividual::new(self.fresh_id(), config, 0, Origin::Seed);
            self.record_mutations(&mut individual, events);
            population.push(individual);
        }

        population
    }

    fn next_generation(&mut self, population: Vec<PopulationIndividual>, generation: usize) -> Vec<PopulationIndividual> {
        let size = self.settings.population_size;

        let mut ranked = population;
        ranked.sort_by(|a, b| b.sort_key().total_cmp(&a.sort_key()));
        let fitness: Vec<f64> = ranked.iter().map(PopulationIndividual::sort_key).collect();

        let mut next = Vec::with_capacity(size);

        for parent in ranked.iter().take(self.settings.elitism_count.min(size)) {
            let mut elite = PopulationIndividual::new(self.fresh_id(), parent.config.clone(), generation, Origin::Elite);
            elite.parent_ids = vec![parent.id.clone()];
            next.push(elite);
        }

        let mutation = MutationOptions::new(self.settings.mutation_rate);
        while next.len() < size {
            let Some((a, b)) = select_parents(
                self.settings.selection_method,
                &fitness,
                self.settings.tournament_size,
                &mut self.rng,
            ) else {
                break;
            };
            let (first, second) = (&ranked[a], &ranked[b]);

            let (left, right) = if next_unit(&mut self.rng) < self.settings.crossover_rate {
                self.crossover_events += 1;
                self.hooks.on_crossover_applied(&first.id, &second.id);
                single_point_crossover(first.genome(), second.genome(), &mut self.rng)
            } else {
                (first.genome().to_vec(), second.genome().to_vec())
            };

            // Surplus children of the last pair are dropped
            for (genome, parents) in [(left, [first, second]), (right, [second, first])] {
                if next.len() >= size {
                    break;
                }
                let (genome, events) = mutate_genome_counted(&genome, &mutation, &mut self.rng);
                let config = GeneticStrategyConfig::new(genome_name(&genome), genome)
                    .with_description(format!("Bred from {} and {}", parents[0].name(), parents[1].name()));
                let mut child = PopulationIndividual::new(self.fresh_id(), config, generation, Origin::Offspring);
                child.parent_ids = parents.iter().map(|p| p.id.clone()).collect();
                self.record_mutations(&mut child, events);
                next.push(child);
            }
        }

        next
    }
}

fn warn_degenerate_settings(settings: &EvolutionSettings) {
    if settings.elitism_count >= settings.population_size {
        tracing::warn!(
            "elitism count {} fills the population of {}; no offspring will be bred",
            settings.elitism_count,
            settings.population_size
        );
    }
    if settings.selection_method == SelectionMethod::Tournament {
        let effective = clamp_tournament_size(settings.tournament_size, settings.population_size);
        if effective != settings.tournament_size {
            tracing::warn!(
                "tournament size {} clamped to {} for population {}",
                settings.tournament_size,
                effective,
                settings.population_size
            );
        }
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::{Gene, GeneCondition};
    use crate::presets::default_seed_pool;
    use dilemma_core::strategies::{AlwaysCooperate, AlwaysDefect, TitForTat};
    use dilemma_core::{Move, Seed};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    fn opponents() -> Vec<SharedStrategy> {
        vec![Arc::new(AlwaysCooperate), Arc::new(AlwaysDefect), Arc::new(TitForTat)]
    }

    fn small_settings() -> EvolutionSettings {
        EvolutionSettings {
            population_size: 6,
            generations: 3,
            rounds_per_match: 5,
            seed: Some(Seed::Text("seed-42".into())),
            ..Default::default()
        }
    }

    /// Counts defecting genes; rewards aggressive genomes
    fn defect_count(individual: &PopulationIndividual) -> f64 {
        individual
            .genome()
            .iter()
            .filter(|g| g.response == Move::Defect)
            .count() as f64
    }

    #[derive(Default)]
    struct Recorded {
        starts: Vec<usize>,
        completes: Vec<usize>,
        mutations: usize,
        crossovers: usize,
    }

    #[derive(Clone, Default)]
    struct RecordingHooks(Rc<RefCell<Recorded>>);

    impl EvolutionHooks for RecordingHooks {
        fn on_generation_start(&self, generation: usize) {
            self.0.borrow_mut().starts.push(generation);
        }
        fn on_generation_complete(&self, snapshot: &GenerationSnapshot) {
            self.0.borrow_mut().completes.push(snapshot.generation);
        }
        fn on_mutation_applied(&self, _individual_id: &str, events: usize) {
            self.0.borrow_mut().mutations += events;
        }
        fn on_crossover_applied(&self, _first_parent: &str, _second_parent: &str) {
            self.0.borrow_mut().crossovers += 1;
        }
    }

    #[test]
    fn test_setup_errors() {
        let err = EvolutionEngine::new(small_settings(), Vec::new(), opponents()).unwrap_err();
        assert_eq!(err, EvolutionError::EmptySeedPool);

        let err = create_basic_evolution_engine(EngineOptions {
            settings: small_settings(),
            seed_pool: default_seed_pool(),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err, EvolutionError::EmptyOpponents);
    }

    #[test]
    fn test_runs_exact_generation_count() {
        let mut engine = EvolutionEngine::new(small_settings(), default_seed_pool(), opponents())
            .unwrap()
            .with_fitness(defect_count);
        let summary = engine.run().unwrap();

        assert_eq!(summary.history.len(), 3);
        assert_eq!(summary.final_population.len(), 6);
        assert!(summary.final_population.iter().all(|ind| ind.generation == 2));
        assert!(summary.final_population.iter().all(|ind| ind.fitness.is_some()));
        assert!(summary.runtime.is_none());
    }

    #[test]
    fn test_initialization_cycles_seed_pool() {
        let pool = default_seed_pool();
        let settings = EvolutionSettings {
            population_size: pool.len() * 2,
            generations: 1,
            mutation_rate: 0.0,
            ..small_settings()
        };
        let mut engine = EvolutionEngine::new(settings, pool.clone(), opponents())
            .unwrap()
            .with_fitness(|_: &PopulationIndividual| 1.0);
        let summary = engine.run().unwrap();

        for (slot, individual) in summary.final_population.iter().enumerate() {
            let seed = &pool[slot % pool.len()];
            assert_eq!(individual.name(), seed.name);
            assert_eq!(individual.genome(), seed.genome.as_slice());
            assert_eq!(individual.origin, Origin::Seed);
        }
    }

    #[test]
    fn test_seeded_runs_are_identical() {
        let run = || {
            let mut engine = EvolutionEngine::new(small_settings(), default_seed_pool(), opponents()).unwrap();
            engine.run().unwrap()
        };
        let first = run();
        let second = run();

        assert_eq!(first.final_population, second.final_population);
        assert_eq!(first.best_individual, second.best_individual);
        assert_eq!(first.fitness_curve(), second.fitness_curve());
    }

    #[test]
    fn test_parallel_evaluation_matches_sequential() {
        let sequential = EvolutionEngine::new(small_settings(), default_seed_pool(), opponents())
            .unwrap()
            .run()
            .unwrap();
        let parallel_settings = EvolutionSettings {
            parallel_evaluation: true,
            ..small_settings()
        };
        let parallel = EvolutionEngine::new(parallel_settings, default_seed_pool(), opponents())
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(sequential.final_population, parallel.final_population);
    }

    #[test]
    fn test_population_of_one_with_large_tournament() {
        let settings = EvolutionSettings {
            population_size: 1,
            tournament_size: 6,
            elitism_count: 0,
            generations: 3,
            ..small_settings()
        };
        let mut engine = EvolutionEngine::new(settings, default_seed_pool(), opponents())
            .unwrap()
            .with_fitness(defect_count);
        let summary = engine.run().unwrap();

        assert_eq!(summary.history.len(), 3);
        assert_eq!(summary.final_population.len(), 1);
    }

    #[test]
    fn test_nan_fitness_is_tolerated() {
        let mut engine = EvolutionEngine::new(small_settings(), default_seed_pool(), opponents()).unwrap();
        let evaluator = |ind: &PopulationIndividual| {
            if ind.id.ends_with('1') || ind.id.ends_with('3') {
                f64::NAN
            } else {
                defect_count(ind)
            }
        };
        let summary = engine
            .run_with(RunOptions {
                evaluator: Some(&evaluator),
                initial_population: None,
            })
            .unwrap();

        for snapshot in &summary.history {
            assert!(snapshot.metrics.evaluated <= 6);
            if let Some(avg) = snapshot.metrics.average_fitness {
                assert!(avg.is_finite());
            }
        }
        let best = summary.best_fitness().unwrap();
        assert!(!best.is_nan());
    }

    #[test]
    fn test_best_ever_prefers_earliest() {
        let mut engine = EvolutionEngine::new(small_settings(), default_seed_pool(), opponents())
            .unwrap()
            .with_fitness(|_: &PopulationIndividual| 5.0);
        let summary = engine.run().unwrap();

        let best = summary.best_individual.unwrap();
        assert_eq!(best.id, summary.history[0].population[0].id);
    }

    #[test]
    fn test_elites_carry_over() {
        let settings = EvolutionSettings {
            elitism_count: 1,
            ..small_settings()
        };
        let mut engine = EvolutionEngine::new(settings, default_seed_pool(), opponents())
            .unwrap()
            .with_fitness(defect_count);
        let summary = engine.run().unwrap();

        for pair in summary.history.windows(2) {
            let best = pair[0].best_individual.as_ref().unwrap();
            let elite = &pair[1].population[0];
            assert_eq!(elite.origin, Origin::Elite);
            assert_eq!(pair[0].best_individual_id(), Some(best.id.as_str()));
            assert_eq!(elite.parent_ids, vec![best.id.clone()]);
            assert_eq!(elite.genome(), best.genome());
            assert_ne!(elite.id, best.id);
        }
    }

    #[test]
    fn test_elitism_filling_population_breeds_nothing() {
        let settings = EvolutionSettings {
            elitism_count: 10,
            ..small_settings()
        };
        let mut engine = EvolutionEngine::new(settings, default_seed_pool(), opponents())
            .unwrap()
            .with_fitness(defect_count);
        let summary = engine.run().unwrap();

        assert!(summary.final_population.iter().all(|ind| ind.origin == Origin::Elite));
        assert_eq!(summary.history.last().unwrap().metrics.crossover_events, 0);
    }

    #[test]
    fn test_hooks_observe_run() {
        let hooks = RecordingHooks::default();
        let settings = EvolutionSettings {
            crossover_rate: 1.0,
            mutation_rate: 0.5,
            ..small_settings()
        };
        let mut engine = create_basic_evolution_engine(EngineOptions {
            settings,
            seed_pool: default_seed_pool(),
            opponents: opponents(),
            hooks: Some(Box::new(hooks.clone())),
            fitness: Some(Box::new(defect_count)),
        })
        .unwrap();
        let summary = engine.run().unwrap();

        let recorded = hooks.0.borrow();
        assert_eq!(recorded.starts, vec![0, 1, 2]);
        assert_eq!(recorded.completes, vec![0, 1, 2]);
        let last = &summary.history.last().unwrap().metrics;
        assert_eq!(recorded.crossovers, last.crossover_events);
        assert!(recorded.crossovers > 0);
        assert_eq!(recorded.mutations, last.mutation_events);
    }

    #[test]
    fn test_supplied_initial_population() {
        let config = GeneticStrategyConfig::new(
            "Provided",
            vec![Gene::new("only", GeneCondition::default(), Move::Defect)],
        );
        let supplied = vec![
            PopulationIndividual::new("given-1", config.clone(), 0, Origin::Supplied),
            PopulationIndividual::new("given-2", config, 0, Origin::Supplied),
        ];
        let settings = EvolutionSettings {
            population_size: 2,
            generations: 1,
            ..small_settings()
        };
        let mut engine = EvolutionEngine::new(settings, default_seed_pool(), opponents()).unwrap();
        let evaluator = defect_count;
        let summary = engine
            .run_with(RunOptions {
                evaluator: Some(&evaluator),
                initial_population: Some(supplied),
            })
            .unwrap();

        assert_eq!(summary.final_population[0].id, "given-1");
        assert_eq!(summary.final_population[0].fitness, Some(1.0));
    }

    #[test]
    fn test_profiling_reports_durations() {
        let settings = small_settings().with_profiling(true);
        let mut engine = EvolutionEngine::new(settings, default_seed_pool(), opponents())
            .unwrap()
            .with_fitness(defect_count);
        let runtime = engine.run().unwrap().runtime.unwrap();
        assert_eq!(runtime.generation_ms.len(), 3);
        assert!(runtime.total_ms >= 0.0);
    }

    #[test]
    fn test_roulette_and_rank_selection_run() {
        for method in [SelectionMethod::RouletteWheel, SelectionMethod::Rank, SelectionMethod::Elitist] {
            let settings = small_settings().with_selection(method);
            let mut engine = EvolutionEngine::new(settings, default_seed_pool(), opponents())
                .unwrap()
                .with_fitness(defect_count);
            let summary = engine.run().unwrap();
            assert_eq!(summary.final_population.len(), 6);
        }
    }
}
