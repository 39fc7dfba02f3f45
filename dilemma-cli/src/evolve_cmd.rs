//! Evolution command - breed genetic strategies against a fixed pool
//!
//! ## Architecture
//!
//! - run() - orchestration
//! - build_settings(), load_seed_pool() - setup
//! - ProgressHooks - generation progress bar
//! - print_summary(), print_json_results() - reporting

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use dilemma_core::strategies::catalog;
use dilemma_core::Seed;
use dilemma_evolve::{
    create_basic_evolution_engine, default_seed_pool, showcase_tournament, validate_settings, EngineOptions,
    EvolutionHooks, EvolutionSettings, EvolutionSummary, GenerationSnapshot, GeneticStrategyConfig,
    PopulationIndividual, RuntimeMetrics, SelectionMethod,
};
use dilemma_tournament::TournamentOutcome;

use crate::tournament_cmd::{print_standings, resolve_strategies};

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

#[derive(Args)]
pub struct EvolveArgs {
    /// Population size (overrides the settings file)
    #[arg(long)]
    pub population: Option<usize>,

    /// Number of generations to run
    #[arg(long)]
    pub generations: Option<usize>,

    /// Number or text; makes the run reproducible
    #[arg(long)]
    pub seed: Option<Seed>,

    /// EvolutionSettings JSON file
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// JSON list of genetic strategy configs to seed the population from
    #[arg(long, value_name = "FILE")]
    pub seed_pool: Option<PathBuf>,

    /// Comma-separated catalog ids to evaluate against (default: the whole catalog)
    #[arg(long, value_name = "LIST")]
    pub opponents: Option<String>,

    /// Mutation rate (0.0-1.0)
    #[arg(long)]
    pub mutation_rate: Option<f64>,

    /// Crossover rate (0.0-1.0)
    #[arg(long)]
    pub crossover_rate: Option<f64>,

    /// tournament, roulette-wheel, rank or elitist
    #[arg(long)]
    pub selection: Option<SelectionMethod>,

    /// Rounds per fitness match
    #[arg(long)]
    pub rounds: Option<usize>,

    /// Evaluate fitness on all cores
    #[arg(long)]
    pub parallel: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Report wall-clock time per generation
    #[arg(long)]
    pub profile: bool,
}

// ============================================================================
// ORCHESTRATION
// ============================================================================

pub fn run(args: EvolveArgs) -> Result<()> {
    let settings = build_settings(&args)?;
    for issue in validate_settings(&settings) {
        tracing::warn!("Settings issue: {}", issue);
    }

    let seed_pool = match &args.seed_pool {
        Some(path) => load_seed_pool(path)?,
        None => default_seed_pool(),
    };
    let opponents = match args.opponents.as_deref() {
        Some(list) => resolve_strategies(list)?,
        None => catalog(),
    };

    let progress = create_progress_bar(settings.generations as u64, args.json);
    let mut engine = create_basic_evolution_engine(EngineOptions {
        settings,
        seed_pool,
        opponents: opponents.clone(),
        hooks: Some(Box::new(ProgressHooks {
            bar: progress.clone(),
        })),
        fitness: None,
    })
    .context("Failed to set up evolution")?;

    let summary = engine.run().context("Evolution failed")?;
    progress.finish_and_clear();

    let showcase = showcase_tournament(&summary, &opponents, &summary.settings).context("Showcase tournament failed")?;

    if args.json {
        print_json_results(&summary, showcase.as_ref())?;
    } else {
        print_summary(&summary);
        if let Some(outcome) = &showcase {
            print_standings(outcome);
        }
    }

    Ok(())
}

// ============================================================================
// SETUP
// ============================================================================

/// Settings file (or defaults) with command-line flags laid on top
fn build_settings(args: &EvolveArgs) -> Result<EvolutionSettings> {
    let mut settings = match &args.settings {
        Some(path) => load_json::<EvolutionSettings>(path).context("Failed to load settings file")?,
        None => EvolutionSettings::default(),
    };

    if let Some(population) = args.population {
        settings.population_size = population;
    }
    if let Some(generations) = args.generations {
        settings.generations = generations;
    }
    if let Some(seed) = &args.seed {
        settings.seed = Some(seed.clone());
    }
    if let Some(rate) = args.mutation_rate {
        settings.mutation_rate = rate;
    }
    if let Some(rate) = args.crossover_rate {
        settings.crossover_rate = rate;
    }
    if let Some(method) = args.selection {
        settings.selection_method = method;
    }
    if let Some(rounds) = args.rounds {
        settings.rounds_per_match = rounds;
    }
    settings.parallel_evaluation |= args.parallel;
    settings.enable_profiling |= args.profile;

    Ok(settings)
}

fn load_seed_pool(path: &Path) -> Result<Vec<GeneticStrategyConfig>> {
    let pool: Vec<GeneticStrategyConfig> = load_json(path).context("Failed to load seed pool")?;
    tracing::info!("Loaded {} seed genomes from {}", pool.len(), path.display());
    Ok(pool)
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

// ============================================================================
// PROGRESS
// ============================================================================

fn create_progress_bar(generations: u64, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(generations);
    let style = ProgressStyle::default_bar()
        .template("[{bar:40}] gen {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    bar.set_style(style);
    bar
}

struct ProgressHooks {
    bar: ProgressBar,
}

impl EvolutionHooks for ProgressHooks {
    fn on_generation_complete(&self, snapshot: &GenerationSnapshot) {
        if let (Some(best), Some(id)) = (snapshot.metrics.best_fitness, snapshot.best_individual_id()) {
            self.bar.set_message(format!("best={:.1} ({})", best, id));
        }
        self.bar.inc(1);
    }
}

// ============================================================================
// REPORTING
// ============================================================================

fn print_summary(summary: &EvolutionSummary) {
    println!("\n=== Evolution Complete ===");
    println!("Generations: {}", summary.history.len());
    if let Some(last) = summary.history.last() {
        println!(
            "Final avg fitness: {:.2}",
            last.metrics.average_fitness.unwrap_or(f64::NAN)
        );
        println!(
            "Events: {} mutations, {} crossovers",
            last.metrics.mutation_events, last.metrics.crossover_events
        );
    }

    if let Some(best) = &summary.best_individual {
        println!(
            "Best individual: {} ({}), fitness {:.2}, generation {}",
            best.name(),
            best.id,
            best.fitness.unwrap_or(f64::NAN),
            best.generation
        );
        print_genome(best);
    }

    if let Some(runtime) = &summary.runtime {
        println!(
            "Runtime: {:.1} ms total, {:.1} ms per generation",
            runtime.total_ms,
            runtime.average_generation_ms()
        );
    }
}

fn print_genome(individual: &PopulationIndividual) {
    println!("Genome:");
    for gene in individual.genome() {
        let c = &gene.condition;
        let mut conditions = Vec::new();
        if let Some(m) = c.opponent_last_move {
            conditions.push(format!("opponent={}", m));
        }
        if let Some(m) = c.self_last_move {
            conditions.push(format!("self={}", m));
        }
        if let Some(range) = c.round_range {
            conditions.push(format!("rounds {}-{}", range.start, range.end));
        }
        let when = if conditions.is_empty() {
            "always".to_string()
        } else {
            conditions.join(", ")
        };
        let weight = gene.weight.map(|w| format!(" (w={:.2})", w)).unwrap_or_default();
        println!("  {:<20} {:<36} -> {}{}", gene.id, when, gene.response, weight);
    }
}

fn print_json_results(summary: &EvolutionSummary, showcase: Option<&TournamentOutcome>) -> Result<()> {
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct JsonOutput<'a> {
        best_individual: Option<&'a PopulationIndividual>,
        fitness_curve: Vec<Option<f64>>,
        generations_run: usize,
        settings: &'a EvolutionSettings,
        runtime: Option<&'a RuntimeMetrics>,
        showcase: Option<&'a TournamentOutcome>,
    }

    let output = JsonOutput {
        best_individual: summary.best_individual.as_ref(),
        fitness_curve: summary.fitness_curve(),
        generations_run: summary.history.len(),
        settings: &summary.settings,
        runtime: summary.runtime.as_ref(),
        showcase,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
