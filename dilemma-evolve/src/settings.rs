//! Evolution settings and the advisory validator

use dilemma_core::{PayoffMatrix, Seed};
use dilemma_tournament::TournamentFormat;
use serde::{Deserialize, Serialize};

use crate::selection::SelectionMethod;

/// Parameters of one evolution run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EvolutionSettings {
    pub population_size: usize,
    pub generations: usize,
    pub mutation_rate: f64,
    pub crossover_rate: f64,
    /// Individuals copied unchanged into each next generation
    pub elitism_count: usize,
    pub selection_method: SelectionMethod,
    /// Only used by tournament selection
    pub tournament_size: usize,
    pub rounds_per_match: usize,
    pub error_rate: f64,
    pub payoff_matrix: PayoffMatrix,
    /// Format of the fitness tournament
    pub tournament_format: TournamentFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<Seed>,
    /// Run the default fitness evaluator on rayon's pool
    pub parallel_evaluation: bool,
    /// Record wall-clock durations in the summary
    pub enable_profiling: bool,
}

impl Default for EvolutionSettings {
    fn default() -> Self {
        Self {
            population_size: 20,
            generations: 10,
            mutation_rate: 0.1,
            crossover_rate: 0.7,
            elitism_count: 2,
            selection_method: SelectionMethod::Tournament,
            tournament_size: 3,
            rounds_per_match: 10,
            error_rate: 0.0,
            payoff_matrix: PayoffMatrix::default(),
            tournament_format: TournamentFormat::SingleRoundRobin,
            seed: None,
            parallel_evaluation: false,
            enable_profiling: false,
        }
    }
}

impl EvolutionSettings {
    pub fn with_population(mut self, population_size: usize) -> Self {
        self.population_size = population_size;
        self
    }

    pub fn with_seed(mut self, seed: impl Into<Seed>) -> Self {
        self.seed = Some(seed.into());
        self
    }

    pub fn with_selection(mut self, method: SelectionMethod) -> Self {
        self.selection_method = method;
        self
    }

    pub fn with_profiling(mut self, enabled: bool) -> Self {
        self.enable_profiling = enabled;
        self
    }
}

/// One advisory problem found in a settings object
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsIssue {
    pub field: String,
    pub message: String,
}

impl SettingsIssue {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SettingsIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check settings for inconsistencies. The engine never calls this and
/// runs whatever it is given; callers decide what to do with the issues.
pub fn validate_settings(settings: &EvolutionSettings) -> Vec<SettingsIssue> {
    let mut issues = Vec::new();

    if settings.population_size < 2 {
        issues.push(SettingsIssue::new(
            "populationSize",
            format!("must be at least 2, got {}", settings.population_size),
        ));
    }
    if settings.generations == 0 {
        issues.push(SettingsIssue::new("generations", "must be at least 1"));
    }
    if settings.elitism_count >= settings.population_size {
        issues.push(SettingsIssue::new(
            "elitismCount",
            format!(
                "{} leaves no room for offspring in a population of {}",
                settings.elitism_count, settings.population_size
            ),
        ));
    }

    for (field, rate) in [
        ("mutationRate", settings.mutation_rate),
        ("crossoverRate", settings.crossover_rate),
        ("errorRate", settings.error_rate),
    ] {
        if !(0.0..=1.0).contains(&rate) {
            issues.push(SettingsIssue::new(field, format!("must be within [0, 1], got {}", rate)));
        }
    }

    if settings.selection_method == SelectionMethod::Tournament
        && (settings.tournament_size < 2 || settings.tournament_size > settings.population_size)
    {
        issues.push(SettingsIssue::new(
            "tournamentSize",
            format!(
                "must be within [2, {}], got {}",
                settings.population_size, settings.tournament_size
            ),
        ));
    }

    if settings.rounds_per_match == 0 {
        issues.push(SettingsIssue::new("roundsPerMatch", "must be at least 1"));
    }

    issues
}
