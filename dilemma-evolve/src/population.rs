//! Population members, per-generation metrics and run summaries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::genome::{Gene, GeneticStrategyConfig};
use crate::settings::EvolutionSettings;

/// How an individual entered the population
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    /// Cloned from the seed pool during initialization
    Seed,
    /// Handed to the engine as part of an initial population
    Supplied,
    /// Carried over unchanged from the previous generation
    Elite,
    /// Produced by selection, crossover and mutation
    Offspring,
}

/// One genome in the population
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationIndividual {
    pub id: String,
    pub config: GeneticStrategyConfig,
    /// None until evaluated
    pub fitness: Option<f64>,
    pub parent_ids: Vec<String>,
    /// Generation the individual first appeared in
    pub generation: usize,
    pub origin: Origin,
    /// Gene-field changes applied when this individual was created
    pub mutations: usize,
}

impl PopulationIndividual {
    pub fn new(id: impl Into<String>, config: GeneticStrategyConfig, generation: usize, origin: Origin) -> Self {
        Self {
            id: id.into(),
            config,
            fitness: None,
            parent_ids: Vec::new(),
            generation,
            origin,
            mutations: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn genome(&self) -> &[Gene] {
        &self.config.genome
    }

    /// Fitness for ordering: missing and NaN rank below everything
    pub fn sort_key(&self) -> f64 {
        match self.fitness {
            Some(f) if !f.is_nan() => f,
            _ => f64::NEG_INFINITY,
        }
    }
}

/// Fitness statistics of one evaluated generation
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetrics {
    pub best_fitness: Option<f64>,
    pub average_fitness: Option<f64>,
    pub median_fitness: Option<f64>,
    /// Individuals with a finite fitness
    pub evaluated: usize,
    /// Mutation events since the run started
    pub mutation_events: usize,
    /// Crossover events since the run started
    pub crossover_events: usize,
}

impl GenerationMetrics {
    /// Statistics over finite fitness values only
    pub fn compute(population: &[PopulationIndividual], mutation_events: usize, crossover_events: usize) -> Self {
        let mut values: Vec<f64> = population
            .iter()
            .filter_map(|ind| ind.fitness)
            .filter(|f| f.is_finite())
            .collect();
        values.sort_by(f64::total_cmp);

        let evaluated = values.len();
        let (best, average, median) = if values.is_empty() {
            (None, None, None)
        } else {
            let sum: f64 = values.iter().sum();
            let mid = evaluated / 2;
            let median = if evaluated % 2 == 0 {
                (values[mid - 1] + values[mid]) / 2.0
            } else {
                values[mid]
            };
            (values.last().copied(), Some(sum / evaluated as f64), Some(median))
        };

        Self {
            best_fitness: best,
            average_fitness: average,
            median_fitness: median,
            evaluated,
            mutation_events,
            crossover_events,
        }
    }
}

/// Frozen copy of a generation after evaluation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSnapshot {
    pub generation: usize,
    pub timestamp: DateTime<Utc>,
    pub population: Vec<PopulationIndividual>,
    pub metrics: GenerationMetrics,
    pub best_individual: Option<PopulationIndividual>,
}

impl GenerationSnapshot {
    pub fn best_individual_id(&self) -> Option<&str> {
        self.best_individual.as_ref().map(|ind| ind.id.as_str())
    }
}

/// Wall-clock profile of a run, in milliseconds
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeMetrics {
    pub total_ms: f64,
    pub generation_ms: Vec<f64>,
}

impl RuntimeMetrics {
    pub fn average_generation_ms(&self) -> f64 {
        if self.generation_ms.is_empty() {
            0.0
        } else {
            self.generation_ms.iter().sum::<f64>() / self.generation_ms.len() as f64
        }
    }
}

/// Everything a run produced
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionSummary {
    /// Fittest individual seen in any generation; earliest wins ties
    pub best_individual: Option<PopulationIndividual>,
    /// Last evaluated generation, not reproduced from
    pub final_population: Vec<PopulationIndividual>,
    pub history: Vec<GenerationSnapshot>,
    pub settings: EvolutionSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<RuntimeMetrics>,
}

impl EvolutionSummary {
    pub fn best_fitness(&self) -> Option<f64> {
        self.best_individual.as_ref().and_then(|ind| ind.fitness)
    }

    /// Best fitness of every generation, in order
    pub fn fitness_curve(&self) -> Vec<Option<f64>> {
        self.history.iter().map(|s| s.metrics.best_fitness).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn individual(id: &str, fitness: Option<f64>) -> PopulationIndividual {
        let mut ind = PopulationIndividual::new(id, GeneticStrategyConfig::new(id, Vec::new()), 0, Origin::Seed);
        ind.fitness = fitness;
        ind
    }

    #[test]
    fn test_metrics_skip_missing_and_nan() {
        let population = vec![
            individual("a", Some(4.0)),
            individual("b", None),
            individual("c", Some(f64::NAN)),
            individual("d", Some(1.0)),
            individual("e", Some(7.0)),
        ];
        let metrics = GenerationMetrics::compute(&population, 3, 1);
        assert_eq!(metrics.evaluated, 3);
        assert_eq!(metrics.best_fitness, Some(7.0));
        assert_eq!(metrics.average_fitness, Some(4.0));
        assert_eq!(metrics.median_fitness, Some(4.0));
        assert_eq!(metrics.mutation_events, 3);
    }

    #[test]
    fn test_even_median() {
        let population = vec![individual("a", Some(1.0)), individual("b", Some(3.0))];
        assert_eq!(GenerationMetrics::compute(&population, 0, 0).median_fitness, Some(2.0));
    }

    #[test]
    fn test_metrics_empty() {
        let metrics = GenerationMetrics::compute(&[individual("a", None)], 0, 0);
        assert_eq!(metrics.best_fitness, None);
        assert_eq!(metrics.average_fitness, None);
        assert_eq!(metrics.evaluated, 0);
    }

    #[test]
    fn test_snapshot_best_individual_id() {
        let population = vec![individual("a", Some(1.0)), individual("b", Some(5.0))];
        let mut snapshot = GenerationSnapshot {
            generation: 0,
            timestamp: Utc::now(),
            metrics: GenerationMetrics::compute(&population, 0, 0),
            best_individual: Some(population[1].clone()),
            population,
        };
        assert_eq!(snapshot.best_individual_id(), Some("b"));

        snapshot.best_individual = None;
        assert_eq!(snapshot.best_individual_id(), None);
    }

    #[test]
    fn test_sort_key() {
        assert_eq!(individual("a", Some(2.5)).sort_key(), 2.5);
        assert_eq!(individual("b", None).sort_key(), f64::NEG_INFINITY);
        assert_eq!(individual("c", Some(f64::NAN)).sort_key(), f64::NEG_INFINITY);
    }
}
