//! Fitness evaluation for evolution
//!
//! The default evaluator drops an individual into a tournament with the
//! fixed opponent pool and scores it by its total. Anything implementing
//! [`FitnessEvaluator`] can replace it, including plain closures.

use dilemma_core::{PayoffMatrix, Seed, SharedStrategy};
use dilemma_tournament::{Tournament, TournamentFormat, TournamentOutcome};

use crate::error::EvolutionError;
use crate::genome::create_genetic_strategy;
use crate::population::{EvolutionSummary, PopulationIndividual};
use crate::settings::EvolutionSettings;

/// Scores one individual; higher is better. NaN is tolerated and treated
/// as unevaluated.
pub trait FitnessEvaluator {
    fn evaluate(&self, individual: &PopulationIndividual) -> Result<f64, EvolutionError>;
}

impl<F> FitnessEvaluator for F
where
    F: Fn(&PopulationIndividual) -> f64,
{
    fn evaluate(&self, individual: &PopulationIndividual) -> Result<f64, EvolutionError> {
        Ok(self(individual))
    }
}

/// Default evaluator: total tournament score against the opponent pool
#[derive(Clone, Debug)]
pub struct TournamentFitness {
    opponents: Vec<SharedStrategy>,
    format: TournamentFormat,
    rounds_per_match: usize,
    error_rate: f64,
    payoffs: PayoffMatrix,
    seed: Option<Seed>,
}

impl TournamentFitness {
    pub fn new(settings: &EvolutionSettings, opponents: Vec<SharedStrategy>) -> Self {
        Self {
            opponents,
            format: settings.tournament_format,
            rounds_per_match: settings.rounds_per_match,
            error_rate: settings.error_rate,
            payoffs: settings.payoff_matrix,
            seed: settings.seed.clone(),
        }
    }

    pub fn opponents(&self) -> &[SharedStrategy] {
        &self.opponents
    }
}

impl FitnessEvaluator for TournamentFitness {
    fn evaluate(&self, individual: &PopulationIndividual) -> Result<f64, EvolutionError> {
        // Entered under its id so it cannot collide with an opponent name
        let mut config = individual.config.clone();
        config.name = individual.id.clone();

        let mut strategies = Vec::with_capacity(self.opponents.len() + 1);
        strategies.push(create_genetic_strategy(config));
        strategies.extend(self.opponents.iter().cloned());

        // Every evaluation starts its own stream from the run seed
        let outcome = Tournament::run_with_format(
            self.format,
            &strategies,
            self.rounds_per_match,
            self.error_rate,
            &self.payoffs,
            self.seed.as_ref(),
        )?;

        Ok(outcome
            .result_for(&individual.id)
            .map(|result| result.total_score)
            .unwrap_or(f64::NAN))
    }
}

/// Run the best individual of a finished evolution against the opponent
/// pool under the run's settings.
///
/// # Returns
/// None when no individual was ever evaluated
pub fn showcase_tournament(
    summary: &EvolutionSummary,
    opponents: &[SharedStrategy],
    settings: &EvolutionSettings,
) -> Result<Option<TournamentOutcome>, EvolutionError> {
    let Some(best) = summary.best_individual.as_ref() else {
        return Ok(None);
    };
    if opponents.is_empty() {
        return Err(EvolutionError::EmptyOpponents);
    }

    let mut strategies = Vec::with_capacity(opponents.len() + 1);
    strategies.push(create_genetic_strategy(best.config.clone()));
    strategies.extend(opponents.iter().cloned());

    let outcome = Tournament::run_with_format(
        settings.tournament_format,
        &strategies,
        settings.rounds_per_match,
        settings.error_rate,
        &settings.payoff_matrix,
        settings.seed.as_ref(),
    )?;
    Ok(Some(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::{Gene, GeneCondition, GeneticStrategyConfig};
    use crate::population::Origin;
    use dilemma_core::strategies::{AlwaysCooperate, AlwaysDefect};
    use dilemma_core::Move;
    use std::sync::Arc;

    fn constant(name: &str, response: Move) -> PopulationIndividual {
        let config = GeneticStrategyConfig::new(
            name,
            vec![Gene::new("always", GeneCondition::default(), response)],
        );
        PopulationIndividual::new("ind-1", config, 0, Origin::Seed)
    }

    fn settings() -> EvolutionSettings {
        EvolutionSettings {
            rounds_per_match: 4,
            ..Default::default()
        }
    }

    #[test]
    fn test_tournament_fitness_total_score() {
        let opponents: Vec<SharedStrategy> = vec![Arc::new(AlwaysCooperate), Arc::new(AlwaysDefect)];
        let fitness = TournamentFitness::new(&settings(), opponents);

        // Defector: 4 * 5 against the cooperator, 4 * 1 against the defector
        let defector = constant("Defector", Move::Defect);
        assert_eq!(fitness.evaluate(&defector).unwrap(), 24.0);

        // Cooperator: 4 * 3 + 4 * 0
        let cooperator = constant("Cooperator", Move::Cooperate);
        assert_eq!(fitness.evaluate(&cooperator).unwrap(), 12.0);
    }

    #[test]
    fn test_closure_evaluator() {
        let evaluator = |ind: &PopulationIndividual| ind.genome().len() as f64;
        assert_eq!(evaluator.evaluate(&constant("x", Move::Defect)).unwrap(), 1.0);
    }

    #[test]
    fn test_showcase_without_best() {
        let summary = EvolutionSummary {
            best_individual: None,
            final_population: Vec::new(),
            history: Vec::new(),
            settings: settings(),
            runtime: None,
        };
        let opponents: Vec<SharedStrategy> = vec![Arc::new(AlwaysCooperate)];
        assert_eq!(showcase_tournament(&summary, &opponents, &settings()).unwrap(), None);
    }

    #[test]
    fn test_showcase_runs_best_by_name() {
        let mut best = constant("Champion", Move::Defect);
        best.fitness = Some(10.0);
        let summary = EvolutionSummary {
            best_individual: Some(best),
            final_population: Vec::new(),
            history: Vec::new(),
            settings: settings(),
            runtime: None,
        };
        let opponents: Vec<SharedStrategy> = vec![Arc::new(AlwaysCooperate)];

        let outcome = showcase_tournament(&summary, &opponents, &settings()).unwrap().unwrap();
        assert_eq!(outcome.winner().map(|r| r.name.as_str()), Some("Champion"));
    }
}
