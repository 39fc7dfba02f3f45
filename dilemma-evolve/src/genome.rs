//! Rule-based genomes and the strategy built from them
//!
//! A genome is an ordered list of condition -> response genes. Each round
//! the strategy keeps every gene whose condition holds and picks one,
//! weighted, from the match stream.

use std::sync::Arc;

use dilemma_core::{next_unit, GameHistory, Move, SharedStrategy, Strategy};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Weight used when a gene carries none
pub const DEFAULT_GENE_WEIGHT: f64 = 1.0;

/// Inclusive range of 1-based round numbers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRange {
    pub start: usize,
    pub end: usize,
}

impl RoundRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, round_number: usize) -> bool {
        self.start <= round_number && round_number <= self.end
    }
}

/// When a gene applies. Unset fields always match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opponent_last_move: Option<Move>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_last_move: Option<Move>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round_range: Option<RoundRange>,
}

impl GeneCondition {
    /// Last-move conditions look at the previous round only, so they never
    /// match in round 0. `round` is 0-based; ranges are 1-based.
    pub fn matches(&self, history: &GameHistory, round: usize) -> bool {
        if let Some(expected) = self.opponent_last_move {
            if history.last_opponent_move() != Some(expected) {
                return false;
            }
        }
        if let Some(expected) = self.self_last_move {
            if history.last_own_move() != Some(expected) {
                return false;
            }
        }
        if let Some(range) = self.round_range {
            if !range.contains(round + 1) {
                return false;
            }
        }
        true
    }
}

/// One condition -> response rule
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gene {
    pub id: String,
    #[serde(default)]
    pub condition: GeneCondition,
    pub response: Move,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl Gene {
    pub fn new(id: impl Into<String>, condition: GeneCondition, response: Move) -> Self {
        Self {
            id: id.into(),
            condition,
            response,
            weight: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Selection weight; negative or non-finite weights count as zero
    pub fn effective_weight(&self) -> f64 {
        let weight = self.weight.unwrap_or(DEFAULT_GENE_WEIGHT);
        if weight.is_finite() && weight > 0.0 {
            weight
        } else {
            0.0
        }
    }
}

/// Ordered gene list
pub type Genome = Vec<Gene>;

/// Serializable definition of a genetic strategy
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneticStrategyConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub genome: Genome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutation_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crossover_rate: Option<f64>,
}

impl GeneticStrategyConfig {
    pub fn new(name: impl Into<String>, genome: Genome) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            genome,
            mutation_rate: None,
            crossover_rate: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Runtime strategy backed by a genome
#[derive(Clone, Debug)]
pub struct GeneticStrategy {
    config: GeneticStrategyConfig,
}

impl GeneticStrategy {
    pub fn new(config: GeneticStrategyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneticStrategyConfig {
        &self.config
    }

    pub fn genome(&self) -> &[Gene] {
        &self.config.genome
    }
}

impl Strategy for GeneticStrategy {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn description(&self) -> &str {
        &self.config.description
    }

    fn play(&self, history: &GameHistory, round: usize, rng: &mut dyn RngCore) -> Move {
        let matching: Vec<&Gene> = self
            .config
            .genome
            .iter()
            .filter(|gene| gene.condition.matches(history, round))
            .collect();

        select_gene(&matching, rng)
            .map(|gene| gene.response)
            .unwrap_or(Move::Cooperate)
    }
}

/// Build a shareable strategy from its definition
pub fn create_genetic_strategy(config: GeneticStrategyConfig) -> SharedStrategy {
    Arc::new(GeneticStrategy::new(config))
}

/// Weighted pick among matching genes. A single match is taken without a
/// draw; no match yields None.
fn select_gene<'a>(matching: &[&'a Gene], rng: &mut dyn RngCore) -> Option<&'a Gene> {
    match matching {
        [] => None,
        [only] => Some(*only),
        _ => {
            let total: f64 = matching.iter().map(|g| g.effective_weight()).sum();
            let draw = next_unit(rng);
            if total <= 0.0 {
                let index = ((draw * matching.len() as f64) as usize).min(matching.len() - 1);
                return Some(matching[index]);
            }

            let mut remaining = draw * total;
            for gene in matching {
                let weight = gene.effective_weight();
                if remaining < weight {
                    return Some(*gene);
                }
                remaining -= weight;
            }
            matching.last().copied()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dilemma_core::FixedRandom;

    fn when_opponent(m: Move) -> GeneCondition {
        GeneCondition {
            opponent_last_move: Some(m),
            ..Default::default()
        }
    }

    fn tit_for_tat_config() -> GeneticStrategyConfig {
        GeneticStrategyConfig::new(
            "Genetic TFT",
            vec![
                Gene::new("open", GeneCondition { round_range: Some(RoundRange::new(1, 1)), ..Default::default() }, Move::Cooperate),
                Gene::new("nice", when_opponent(Move::Cooperate), Move::Cooperate),
                Gene::new("mean", when_opponent(Move::Defect), Move::Defect),
            ],
        )
    }

    #[test]
    fn test_last_move_conditions_fail_in_first_round() {
        let condition = when_opponent(Move::Cooperate);
        assert!(!condition.matches(&GameHistory::default(), 0));
        let self_condition = GeneCondition {
            self_last_move: Some(Move::Defect),
            ..Default::default()
        };
        assert!(!self_condition.matches(&GameHistory::default(), 0));
    }

    #[test]
    fn test_round_range_is_one_based_inclusive() {
        let condition = GeneCondition {
            round_range: Some(RoundRange::new(2, 3)),
            ..Default::default()
        };
        let empty = GameHistory::default();
        assert!(!condition.matches(&empty, 0));
        assert!(condition.matches(&empty, 1));
        assert!(condition.matches(&empty, 2));
        assert!(!condition.matches(&empty, 3));
    }

    #[test]
    fn test_genetic_tit_for_tat() {
        let strategy = GeneticStrategy::new(tit_for_tat_config());
        let mut rng = FixedRandom::new(0.5);

        assert_eq!(strategy.play(&GameHistory::default(), 0, &mut rng), Move::Cooperate);
        let betrayed = GameHistory::from_moves(&[Move::Cooperate], &[Move::Defect]);
        assert_eq!(strategy.play(&betrayed, 1, &mut rng), Move::Defect);
        let friendly = GameHistory::from_moves(&[Move::Defect], &[Move::Cooperate]);
        assert_eq!(strategy.play(&friendly, 1, &mut rng), Move::Cooperate);
    }

    #[test]
    fn test_no_match_defaults_to_cooperate() {
        let config = GeneticStrategyConfig::new("Picky", vec![Gene::new("late", GeneCondition {
            round_range: Some(RoundRange::new(50, 60)),
            ..Default::default()
        }, Move::Defect)]);
        let strategy = GeneticStrategy::new(config);
        let mut rng = FixedRandom::new(0.0);
        assert_eq!(strategy.play(&GameHistory::default(), 0, &mut rng), Move::Cooperate);

        let empty = GeneticStrategy::new(GeneticStrategyConfig::new("Empty", Vec::new()));
        assert_eq!(empty.play(&GameHistory::default(), 3, &mut rng), Move::Cooperate);
    }

    #[test]
    fn test_weighted_selection() {
        let config = GeneticStrategyConfig::new(
            "Mixed",
            vec![
                Gene::new("c", GeneCondition::default(), Move::Cooperate).with_weight(1.0),
                Gene::new("d", GeneCondition::default(), Move::Defect).with_weight(3.0),
            ],
        );
        let strategy = GeneticStrategy::new(config);
        let empty = GameHistory::default();

        // draw * 4: below 1 picks the first gene, otherwise the second
        assert_eq!(strategy.play(&empty, 0, &mut FixedRandom::new(0.2)), Move::Cooperate);
        assert_eq!(strategy.play(&empty, 0, &mut FixedRandom::new(0.3)), Move::Defect);
        assert_eq!(strategy.play(&empty, 0, &mut FixedRandom::new(0.99)), Move::Defect);
    }

    #[test]
    fn test_effective_weight() {
        let gene = Gene::new("g", GeneCondition::default(), Move::Defect);
        assert_eq!(gene.effective_weight(), 1.0);
        assert_eq!(gene.clone().with_weight(-2.0).effective_weight(), 0.0);
        assert_eq!(gene.with_weight(f64::NAN).effective_weight(), 0.0);
    }

    #[test]
    fn test_config_serde() {
        let json = r#"{
            "name": "Opener",
            "genome": [
                {"id": "g1", "condition": {"roundRange": {"start": 1, "end": 1}}, "response": "DEFECT"},
                {"id": "g2", "response": "COOPERATE", "weight": 2.0}
            ]
        }"#;
        let config: GeneticStrategyConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.genome.len(), 2);
        assert_eq!(config.genome[0].condition.round_range, Some(RoundRange::new(1, 1)));
        assert_eq!(config.genome[1].weight, Some(2.0));
        assert!(config.description.is_empty());

        let strategy = create_genetic_strategy(config);
        assert_eq!(strategy.name(), "Opener");
    }
}
