//! Hand-written genomes used to seed a population

use dilemma_core::Move;

use crate::genome::{Gene, GeneCondition, GeneticStrategyConfig, Genome, RoundRange};

fn opening(response: Move) -> Gene {
    Gene::new(
        "opening",
        GeneCondition {
            round_range: Some(RoundRange::new(1, 1)),
            ..Default::default()
        },
        response,
    )
}

fn after_opponent(id: &str, last: Move, response: Move) -> Gene {
    Gene::new(
        id,
        GeneCondition {
            opponent_last_move: Some(last),
            ..Default::default()
        },
        response,
    )
}

/// Cooperate first, then mirror the opponent
pub fn tit_for_tat_genome() -> Genome {
    vec![
        opening(Move::Cooperate),
        after_opponent("mirror-cooperate", Move::Cooperate, Move::Cooperate),
        after_opponent("mirror-defect", Move::Defect, Move::Defect),
    ]
}

/// Cooperate until betrayed, then keep defecting. The own-move gene keeps
/// the grudge alive once retaliation has started.
pub fn grim_genome() -> Genome {
    vec![
        opening(Move::Cooperate),
        Gene::new(
            "stay-friendly",
            GeneCondition {
                opponent_last_move: Some(Move::Cooperate),
                self_last_move: Some(Move::Cooperate),
                round_range: None,
            },
            Move::Cooperate,
        ),
        after_opponent("retaliate", Move::Defect, Move::Defect),
        Gene::new(
            "hold-grudge",
            GeneCondition {
                self_last_move: Some(Move::Defect),
                ..Default::default()
            },
            Move::Defect,
        )
        .with_weight(3.0),
    ]
}

pub fn always_defect_genome() -> Genome {
    vec![Gene::new("defect", GeneCondition::default(), Move::Defect)]
}

/// Unconditional genes weighted 3:1 toward cooperation
pub fn probabilistic_cooperator_genome() -> Genome {
    vec![
        Gene::new("lean-cooperate", GeneCondition::default(), Move::Cooperate).with_weight(3.0),
        Gene::new("occasional-defect", GeneCondition::default(), Move::Defect).with_weight(1.0),
    ]
}

/// The presets as named strategy configs
pub fn default_seed_pool() -> Vec<GeneticStrategyConfig> {
    vec![
        GeneticStrategyConfig::new("Genetic Tit for Tat", tit_for_tat_genome())
            .with_description("Opens with cooperation and mirrors the last opponent move"),
        GeneticStrategyConfig::new("Genetic Grim", grim_genome())
            .with_description("Cooperates until betrayed, then holds a grudge"),
        GeneticStrategyConfig::new("Genetic Defector", always_defect_genome())
            .with_description("Defects every round"),
        GeneticStrategyConfig::new("Genetic Optimist", probabilistic_cooperator_genome())
            .with_description("Cooperates three times out of four"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::GeneticStrategy;
    use dilemma_core::strategies::{AlwaysDefect, TitForTat};
    use dilemma_core::{play_match, PayoffMatrix, RandomSource, Seed, Strategy};

    fn play_against(genome: Genome, opponent: &dyn Strategy, rounds: usize) -> dilemma_core::MatchResult {
        let strategy = GeneticStrategy::new(GeneticStrategyConfig::new("Preset", genome));
        let mut rng = RandomSource::seeded(&Seed::Number(3));
        play_match(&strategy, opponent, rounds, 0.0, &PayoffMatrix::default(), &mut rng)
    }

    #[test]
    fn test_tit_for_tat_genome_matches_reference() {
        // Reference TFT: both cooperate throughout
        let result = play_against(tit_for_tat_genome(), &TitForTat, 6);
        assert_eq!(result.player1_score, 18.0);
        assert_eq!(result.player2_score, 18.0);

        // Against a defector: sucker once, then mutual defection
        let result = play_against(tit_for_tat_genome(), &AlwaysDefect, 4);
        assert_eq!(result.player1_score, 3.0);
        assert_eq!(result.player2_score, 8.0);
    }

    #[test]
    fn test_grim_never_forgives() {
        let result = play_against(grim_genome(), &AlwaysDefect, 5);
        // Round 1 cooperates, rounds 2-5 defect
        assert_eq!(result.player1_score, 4.0);
        assert!(result.transcript[1..].iter().all(|r| r.player1_move == Move::Defect));
    }

    #[test]
    fn test_always_defect_genome() {
        let result = play_against(always_defect_genome(), &TitForTat, 3);
        assert_eq!(result.player1_score, 5.0 + 1.0 + 1.0);
    }

    #[test]
    fn test_default_seed_pool() {
        let pool = default_seed_pool();
        assert_eq!(pool.len(), 4);
        assert!(pool.iter().all(|c| !c.genome.is_empty() && !c.description.is_empty()));
    }
}
