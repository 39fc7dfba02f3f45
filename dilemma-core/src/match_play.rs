//! Match execution engine

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::history::GameHistory;
use crate::moves::{Move, PayoffMatrix};
use crate::random::next_unit;
use crate::strategy::Strategy;

/// Result of a single round (moves are post-noise)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundRecord {
    pub round: usize,
    pub player1_move: Move,
    pub player2_move: Move,
    pub player1_score: f64,
    pub player2_score: f64,
}

/// Result of a complete match
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub player1: String,
    pub player2: String,
    pub player1_score: f64,
    pub player2_score: f64,
    pub rounds: usize,
    pub transcript: Vec<RoundRecord>,
}

impl MatchResult {
    /// Name of the higher scorer, None on a draw
    pub fn winner(&self) -> Option<&str> {
        if self.player1_score > self.player2_score {
            Some(&self.player1)
        } else if self.player2_score > self.player1_score {
            Some(&self.player2)
        } else {
            None
        }
    }

    pub fn is_draw(&self) -> bool {
        self.player1_score == self.player2_score
    }
}

/// Run a complete match between two strategies.
///
/// # Arguments
/// * `strategy_a` / `strategy_b` - the two players
/// * `rounds` - number of rounds to play
/// * `error_rate` - per-move probability that the enacted move is inverted
/// * `payoffs` - reward table
/// * `rng` - the match's random stream (shared by strategies and noise)
///
/// Each round both strategies choose from histories that only contain
/// earlier rounds; noise is applied afterwards, so a player never sees a
/// flip until the next round.
pub fn play_match(
    strategy_a: &dyn Strategy,
    strategy_b: &dyn Strategy,
    rounds: usize,
    error_rate: f64,
    payoffs: &PayoffMatrix,
    rng: &mut dyn RngCore,
) -> MatchResult {
    let mut history_a = GameHistory::with_capacity(rounds);
    let mut history_b = GameHistory::with_capacity(rounds);
    let mut transcript = Vec::with_capacity(rounds);
    let mut total_a = 0.0;
    let mut total_b = 0.0;

    for round in 0..rounds {
        let mut move_a = strategy_a.play(&history_a, round, rng);
        let mut move_b = strategy_b.play(&history_b, round, rng);

        if error_rate > 0.0 {
            move_a = apply_noise(move_a, error_rate, rng);
            move_b = apply_noise(move_b, error_rate, rng);
        }

        let (score_a, score_b) = payoffs.payoff(move_a, move_b);
        total_a += score_a;
        total_b += score_b;

        history_a.record(move_a, move_b, score_a, score_b);
        history_b.record(move_b, move_a, score_b, score_a);
        transcript.push(RoundRecord {
            round,
            player1_move: move_a,
            player2_move: move_b,
            player1_score: score_a,
            player2_score: score_b,
        });
    }

    tracing::trace!(
        player1 = strategy_a.name(),
        player2 = strategy_b.name(),
        total_a,
        total_b,
        "match complete"
    );

    MatchResult {
        player1: strategy_a.name().to_string(),
        player2: strategy_b.name().to_string(),
        player1_score: total_a,
        player2_score: total_b,
        rounds,
        transcript,
    }
}

fn apply_noise(chosen: Move, error_rate: f64, rng: &mut dyn RngCore) -> Move {
    if next_unit(rng) < error_rate {
        chosen.flipped()
    } else {
        chosen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{FixedRandom, RandomSource, Seed};
    use crate::strategies::{AlwaysCooperate, AlwaysDefect, RandomChoice, TitForTat};

    fn classic_matrix() -> PayoffMatrix {
        PayoffMatrix::new(7.0, 4.0, 2.0, 0.0)
    }

    #[test]
    fn test_cooperate_vs_cooperate() {
        let mut rng = RandomSource::seeded(&Seed::Number(1));
        let result = play_match(&AlwaysCooperate, &AlwaysCooperate, 3, 0.0, &classic_matrix(), &mut rng);

        assert_eq!(result.player1_score, 12.0);
        assert_eq!(result.player2_score, 12.0);
        assert_eq!(result.rounds, 3);
        assert!(result.is_draw());
        assert_eq!(result.winner(), None);
    }

    #[test]
    fn test_defect_vs_cooperate() {
        let mut rng = RandomSource::seeded(&Seed::Number(1));
        let result = play_match(&AlwaysDefect, &AlwaysCooperate, 4, 0.0, &classic_matrix(), &mut rng);

        assert_eq!(result.player1_score, 28.0);
        assert_eq!(result.player2_score, 0.0);
        assert_eq!(result.winner(), Some("Always Defect"));
    }

    #[test]
    fn test_noise_inverts_both_moves() {
        // Draw of 0 is always below the error rate, so every move flips
        let mut rng = FixedRandom::new(0.0);
        let matrix = classic_matrix();
        let result = play_match(&AlwaysCooperate, &AlwaysDefect, 1, 1.0, &matrix, &mut rng);

        assert_eq!(result.player1_score, matrix.temptation);
        assert_eq!(result.player2_score, matrix.sucker);
        assert_eq!(result.transcript[0].player1_move, Move::Defect);
        assert_eq!(result.transcript[0].player2_move, Move::Cooperate);
    }

    #[test]
    fn test_noise_visible_next_round_only() {
        // Tit-for-tat answers the flipped move in round 1, not round 0
        let mut rng = FixedRandom::new(0.0);
        let result = play_match(&TitForTat, &AlwaysCooperate, 2, 1.0, &classic_matrix(), &mut rng);

        // Round 0: TFT chose C -> flipped to D; opponent C -> D
        assert_eq!(result.transcript[0].player1_move, Move::Defect);
        assert_eq!(result.transcript[0].player2_move, Move::Defect);
        // Round 1: TFT saw D, chose D -> flipped to C
        assert_eq!(result.transcript[1].player1_move, Move::Cooperate);
    }

    #[test]
    fn test_tft_vs_always_defect() {
        let mut rng = RandomSource::seeded(&Seed::Number(3));
        let result = play_match(&TitForTat, &AlwaysDefect, 10, 0.0, &PayoffMatrix::default(), &mut rng);

        assert_eq!(result.transcript[0].player1_move, Move::Cooperate);
        for round in result.transcript.iter().skip(1) {
            assert_eq!(round.player1_move, Move::Defect);
            assert_eq!(round.player2_move, Move::Defect);
        }
        assert_eq!(result.player1_score, 9.0);
        assert_eq!(result.player2_score, 14.0);
    }

    #[test]
    fn test_match_determinism() {
        let seed = Seed::from("seed-42");
        let mut rng1 = RandomSource::seeded(&seed);
        let mut rng2 = RandomSource::seeded(&seed);

        let r1 = play_match(&RandomChoice, &TitForTat, 20, 0.1, &PayoffMatrix::default(), &mut rng1);
        let r2 = play_match(&RandomChoice, &TitForTat, 20, 0.1, &PayoffMatrix::default(), &mut rng2);

        assert_eq!(r1, r2);
    }

    #[test]
    fn test_zero_rounds() {
        let mut rng = RandomSource::seeded(&Seed::Number(0));
        let result = play_match(&TitForTat, &TitForTat, 0, 0.5, &PayoffMatrix::default(), &mut rng);
        assert_eq!(result.player1_score, 0.0);
        assert!(result.transcript.is_empty());
    }
}
