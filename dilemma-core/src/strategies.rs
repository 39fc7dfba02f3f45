//! Reference strategy catalog
//!
//! Classic hand-written strategies, used as opponent pools and as
//! baselines in tests. Each one only reads the history it is given.

use std::sync::Arc;

use rand::RngCore;

use crate::error::DilemmaError;
use crate::history::GameHistory;
use crate::moves::Move;
use crate::random::next_unit;
use crate::strategy::{SharedStrategy, Strategy};

/// Chance that generous tit-for-tat lets a defection slide
const GENEROUS_FORGIVENESS: f64 = 0.1;

/// Kebab-case ids accepted by [`by_name`], in catalog order
pub const CATALOG_IDS: [&str; 9] = [
    "always-cooperate",
    "always-defect",
    "tit-for-tat",
    "suspicious-tit-for-tat",
    "tit-for-two-tats",
    "grim-trigger",
    "pavlov",
    "random",
    "generous-tit-for-tat",
];

/// Always cooperate, never defect.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysCooperate;

impl Strategy for AlwaysCooperate {
    fn name(&self) -> &str {
        "Always Cooperate"
    }

    fn description(&self) -> &str {
        "Never defects. Always cooperates."
    }

    fn play(&self, _history: &GameHistory, _round: usize, _rng: &mut dyn RngCore) -> Move {
        Move::Cooperate
    }
}

/// Always defect, never cooperate.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysDefect;

impl Strategy for AlwaysDefect {
    fn name(&self) -> &str {
        "Always Defect"
    }

    fn description(&self) -> &str {
        "Never cooperates. Always defects."
    }

    fn play(&self, _history: &GameHistory, _round: usize, _rng: &mut dyn RngCore) -> Move {
        Move::Defect
    }
}

/// Copy opponent's last move. Start with cooperate.
#[derive(Clone, Copy, Debug, Default)]
pub struct TitForTat;

impl Strategy for TitForTat {
    fn name(&self) -> &str {
        "Tit for Tat"
    }

    fn description(&self) -> &str {
        "Copies opponent's last move. Starts by cooperating."
    }

    fn play(&self, history: &GameHistory, _round: usize, _rng: &mut dyn RngCore) -> Move {
        history.last_opponent_move().unwrap_or(Move::Cooperate)
    }
}

/// Tit-for-Tat but start with defect.
#[derive(Clone, Copy, Debug, Default)]
pub struct SuspiciousTitForTat;

impl Strategy for SuspiciousTitForTat {
    fn name(&self) -> &str {
        "Suspicious Tit for Tat"
    }

    fn description(&self) -> &str {
        "Like Tit for Tat, but starts with defect."
    }

    fn play(&self, history: &GameHistory, _round: usize, _rng: &mut dyn RngCore) -> Move {
        history.last_opponent_move().unwrap_or(Move::Defect)
    }
}

/// Defect only if opponent defected twice in a row.
#[derive(Clone, Copy, Debug, Default)]
pub struct TitForTwoTats;

impl Strategy for TitForTwoTats {
    fn name(&self) -> &str {
        "Tit for Two Tats"
    }

    fn description(&self) -> &str {
        "Only retaliates after two consecutive defections."
    }

    fn play(&self, history: &GameHistory, _round: usize, _rng: &mut dyn RngCore) -> Move {
        match history.opponent_moves.as_slice() {
            [.., Move::Defect, Move::Defect] => Move::Defect,
            _ => Move::Cooperate,
        }
    }
}

/// Cooperate until opponent defects once, then always defect.
#[derive(Clone, Copy, Debug, Default)]
pub struct GrimTrigger;

impl Strategy for GrimTrigger {
    fn name(&self) -> &str {
        "Grim Trigger"
    }

    fn description(&self) -> &str {
        "Cooperates until betrayed, then always defects."
    }

    fn play(&self, history: &GameHistory, _round: usize, _rng: &mut dyn RngCore) -> Move {
        if history.opponent_defections() > 0 {
            Move::Defect
        } else {
            Move::Cooperate
        }
    }
}

/// Win-stay, lose-switch.
///
/// Keeps its last move when the opponent cooperated (a good outcome under
/// the classic ordering), switches when the opponent defected.
#[derive(Clone, Copy, Debug, Default)]
pub struct Pavlov;

impl Strategy for Pavlov {
    fn name(&self) -> &str {
        "Pavlov"
    }

    fn description(&self) -> &str {
        "Repeats move if outcome was good, switches if bad."
    }

    fn play(&self, history: &GameHistory, _round: usize, _rng: &mut dyn RngCore) -> Move {
        match (history.last_own_move(), history.last_opponent_move()) {
            (Some(mine), Some(Move::Cooperate)) => mine,
            (Some(mine), Some(Move::Defect)) => mine.flipped(),
            _ => Move::Cooperate,
        }
    }
}

/// Random choice each round, 50/50, from the match stream.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomChoice;

impl Strategy for RandomChoice {
    fn name(&self) -> &str {
        "Random"
    }

    fn description(&self) -> &str {
        "Randomly cooperates or defects each round."
    }

    fn play(&self, _history: &GameHistory, _round: usize, rng: &mut dyn RngCore) -> Move {
        if next_unit(rng) < 0.5 {
            Move::Cooperate
        } else {
            Move::Defect
        }
    }
}

/// Tit-for-tat that occasionally forgives a defection.
#[derive(Clone, Copy, Debug, Default)]
pub struct GenerousTitForTat;

impl Strategy for GenerousTitForTat {
    fn name(&self) -> &str {
        "Generous Tit for Tat"
    }

    fn description(&self) -> &str {
        "Copies opponent's last move, but forgives 10% of defections."
    }

    fn play(&self, history: &GameHistory, _round: usize, rng: &mut dyn RngCore) -> Move {
        match history.last_opponent_move() {
            None | Some(Move::Cooperate) => Move::Cooperate,
            Some(Move::Defect) => {
                if next_unit(rng) < GENEROUS_FORGIVENESS {
                    Move::Cooperate
                } else {
                    Move::Defect
                }
            }
        }
    }
}

/// Every catalog strategy, in [`CATALOG_IDS`] order
pub fn catalog() -> Vec<SharedStrategy> {
    CATALOG_IDS
        .iter()
        .filter_map(|id| by_name(id).ok())
        .collect()
}

/// Resolve a catalog strategy by kebab-case id (display names also work)
pub fn by_name(name: &str) -> Result<SharedStrategy, DilemmaError> {
    let key = name.trim().to_ascii_lowercase().replace([' ', '_'], "-");
    let strategy: SharedStrategy = match key.as_str() {
        "always-cooperate" => Arc::new(AlwaysCooperate),
        "always-defect" => Arc::new(AlwaysDefect),
        "tit-for-tat" => Arc::new(TitForTat),
        "suspicious-tit-for-tat" => Arc::new(SuspiciousTitForTat),
        "tit-for-two-tats" => Arc::new(TitForTwoTats),
        "grim-trigger" => Arc::new(GrimTrigger),
        "pavlov" => Arc::new(Pavlov),
        "random" => Arc::new(RandomChoice),
        "generous-tit-for-tat" => Arc::new(GenerousTitForTat),
        _ => return Err(DilemmaError::UnknownStrategy(name.to_string())),
    };
    Ok(strategy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{FixedRandom, RandomSource, Seed};

    fn make_rng() -> RandomSource {
        RandomSource::seeded(&Seed::Number(42))
    }

    fn history(own: &[Move], opponent: &[Move]) -> GameHistory {
        GameHistory::from_moves(own, opponent)
    }

    #[test]
    fn test_tit_for_tat_first_move() {
        let mut rng = make_rng();
        assert_eq!(TitForTat.play(&GameHistory::default(), 0, &mut rng), Move::Cooperate);
    }

    #[test]
    fn test_tit_for_tat_copies() {
        let mut rng = make_rng();
        let h = history(&[Move::Cooperate], &[Move::Defect]);
        assert_eq!(TitForTat.play(&h, 1, &mut rng), Move::Defect);

        let h = history(&[Move::Defect], &[Move::Cooperate]);
        assert_eq!(TitForTat.play(&h, 1, &mut rng), Move::Cooperate);
    }

    #[test]
    fn test_suspicious_tft_starts_defect() {
        let mut rng = make_rng();
        assert_eq!(SuspiciousTitForTat.play(&GameHistory::default(), 0, &mut rng), Move::Defect);
    }

    #[test]
    fn test_tit_for_two_tats() {
        let mut rng = make_rng();
        let single = history(&[Move::Cooperate; 2], &[Move::Cooperate, Move::Defect]);
        assert_eq!(TitForTwoTats.play(&single, 2, &mut rng), Move::Cooperate);

        let double = history(&[Move::Cooperate; 2], &[Move::Defect, Move::Defect]);
        assert_eq!(TitForTwoTats.play(&double, 2, &mut rng), Move::Defect);
    }

    #[test]
    fn test_grim_trigger() {
        let mut rng = make_rng();
        let calm = history(&[Move::Cooperate; 2], &[Move::Cooperate; 2]);
        assert_eq!(GrimTrigger.play(&calm, 2, &mut rng), Move::Cooperate);

        let betrayed = history(&[Move::Cooperate; 3], &[Move::Defect, Move::Cooperate, Move::Cooperate]);
        assert_eq!(GrimTrigger.play(&betrayed, 3, &mut rng), Move::Defect);
    }

    #[test]
    fn test_pavlov_win_stay_lose_switch() {
        let mut rng = make_rng();
        assert_eq!(Pavlov.play(&GameHistory::default(), 0, &mut rng), Move::Cooperate);

        // Both cooperated: stay
        let h = history(&[Move::Cooperate], &[Move::Cooperate]);
        assert_eq!(Pavlov.play(&h, 1, &mut rng), Move::Cooperate);

        // We defected, they cooperated: stay with defect
        let h = history(&[Move::Defect], &[Move::Cooperate]);
        assert_eq!(Pavlov.play(&h, 1, &mut rng), Move::Defect);

        // Both defected: switch to cooperate
        let h = history(&[Move::Defect], &[Move::Defect]);
        assert_eq!(Pavlov.play(&h, 1, &mut rng), Move::Cooperate);
    }

    #[test]
    fn test_random_uses_injected_source() {
        let mut low = FixedRandom::new(0.1);
        let mut high = FixedRandom::new(0.9);
        assert_eq!(RandomChoice.play(&GameHistory::default(), 0, &mut low), Move::Cooperate);
        assert_eq!(RandomChoice.play(&GameHistory::default(), 0, &mut high), Move::Defect);
    }

    #[test]
    fn test_generous_forgives_on_low_draw() {
        let h = history(&[Move::Cooperate], &[Move::Defect]);
        let mut low = FixedRandom::new(0.05);
        let mut high = FixedRandom::new(0.5);
        assert_eq!(GenerousTitForTat.play(&h, 1, &mut low), Move::Cooperate);
        assert_eq!(GenerousTitForTat.play(&h, 1, &mut high), Move::Defect);
    }

    #[test]
    fn test_catalog_complete() {
        let all = catalog();
        assert_eq!(all.len(), CATALOG_IDS.len());
        assert_eq!(all[2].name(), "Tit for Tat");
    }

    #[test]
    fn test_by_name_accepts_display_names() {
        assert_eq!(by_name("Grim Trigger").unwrap().name(), "Grim Trigger");
        assert_eq!(by_name("tit_for_tat").unwrap().name(), "Tit for Tat");
        assert_eq!(
            by_name("nobody").unwrap_err(),
            DilemmaError::UnknownStrategy("nobody".to_string())
        );
    }
}
