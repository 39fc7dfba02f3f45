//! Result aggregation: totals, head-to-head records, dispersion, Elo log

use std::collections::BTreeMap;

use dilemma_core::MatchResult;
use serde::{Deserialize, Serialize};

use crate::config::TieBreaker;
use crate::elo::{process_elo_matches, EloMatch, EloOptions, EloOutcome, EloRatings};

/// Record against one opponent, accumulated over the whole tournament
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadToHeadStats {
    pub matches: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub player_score: f64,
    pub opponent_score: f64,
}

impl HeadToHeadStats {
    /// Player's mean score per match against this opponent
    pub fn average_score(&self) -> f64 {
        if self.matches == 0 {
            0.0
        } else {
            self.player_score / self.matches as f64
        }
    }

    fn record(&mut self, own: f64, opponent: f64) {
        self.matches += 1;
        self.player_score += own;
        self.opponent_score += opponent;
        match EloOutcome::from_scores(own, opponent) {
            EloOutcome::Win => self.wins += 1,
            EloOutcome::Draw => self.draws += 1,
            EloOutcome::Loss => self.losses += 1,
        }
    }
}

/// Finalized head-to-head line
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadToHeadSummary {
    pub opponent: String,
    #[serde(flatten)]
    pub stats: HeadToHeadStats,
    pub average_score: f64,
}

/// Final standing of one strategy
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentResult {
    pub name: String,
    pub total_score: f64,
    pub average_score: f64,
    pub matches_played: u32,
    pub wins: u32,
    /// Population standard deviation of per-match scores
    pub std_deviation: f64,
    /// Sorted by average score, best matchup first
    pub head_to_head: Vec<HeadToHeadSummary>,
    pub elo_rating: Option<f64>,
}

impl TournamentResult {
    /// Share of matches won
    pub fn win_rate(&self) -> f64 {
        if self.matches_played == 0 {
            0.0
        } else {
            self.wins as f64 / self.matches_played as f64
        }
    }
}

/// One opponent met, with the result from this entry's side
#[derive(Clone, Copy, Debug)]
pub(crate) struct Encounter {
    pub opponent: usize,
    pub outcome: EloOutcome,
}

/// Mutable per-strategy tally used while the tournament runs
#[derive(Clone, Debug)]
pub(crate) struct Entry {
    pub name: String,
    pub total_score: f64,
    pub matches_played: u32,
    pub wins: u32,
    pub match_scores: Vec<f64>,
    pub head_to_head: BTreeMap<String, HeadToHeadStats>,
    pub encounters: Vec<Encounter>,
    pub byes: u32,
}

impl Entry {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            total_score: 0.0,
            matches_played: 0,
            wins: 0,
            match_scores: Vec::new(),
            head_to_head: BTreeMap::new(),
            encounters: Vec::new(),
            byes: 0,
        }
    }
}

/// Tournament-wide accumulator
#[derive(Clone, Debug)]
pub(crate) struct Ledger {
    pub entries: Vec<Entry>,
    pub elo_log: Vec<EloMatch>,
}

impl Ledger {
    pub fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            entries: names.into_iter().map(Entry::new).collect(),
            elo_log: Vec::new(),
        }
    }

    /// Fold one match between entries `a` (player 1) and `b` (player 2)
    pub fn record_match(&mut self, a: usize, b: usize, result: &MatchResult) {
        let outcome_a = EloOutcome::from_scores(result.player1_score, result.player2_score);

        self.tally(a, b, result.player1_score, result.player2_score, outcome_a);
        self.tally(b, a, result.player2_score, result.player1_score, outcome_a.reversed());

        self.elo_log.push(EloMatch {
            player: self.entries[a].name.clone(),
            opponent: self.entries[b].name.clone(),
            outcome: outcome_a,
        });
    }

    /// A bye counts as a won match with no opponent and no Elo entry
    pub fn record_bye(&mut self, index: usize, score: f64) {
        let entry = &mut self.entries[index];
        entry.total_score += score;
        entry.matches_played += 1;
        entry.wins += 1;
        entry.byes += 1;
        entry.match_scores.push(score);
    }

    fn tally(&mut self, own: usize, other: usize, own_score: f64, other_score: f64, outcome: EloOutcome) {
        let opponent_name = self.entries[other].name.clone();
        let entry = &mut self.entries[own];
        entry.total_score += own_score;
        entry.matches_played += 1;
        if outcome == EloOutcome::Win {
            entry.wins += 1;
        }
        entry.match_scores.push(own_score);
        entry
            .head_to_head
            .entry(opponent_name)
            .or_default()
            .record(own_score, other_score);
        entry.encounters.push(Encounter { opponent: other, outcome });
    }

    /// Tie-break value of every entry from the current totals
    pub fn tie_breaks(&self, tie_breaker: TieBreaker) -> Vec<f64> {
        self.entries
            .iter()
            .map(|entry| match tie_breaker {
                TieBreaker::Buchholz => entry
                    .encounters
                    .iter()
                    .map(|e| self.entries[e.opponent].total_score)
                    .sum(),
                TieBreaker::SonnebornBerger => entry
                    .encounters
                    .iter()
                    .map(|e| self.entries[e.opponent].total_score * e.outcome.actual_score())
                    .sum(),
                TieBreaker::TotalScore => entry.total_score,
            })
            .collect()
    }

    /// Indices ordered by total score, tie-break, wins (all descending),
    /// then name ascending. Leaves no ties.
    pub fn ranking(&self, tie_breaks: &[f64]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.sort_by(|&a, &b| {
            let ea = &self.entries[a];
            let eb = &self.entries[b];
            eb.total_score
                .total_cmp(&ea.total_score)
                .then_with(|| tie_breaks[b].total_cmp(&tie_breaks[a]))
                .then_with(|| eb.wins.cmp(&ea.wins))
                .then_with(|| ea.name.cmp(&eb.name))
        });
        order
    }

    /// Indices ordered by total score only; equal totals keep entry order
    pub fn score_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.sort_by(|&a, &b| {
            self.entries[b]
                .total_score
                .total_cmp(&self.entries[a].total_score)
        });
        order
    }

    /// Averages, dispersion, head-to-head summaries and Elo ratings, in
    /// the given order
    pub fn finalize(&self, order: &[usize], elo: &EloOptions) -> (Vec<TournamentResult>, EloRatings) {
        let ratings = process_elo_matches(&EloRatings::default(), &self.elo_log, elo);

        let results = order
            .iter()
            .map(|&i| {
                let entry = &self.entries[i];
                TournamentResult {
                    name: entry.name.clone(),
                    total_score: entry.total_score,
                    average_score: mean(&entry.match_scores),
                    matches_played: entry.matches_played,
                    wins: entry.wins,
                    std_deviation: population_std_dev(&entry.match_scores),
                    head_to_head: summarize_head_to_head(&entry.head_to_head),
                    elo_rating: Some(ratings.get(&entry.name).copied().unwrap_or(elo.base_rating)),
                }
            })
            .collect();

        (results, ratings)
    }
}

fn summarize_head_to_head(records: &BTreeMap<String, HeadToHeadStats>) -> Vec<HeadToHeadSummary> {
    let mut summaries: Vec<HeadToHeadSummary> = records
        .iter()
        .map(|(opponent, stats)| HeadToHeadSummary {
            opponent: opponent.clone(),
            stats: stats.clone(),
            average_score: stats.average_score(),
        })
        .collect();
    // BTreeMap iteration is name-ordered, so the stable sort keeps names
    // ascending among equal averages
    summaries.sort_by(|a, b| b.average_score.total_cmp(&a.average_score));
    summaries
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Population standard deviation (divides by n)
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
