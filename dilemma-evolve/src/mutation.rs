//! Mutation operators for genomes
//!
//! Each gene mutates independently. Every field change is one mutation
//! event, which the engine sums into its per-generation metrics.

use dilemma_core::{next_unit, Move};
use rand::RngCore;

use crate::genome::{Gene, GeneCondition, Genome, RoundRange};

/// Step applied when nudging a gene weight
pub const WEIGHT_STEP: f64 = 0.25;

/// Weights never drop below this after a nudge
pub const MIN_WEIGHT: f64 = 0.1;

/// Configuration for mutation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MutationOptions {
    /// Per-gene, per-field probability of change
    pub mutation_rate: f64,
}

impl MutationOptions {
    pub fn new(mutation_rate: f64) -> Self {
        Self { mutation_rate }
    }
}

/// Mutate a genome, returning a new one. The input is never touched; a
/// zero rate yields an identical copy.
pub fn mutate_genome<R: RngCore + ?Sized>(
    genome: &[Gene],
    options: &MutationOptions,
    rng: &mut R,
) -> Genome {
    mutate_genome_counted(genome, options, rng).0
}

/// Like [`mutate_genome`], also reporting how many field changes happened
pub fn mutate_genome_counted<R: RngCore + ?Sized>(
    genome: &[Gene],
    options: &MutationOptions,
    rng: &mut R,
) -> (Genome, usize) {
    let mut events = 0;
    let mutated = genome
        .iter()
        .map(|gene| {
            let (gene, changes) = mutate_gene(gene, options.mutation_rate, rng);
            events += changes;
            gene
        })
        .collect();
    (mutated, events)
}

fn mutate_gene<R: RngCore + ?Sized>(gene: &Gene, rate: f64, rng: &mut R) -> (Gene, usize) {
    let mut child = gene.clone();
    let mut events = 0;

    if next_unit(rng) < rate {
        child.response = child.response.flipped();
        events += 1;
    }

    if next_unit(rng) < rate {
        child.condition.opponent_last_move = mutate_last_move(child.condition.opponent_last_move, rng);
        events += 1;
    }

    if next_unit(rng) < rate {
        child.condition.self_last_move = mutate_last_move(child.condition.self_last_move, rng);
        events += 1;
    }

    if let Some(range) = child.condition.round_range {
        if next_unit(rng) < rate {
            child.condition = GeneCondition {
                round_range: mutate_round_range(range, rng),
                ..child.condition
            };
            events += 1;
        }
    }

    if let Some(weight) = child.weight {
        if next_unit(rng) < rate {
            let step = if next_unit(rng) < 0.5 { -WEIGHT_STEP } else { WEIGHT_STEP };
            child.weight = Some((weight + step).max(MIN_WEIGHT));
            events += 1;
        }
    }

    (child, events)
}

/// Unset conditions pick a move at random. Set ones are cleared or
/// inverted with even odds.
fn mutate_last_move<R: RngCore + ?Sized>(current: Option<Move>, rng: &mut R) -> Option<Move> {
    let coin = next_unit(rng) < 0.5;
    match current {
        None if coin => Some(Move::Cooperate),
        None => Some(Move::Defect),
        Some(_) if coin => None,
        Some(m) => Some(m.flipped()),
    }
}

/// Shift both bounds one round earlier or later, or drop the range
fn mutate_round_range<R: RngCore + ?Sized>(range: RoundRange, rng: &mut R) -> Option<RoundRange> {
    if next_unit(rng) < 0.5 {
        return None;
    }
    let start;
    let end;
    if next_unit(rng) < 0.5 {
        start = range.start.saturating_sub(1).max(1);
        end = range.end.saturating_sub(1).max(start);
    } else {
        start = range.start + 1;
        end = (range.end + 1).max(start);
    }
    Some(RoundRange::new(start, end))
}
