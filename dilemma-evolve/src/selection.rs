//! Selection operators for genetic algorithms
//!
//! All operators work on a fitness slice that is already sorted best
//! first, and return indices into it. Missing or NaN fitness should be
//! passed as `f64::NEG_INFINITY`.

use std::fmt;
use std::str::FromStr;

use dilemma_core::{next_unit, pick_index};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::EvolutionError;

/// How parents are chosen for reproduction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionMethod {
    #[default]
    Tournament,
    RouletteWheel,
    /// Top two by current order
    Rank,
    /// Top two by current order
    Elitist,
}

impl FromStr for SelectionMethod {
    type Err = EvolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tournament" => Ok(SelectionMethod::Tournament),
            "roulette-wheel" | "roulette" => Ok(SelectionMethod::RouletteWheel),
            "rank" => Ok(SelectionMethod::Rank),
            "elitist" => Ok(SelectionMethod::Elitist),
            _ => Err(EvolutionError::UnknownSelectionMethod(s.to_string())),
        }
    }
}

impl fmt::Display for SelectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SelectionMethod::Tournament => "tournament",
            SelectionMethod::RouletteWheel => "roulette-wheel",
            SelectionMethod::Rank => "rank",
            SelectionMethod::Elitist => "elitist",
        };
        f.write_str(label)
    }
}

/// Effective tournament size for a population: at least 2, at most the
/// population itself
pub fn clamp_tournament_size(tournament_size: usize, population: usize) -> usize {
    tournament_size.max(2).min(population)
}

/// Tournament selection: sample distinct individuals uniformly and keep
/// the fittest. Ties go to the earlier index.
///
/// # Returns
/// Index of the winner, or None for an empty population
pub fn tournament_select<R: RngCore + ?Sized>(
    fitness: &[f64],
    tournament_size: usize,
    rng: &mut R,
) -> Option<usize> {
    if fitness.is_empty() {
        return None;
    }
    let size = clamp_tournament_size(tournament_size, fitness.len());

    // Partial Fisher-Yates: the first `size` slots become the sample
    let mut pool: Vec<usize> = (0..fitness.len()).collect();
    for slot in 0..size {
        let pick = slot + pick_index(rng, pool.len() - slot);
        pool.swap(slot, pick);
    }

    pool[..size]
        .iter()
        .copied()
        .reduce(|best, idx| {
            if fitness[idx] > fitness[best] || (fitness[idx] == fitness[best] && idx < best) {
                idx
            } else {
                best
            }
        })
}

/// Roulette-wheel selection. Fitness is shifted so the minimum maps to 1;
/// non-finite values count as the minimum.
pub fn roulette_select<R: RngCore + ?Sized>(fitness: &[f64], rng: &mut R) -> Option<usize> {
    if fitness.is_empty() {
        return None;
    }

    let min = fitness
        .iter()
        .copied()
        .filter(|f| f.is_finite())
        .fold(f64::INFINITY, f64::min);
    if !min.is_finite() {
        return Some(pick_index(rng, fitness.len()));
    }

    let weights: Vec<f64> = fitness
        .iter()
        .map(|&f| if f.is_finite() { f - min + 1.0 } else { 1.0 })
        .collect();
    let total: f64 = weights.iter().sum();

    let mut remaining = next_unit(rng) * total;
    for (idx, weight) in weights.iter().enumerate() {
        if remaining < *weight {
            return Some(idx);
        }
        remaining -= weight;
    }
    Some(weights.len() - 1)
}

/// Pick the two parents for one reproduction step
pub fn select_parents<R: RngCore + ?Sized>(
    method: SelectionMethod,
    fitness: &[f64],
    tournament_size: usize,
    rng: &mut R,
) -> Option<(usize, usize)> {
    if fitness.is_empty() {
        return None;
    }
    match method {
        SelectionMethod::Tournament => {
            let first = tournament_select(fitness, tournament_size, rng)?;
            let second = tournament_select(fitness, tournament_size, rng)?;
            Some((first, second))
        }
        SelectionMethod::RouletteWheel => {
            let first = roulette_select(fitness, rng)?;
            let second = roulette_select(fitness, rng)?;
            Some((first, second))
        }
        SelectionMethod::Rank | SelectionMethod::Elitist => Some((0, 1.min(fitness.len() - 1))),
    }
}
