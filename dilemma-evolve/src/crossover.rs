//! Crossover operators for genomes

use dilemma_core::next_unit;
use rand::RngCore;

use crate::genome::{Gene, Genome};

/// Single-point crossover.
///
/// Picks a cut index from `floor(r * min_len)`, clamped into
/// `[1, max(1, min_len - 1)]`, and swaps tails. The cut is never 0, so a
/// one-gene parent still trades its tail. An empty parent yields the
/// parents swapped.
///
/// # Returns
/// `(left head + right tail, right head + left tail)`
pub fn single_point_crossover<R: RngCore + ?Sized>(
    left: &[Gene],
    right: &[Gene],
    rng: &mut R,
) -> (Genome, Genome) {
    let min_len = left.len().min(right.len());
    if min_len == 0 {
        return (right.to_vec(), left.to_vec());
    }

    let cut = crossover_point(min_len, next_unit(rng));

    let mut first = left[..cut].to_vec();
    first.extend_from_slice(&right[cut..]);
    let mut second = right[..cut].to_vec();
    second.extend_from_slice(&left[cut..]);
    (first, second)
}

fn crossover_point(min_len: usize, draw: f64) -> usize {
    let raw = (draw * min_len as f64).floor() as usize;
    raw.clamp(1, min_len.saturating_sub(1).max(1))
}
