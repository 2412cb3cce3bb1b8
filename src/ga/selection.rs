//! Binary tournament selection under Pareto dominance.
//!
//! Each tournament draws two distinct population members; the dominating
//! one wins, and mutually non-dominating pairs are settled by a fair coin.
//! Repeated `pop_size` times (with replacement across tournaments) to fill
//! a mating pool of parent indices.

use rand::seq::index::sample;
use rand::Rng;

use crate::decode::ObjectiveVector;

/// Selects `objectives.len()` parent indices by binary tournament.
///
/// Returns an empty pool for populations of fewer than two members (no
/// tournament can be formed).
pub fn binary_tournament<R: Rng>(objectives: &[ObjectiveVector], rng: &mut R) -> Vec<usize> {
    let pop_size = objectives.len();
    if pop_size < 2 {
        return Vec::new();
    }

    (0..pop_size)
        .map(|_| {
            let picked = sample(rng, pop_size, 2);
            let (a, b) = (picked.index(0), picked.index(1));
            if objectives[a].dominates(&objectives[b]) {
                a
            } else if objectives[b].dominates(&objectives[a]) {
                b
            } else if rng.random_bool(0.5) {
                a
            } else {
                b
            }
        })
        .collect()
}
