//! Feasibility-preserving genetic operators for the OS/MS encoding.
//!
//! Crossover and mutation act on the two chromosome halves separately:
//! POX recombines operation sequences without disturbing job
//! multiplicities, uniform crossover swaps machine choices slot by slot
//! (each parent's value is already a candidate, so swaps stay feasible),
//! and the two mutations relocate one OS gene or re-draw one MS gene.
//!
//! Degenerate inputs (length ≤ 1, empty candidate lists) pass through
//! unchanged.
//!
//! # References
//! - Zhang et al. (2005), "POX crossover for job-shop scheduling"
//! - Bierwirth (1995), "A generalized permutation approach to JSSP"

use rand::Rng;

use crate::problem::ProblemTable;

/// Precedence-preserving Order Crossover (POX) on operation sequences.
///
/// The distinct job ids are split at a random point into a prefix set S1
/// (never empty) and a suffix set S2. Offspring 1 keeps parent 1's S1
/// genes in place and fills the remaining slots with parent 2's S2 genes
/// in their original order; offspring 2 keeps parent 2's S2 genes and
/// fills from parent 1's S1 genes. Both offspring inherit each job's
/// multiplicity exactly, so the permutation-with-repetition invariant
/// holds by construction.
pub fn pox_crossover<R: Rng>(
    parent1: &[usize],
    parent2: &[usize],
    rng: &mut R,
) -> (Vec<usize>, Vec<usize>) {
    if parent1.len() <= 1 {
        return (parent1.to_vec(), parent2.to_vec());
    }

    let mut jobs: Vec<usize> = parent1.to_vec();
    jobs.sort_unstable();
    jobs.dedup();

    let split = rng.random_range(0..jobs.len());
    let set1 = &jobs[..=split];
    let in_set1 = |job: usize| set1.binary_search(&job).is_ok();

    let child1 = pox_build_child(parent1, parent2, &in_set1, true);
    let child2 = pox_build_child(parent2, parent1, &in_set1, false);
    (child1, child2)
}

/// Keeps the template's genes whose set membership matches `keep_set1`,
/// filling the other slots from the donor's complementary genes in order.
fn pox_build_child(
    template: &[usize],
    donor: &[usize],
    in_set1: &impl Fn(usize) -> bool,
    keep_set1: bool,
) -> Vec<usize> {
    let mut donor_iter = donor.iter().filter(|&&job| in_set1(job) != keep_set1);
    template
        .iter()
        .map(|&job| {
            if in_set1(job) == keep_set1 {
                job
            } else {
                // The donor holds exactly as many complementary genes as
                // there are holes; multiplicities match by construction.
                *donor_iter.next().unwrap()
            }
        })
        .collect()
}

/// Uniform crossover on machine-selection vectors: a fair coin per slot
/// decides whether the parents' choices are swapped.
pub fn uniform_crossover<R: Rng>(
    parent1: &[usize],
    parent2: &[usize],
    rng: &mut R,
) -> (Vec<usize>, Vec<usize>) {
    let mask: Vec<bool> = (0..parent1.len()).map(|_| rng.random_bool(0.5)).collect();
    uniform_crossover_with_mask(parent1, parent2, &mask)
}

/// Mask-driven variant of [`uniform_crossover`]: `true` swaps the slot.
pub fn uniform_crossover_with_mask(
    parent1: &[usize],
    parent2: &[usize],
    mask: &[bool],
) -> (Vec<usize>, Vec<usize>) {
    let mut child1 = parent1.to_vec();
    let mut child2 = parent2.to_vec();
    for (i, &swap) in mask.iter().enumerate().take(child1.len().min(child2.len())) {
        if swap {
            std::mem::swap(&mut child1[i], &mut child2[i]);
        }
    }
    (child1, child2)
}

/// Insertion mutation on the operation sequence: the gene at the later of
/// two distinct random positions is relocated immediately before the
/// earlier one. A pure relocation, so job multiplicities are untouched.
pub fn insert_mutation<R: Rng>(os: &mut Vec<usize>, rng: &mut R) {
    if os.len() < 2 {
        return;
    }
    let a = rng.random_range(0..os.len());
    let b = rng.random_range(0..os.len() - 1);
    // Map b into 0..len excluding a to get two distinct positions.
    let b = if b >= a { b + 1 } else { b };
    let (earlier, later) = if a < b { (a, b) } else { (b, a) };

    let gene = os.remove(later);
    os.insert(earlier, gene);
}

/// Re-draw mutation on the machine selection: one random operation's
/// machine is replaced by a uniform draw from its own candidate list
/// (possibly the same machine).
pub fn reassign_mutation<R: Rng>(ms: &mut [usize], table: &ProblemTable, rng: &mut R) {
    if ms.is_empty() {
        return;
    }
    let op = rng.random_range(0..ms.len());
    let candidates = table.candidates(op);
    if !candidates.is_empty() {
        ms[op] = candidates[rng.random_range(0..candidates.len())].0;
    }
}
