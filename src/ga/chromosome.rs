//! OS/MS dual-vector chromosome.
//!
//! # Encoding
//!
//! - **OS** (Operation Sequence): permutation of job ids with repetition.
//!   The k-th occurrence of job j is j's k-th operation.
//! - **MS** (Machine Selection): per global operation slot, one machine id
//!   drawn from that operation's candidate list.
//!
//! Every operator in this crate preserves both invariants; a chromosome
//! that violates them is an upstream bug, surfaced by the decoder.
//!
//! # Reference
//! Bierwirth (1995), "A generalized permutation approach to JSSP"

use rand::prelude::IndexedRandom;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::problem::ProblemTable;

/// One candidate solution: operation order plus machine assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chromosome {
    /// Operation Sequence: job ids in execution order.
    pub os: Vec<usize>,
    /// Machine Selection: machine id per global operation slot.
    pub ms: Vec<usize>,
}

impl Chromosome {
    /// Creates a random feasible chromosome: OS is a shuffled copy of the
    /// table's job-id multiset, MS an independent uniform candidate draw
    /// per operation.
    pub fn random<R: Rng>(table: &ProblemTable, rng: &mut R) -> Self {
        let mut os = table.work().to_vec();
        os.shuffle(rng);

        let ms = (0..table.operation_count())
            .map(|op| {
                table
                    .candidates(op)
                    .choose(rng)
                    .map(|&(machine, _)| machine)
                    .unwrap_or(0)
            })
            .collect();

        Self { os, ms }
    }

    /// Checks both encoding invariants against the table.
    pub fn is_valid(&self, table: &ProblemTable) -> bool {
        let n = table.operation_count();
        if self.os.len() != n || self.ms.len() != n {
            return false;
        }

        // Job multiplicities must match the table's operation counts.
        let mut counts = vec![0usize; table.job_count()];
        for &job in &self.os {
            if job == 0 || job > table.job_count() {
                return false;
            }
            counts[job - 1] += 1;
        }
        for job in 1..=table.job_count() {
            if counts[job - 1] != table.operations_of(job) {
                return false;
            }
        }

        // Every machine choice must come from its operation's candidates.
        self.ms
            .iter()
            .enumerate()
            .all(|(op, &machine)| table.candidates(op).iter().any(|&(m, _)| m == machine))
    }
}
