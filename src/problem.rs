//! Flexible job-shop problem table.
//!
//! The table is the leaf dependency of the whole crate: for every operation
//! (in a fixed global order) it lists the candidate machines and the
//! machine-dependent processing time. Instance-file parsing lives in the
//! data-loading collaborator; this module only consumes its flat output.
//!
//! # Input format
//!
//! - `work`: one job id per global operation slot. The slots of a job are
//!   contiguous and ordered by the job's processing sequence, so the k-th
//!   slot of job j is j's k-th operation.
//! - `machine_time`: per slot, an alternating `[m1, t1, m2, t2, ...]` list
//!   of (machine, duration) candidates.
//!
//! # Reference
//! Brandimarte (1993), "Routing and scheduling in a flexible job shop by
//! tabu search" — the benchmark family this format originates from.

use serde::{Deserialize, Serialize};

/// A candidate assignment: machine id and processing duration.
pub type Candidate = (usize, u64);

/// Immutable problem data for one FJSP instance.
///
/// Job and machine ids are 1-based positive integers, matching the
/// Brandimarte-style input files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemTable {
    /// Job id per global operation slot.
    work: Vec<usize>,
    /// Candidate (machine, duration) pairs per global operation slot.
    candidates: Vec<Vec<Candidate>>,
    /// Highest job id appearing in `work`.
    job_count: usize,
    /// Highest machine id appearing in any candidate list.
    machine_count: usize,
    /// First global slot of each job (index = job id - 1).
    first_op: Vec<usize>,
    /// Operation count of each job (index = job id - 1).
    op_counts: Vec<usize>,
}

impl ProblemTable {
    /// Builds a table from the flat collaborator format.
    ///
    /// Rejects structurally broken input: empty tables, mismatched lengths,
    /// odd or empty candidate rows, zero ids, and jobs whose slots are not
    /// contiguous in `work`.
    pub fn from_flat(
        work: Vec<usize>,
        machine_time: Vec<Vec<u64>>,
    ) -> Result<Self, ProblemError> {
        if work.is_empty() {
            return Err(ProblemError::new(
                ProblemErrorKind::EmptyTable,
                "problem table has no operations",
            ));
        }
        if machine_time.len() != work.len() {
            return Err(ProblemError::new(
                ProblemErrorKind::LengthMismatch,
                format!(
                    "{} operations in work but {} candidate rows",
                    work.len(),
                    machine_time.len()
                ),
            ));
        }

        let mut candidates = Vec::with_capacity(machine_time.len());
        let mut machine_count = 0;
        for (slot, row) in machine_time.iter().enumerate() {
            if row.is_empty() || row.len() % 2 != 0 {
                return Err(ProblemError::new(
                    ProblemErrorKind::MalformedCandidates,
                    format!(
                        "operation {} has a candidate row of length {}",
                        slot,
                        row.len()
                    ),
                ));
            }
            let mut pairs = Vec::with_capacity(row.len() / 2);
            for pair in row.chunks_exact(2) {
                let machine = pair[0] as usize;
                if machine == 0 {
                    return Err(ProblemError::new(
                        ProblemErrorKind::MalformedCandidates,
                        format!("operation {slot} lists machine id 0"),
                    ));
                }
                machine_count = machine_count.max(machine);
                pairs.push((machine, pair[1]));
            }
            candidates.push(pairs);
        }

        let mut job_count = 0;
        for (slot, &job) in work.iter().enumerate() {
            if job == 0 {
                return Err(ProblemError::new(
                    ProblemErrorKind::InvalidJobId,
                    format!("operation {slot} has job id 0"),
                ));
            }
            job_count = job_count.max(job);
        }

        // Each job's slots must form one contiguous block.
        let mut first_op = vec![usize::MAX; job_count];
        let mut op_counts = vec![0usize; job_count];
        let mut previous = 0usize;
        for (slot, &job) in work.iter().enumerate() {
            if first_op[job - 1] == usize::MAX {
                first_op[job - 1] = slot;
            } else if job != previous {
                return Err(ProblemError::new(
                    ProblemErrorKind::NonContiguousJob,
                    format!("job {job} reappears at slot {slot} after a gap"),
                ));
            }
            op_counts[job - 1] += 1;
            previous = job;
        }

        Ok(Self {
            work,
            candidates,
            job_count,
            machine_count,
            first_op,
            op_counts,
        })
    }

    /// Total number of operations (chromosome length N).
    pub fn operation_count(&self) -> usize {
        self.work.len()
    }

    /// Highest job id in the instance.
    pub fn job_count(&self) -> usize {
        self.job_count
    }

    /// Highest machine id in the instance.
    pub fn machine_count(&self) -> usize {
        self.machine_count
    }

    /// Job id per global operation slot.
    pub fn work(&self) -> &[usize] {
        &self.work
    }

    /// Candidate (machine, duration) pairs of one operation.
    pub fn candidates(&self, operation: usize) -> &[Candidate] {
        &self.candidates[operation]
    }

    /// Processing time of `operation` on `machine`, if the machine is a
    /// candidate for it.
    pub fn duration(&self, operation: usize, machine: usize) -> Option<u64> {
        self.candidates
            .get(operation)?
            .iter()
            .find(|&&(m, _)| m == machine)
            .map(|&(_, t)| t)
    }

    /// First global slot of a job, or `None` if the job does not occur.
    pub fn first_operation(&self, job: usize) -> Option<usize> {
        let slot = *self.first_op.get(job.checked_sub(1)?)?;
        (slot != usize::MAX).then_some(slot)
    }

    /// Number of operations belonging to a job (0 if absent).
    pub fn operations_of(&self, job: usize) -> usize {
        job.checked_sub(1)
            .and_then(|j| self.op_counts.get(j).copied())
            .unwrap_or(0)
    }

    /// Distinct job ids, ascending.
    pub fn job_ids(&self) -> Vec<usize> {
        (1..=self.job_count)
            .filter(|&j| self.operations_of(j) > 0)
            .collect()
    }
}

/// Structural error in the problem input.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemError {
    /// Error category.
    pub kind: ProblemErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of problem-table errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProblemErrorKind {
    /// The table contains no operations.
    EmptyTable,
    /// `work` and the candidate table disagree on operation count.
    LengthMismatch,
    /// A candidate row is empty or not a list of pairs.
    MalformedCandidates,
    /// A job id is not a positive integer.
    InvalidJobId,
    /// A job's slots are not contiguous in `work`.
    NonContiguousJob,
}

impl ProblemError {
    fn new(kind: ProblemErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ProblemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ProblemError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> ProblemTable {
        // Two jobs with two operations each, three machines.
        ProblemTable::from_flat(
            vec![1, 1, 2, 2],
            vec![
                vec![1, 3, 2, 5],
                vec![2, 4],
                vec![1, 2, 3, 6],
                vec![3, 1],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_from_flat() {
        let table = sample_table();
        assert_eq!(table.operation_count(), 4);
        assert_eq!(table.job_count(), 2);
        assert_eq!(table.machine_count(), 3);
        assert_eq!(table.candidates(0), &[(1, 3), (2, 5)]);
        assert_eq!(table.first_operation(1), Some(0));
        assert_eq!(table.first_operation(2), Some(2));
        assert_eq!(table.operations_of(1), 2);
        assert_eq!(table.job_ids(), vec![1, 2]);
    }

    #[test]
    fn test_duration_lookup() {
        let table = sample_table();
        assert_eq!(table.duration(0, 2), Some(5));
        assert_eq!(table.duration(1, 2), Some(4));
        // Machine 3 is not a candidate for operation 0.
        assert_eq!(table.duration(0, 3), None);
        assert_eq!(table.duration(99, 1), None);
    }

    #[test]
    fn test_empty_table_rejected() {
        let err = ProblemTable::from_flat(vec![], vec![]).unwrap_err();
        assert_eq!(err.kind, ProblemErrorKind::EmptyTable);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = ProblemTable::from_flat(vec![1, 1], vec![vec![1, 2]]).unwrap_err();
        assert_eq!(err.kind, ProblemErrorKind::LengthMismatch);
    }

    #[test]
    fn test_odd_candidate_row_rejected() {
        let err = ProblemTable::from_flat(vec![1], vec![vec![1, 2, 3]]).unwrap_err();
        assert_eq!(err.kind, ProblemErrorKind::MalformedCandidates);
    }

    #[test]
    fn test_empty_candidate_row_rejected() {
        let err = ProblemTable::from_flat(vec![1], vec![vec![]]).unwrap_err();
        assert_eq!(err.kind, ProblemErrorKind::MalformedCandidates);
    }

    #[test]
    fn test_zero_ids_rejected() {
        let err = ProblemTable::from_flat(vec![0], vec![vec![1, 2]]).unwrap_err();
        assert_eq!(err.kind, ProblemErrorKind::InvalidJobId);

        let err = ProblemTable::from_flat(vec![1], vec![vec![0, 2]]).unwrap_err();
        assert_eq!(err.kind, ProblemErrorKind::MalformedCandidates);
    }

    #[test]
    fn test_non_contiguous_job_rejected() {
        let err = ProblemTable::from_flat(
            vec![1, 2, 1],
            vec![vec![1, 1], vec![1, 1], vec![1, 1]],
        )
        .unwrap_err();
        assert_eq!(err.kind, ProblemErrorKind::NonContiguousJob);
    }
}
