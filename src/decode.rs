//! Schedule decoder: chromosome → timed schedule → objective vector.
//!
//! A single deterministic left-to-right pass over the operation sequence.
//! For each gene, the operation's start time is the later of its machine's
//! availability and its job's completion time; both clocks then advance by
//! the machine-dependent processing time. No blocking, no randomness.
//!
//! Makespan is the last job completion. Energy is the sum of processing
//! energy (power × busy time per machine) and idle energy
//! (idle power × (makespan − busy time) per machine).

use serde::{Deserialize, Serialize};

use crate::problem::ProblemTable;

/// Energy-model constants of the shop floor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EnergyModel {
    /// Power drawn by a machine while processing (kW).
    pub processing_power: f64,
    /// Power drawn by a machine while idle (kW).
    pub idle_power: f64,
}

impl Default for EnergyModel {
    fn default() -> Self {
        Self {
            processing_power: 30.0,
            idle_power: 1.0,
        }
    }
}

/// Objective vector of one decoded schedule. Both objectives are minimized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveVector {
    /// Completion time of the last operation.
    pub makespan: f64,
    /// Total energy consumption (processing + idle).
    pub energy: f64,
}

impl ObjectiveVector {
    /// Number of objective dimensions.
    pub const DIMENSIONS: usize = 2;

    /// Objective value by dimension index (0 = makespan, 1 = energy).
    pub fn get(&self, dimension: usize) -> f64 {
        match dimension {
            0 => self.makespan,
            1 => self.energy,
            _ => panic!("objective dimension out of range: {dimension}"),
        }
    }

    /// Pareto dominance: no worse in every dimension, strictly better in
    /// at least one.
    pub fn dominates(&self, other: &Self) -> bool {
        let no_worse = self.makespan <= other.makespan && self.energy <= other.energy;
        let strictly_better = self.makespan < other.makespan || self.energy < other.energy;
        no_worse && strictly_better
    }

    /// Componentwise equality within `epsilon`.
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self.makespan - other.makespan).abs() < epsilon
            && (self.energy - other.energy).abs() < epsilon
    }
}

/// One scheduled operation, for downstream Gantt rendering and export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledOp {
    /// Machine the operation runs on.
    pub machine: usize,
    /// Start time.
    pub start: u64,
    /// End time (start + processing time).
    pub end: u64,
    /// Owning job id.
    pub job: usize,
    /// 1-based operation number within the job.
    pub op_seq: usize,
}

/// Result of decoding one chromosome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    /// (makespan, energy) of the decoded schedule.
    pub objectives: ObjectiveVector,
    /// Per-operation schedule records, present when requested.
    pub trace: Option<Vec<ScheduledOp>>,
}

/// Decode failure. Given maintained chromosome invariants these never
/// occur; when they do they indicate an operator or initialization bug and
/// abort the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// OS or MS length differs from the table's operation count.
    LengthMismatch {
        /// Expected length (operation count).
        expected: usize,
        /// Actual OS length.
        os_len: usize,
        /// Actual MS length.
        ms_len: usize,
    },
    /// The chosen machine is not a candidate for the operation.
    MachineNotCandidate {
        /// Global operation index.
        operation: usize,
        /// Offending machine id.
        machine: usize,
    },
    /// An OS gene names a job with no pending operation (unknown id or
    /// more occurrences than the job has operations).
    NoPendingOperation {
        /// Offending job id.
        job: usize,
    },
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LengthMismatch {
                expected,
                os_len,
                ms_len,
            } => write!(
                f,
                "chromosome length mismatch: expected {expected}, OS has {os_len}, MS has {ms_len}"
            ),
            Self::MachineNotCandidate { operation, machine } => write!(
                f,
                "machine {machine} is not a candidate for operation {operation}"
            ),
            Self::NoPendingOperation { job } => {
                write!(f, "job {job} has no pending operation at this OS position")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Deterministic schedule simulator for one problem instance.
pub struct Decoder<'a> {
    table: &'a ProblemTable,
    energy: EnergyModel,
}

impl<'a> Decoder<'a> {
    /// Creates a decoder with the default energy model.
    pub fn new(table: &'a ProblemTable) -> Self {
        Self {
            table,
            energy: EnergyModel::default(),
        }
    }

    /// Overrides the energy-model constants.
    pub fn with_energy_model(mut self, energy: EnergyModel) -> Self {
        self.energy = energy;
        self
    }

    /// The problem table this decoder simulates against.
    pub fn table(&self) -> &ProblemTable {
        self.table
    }

    /// Simulates a chromosome into an objective vector and, when
    /// `want_trace` is set, the full per-operation schedule.
    ///
    /// Pure in (OS, MS, table): identical inputs yield identical outputs.
    pub fn simulate(
        &self,
        os: &[usize],
        ms: &[usize],
        want_trace: bool,
    ) -> Result<Simulation, DecodeError> {
        let n = self.table.operation_count();
        if os.len() != n || ms.len() != n {
            return Err(DecodeError::LengthMismatch {
                expected: n,
                os_len: os.len(),
                ms_len: ms.len(),
            });
        }

        let job_count = self.table.job_count();
        let machine_count = self.table.machine_count();

        let mut job_completion = vec![0u64; job_count];
        let mut machine_available = vec![0u64; machine_count];
        let mut machine_busy = vec![0u64; machine_count];
        let mut cursor = vec![0usize; job_count];
        let mut trace = want_trace.then(|| Vec::with_capacity(n));

        for &job in os {
            let first = self
                .table
                .first_operation(job)
                .ok_or(DecodeError::NoPendingOperation { job })?;
            let depth = cursor[job - 1];
            if depth >= self.table.operations_of(job) {
                return Err(DecodeError::NoPendingOperation { job });
            }
            // The depth-th pending operation of this job, as a global slot.
            let operation = first + depth;
            let machine = ms[operation];
            let duration = self
                .table
                .duration(operation, machine)
                .ok_or(DecodeError::MachineNotCandidate { operation, machine })?;

            let start = machine_available[machine - 1].max(job_completion[job - 1]);
            let end = start + duration;

            if let Some(records) = trace.as_mut() {
                records.push(ScheduledOp {
                    machine,
                    start,
                    end,
                    job,
                    op_seq: depth + 1,
                });
            }

            machine_available[machine - 1] = end;
            machine_busy[machine - 1] += duration;
            job_completion[job - 1] = end;
            cursor[job - 1] += 1;
        }

        let makespan = job_completion.iter().copied().max().unwrap_or(0) as f64;
        let processing_energy: f64 = machine_busy
            .iter()
            .map(|&busy| busy as f64 * self.energy.processing_power)
            .sum();
        let idle_energy: f64 = machine_busy
            .iter()
            .map(|&busy| (makespan - busy as f64) * self.energy.idle_power)
            .sum();

        Ok(Simulation {
            objectives: ObjectiveVector {
                makespan,
                energy: processing_energy + idle_energy,
            },
            trace,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> ProblemTable {
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
    fn test_simulate_is_deterministic() {
        let table = sample_table();
        let decoder = Decoder::new(&table);
        let os = [1, 2, 1, 2];
        let ms = [1, 2, 1, 3];

        let a = decoder.simulate(&os, &ms, false).unwrap();
        let b = decoder.simulate(&os, &ms, false).unwrap();
        assert_eq!(a.objectives, b.objectives);
    }

    #[test]
    fn test_precedence_and_machine_exclusivity() {
        let table = sample_table();
        let decoder = Decoder::new(&table);
        // J1O1 on M1 (3), J1O2 on M2 (4), J2O1 on M1 (2), J2O2 on M3 (1).
        let sim = decoder
            .simulate(&[1, 2, 1, 2], &[1, 2, 1, 3], true)
            .unwrap();
        let trace = sim.trace.unwrap();
        assert_eq!(trace.len(), 4);

        // J1O1: M1 at [0, 3).
        assert_eq!(trace[0], ScheduledOp { machine: 1, start: 0, end: 3, job: 1, op_seq: 1 });
        // J2O1 waits for M1: [3, 5).
        assert_eq!(trace[1], ScheduledOp { machine: 1, start: 3, end: 5, job: 2, op_seq: 1 });
        // J1O2 on M2 after J1O1: [3, 7).
        assert_eq!(trace[2], ScheduledOp { machine: 2, start: 3, end: 7, job: 1, op_seq: 2 });
        // J2O2 on M3 after J2O1: [5, 6).
        assert_eq!(trace[3], ScheduledOp { machine: 3, start: 5, end: 6, job: 2, op_seq: 2 });

        assert_eq!(sim.objectives.makespan, 7.0);
    }

    #[test]
    fn test_energy_conservation() {
        let table = sample_table();
        let model = EnergyModel {
            processing_power: 30.0,
            idle_power: 1.0,
        };
        let decoder = Decoder::new(&table).with_energy_model(model);
        let sim = decoder.simulate(&[1, 2, 1, 2], &[1, 2, 1, 3], false).unwrap();

        // Busy: M1 = 5, M2 = 4, M3 = 1; makespan = 7.
        let busy = [5.0, 4.0, 1.0];
        let makespan = sim.objectives.makespan;
        let processing: f64 = busy.iter().map(|b| b * 30.0).sum();
        let idle: f64 = busy.iter().map(|b| (makespan - b) * 1.0).sum();
        assert!(busy.iter().all(|&b| makespan - b >= 0.0));
        assert!((sim.objectives.energy - (processing + idle)).abs() < 1e-9);
    }

    #[test]
    fn test_single_machine_scenario() {
        // Two jobs, two unit operations each, all on machine 1: any order
        // gives makespan 4 with zero idle time.
        let table = ProblemTable::from_flat(
            vec![1, 1, 2, 2],
            vec![vec![1, 1]; 4],
        )
        .unwrap();
        let decoder = Decoder::new(&table);
        let sim = decoder.simulate(&[2, 1, 2, 1], &[1, 1, 1, 1], false).unwrap();
        assert_eq!(sim.objectives.makespan, 4.0);
        assert_eq!(sim.objectives.energy, 4.0 * 30.0);
    }

    #[test]
    fn test_non_candidate_machine_fails_loudly() {
        let table = sample_table();
        let decoder = Decoder::new(&table);
        // Machine 3 cannot process operation 0.
        let err = decoder.simulate(&[1, 1, 2, 2], &[3, 2, 1, 3], false).unwrap_err();
        assert_eq!(
            err,
            DecodeError::MachineNotCandidate {
                operation: 0,
                machine: 3
            }
        );
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let table = sample_table();
        let decoder = Decoder::new(&table);
        let err = decoder.simulate(&[1, 1, 2], &[1, 2, 1, 3], false).unwrap_err();
        assert!(matches!(err, DecodeError::LengthMismatch { expected: 4, .. }));
    }

    #[test]
    fn test_overlong_job_sequence_rejected() {
        let table = sample_table();
        let decoder = Decoder::new(&table);
        // Job 1 appears three times but only has two operations.
        let err = decoder.simulate(&[1, 1, 1, 2], &[1, 2, 1, 3], false).unwrap_err();
        assert_eq!(err, DecodeError::NoPendingOperation { job: 1 });
    }

    #[test]
    fn test_dominance_is_strict_partial_order() {
        let a = ObjectiveVector { makespan: 3.0, energy: 5.0 };
        let b = ObjectiveVector { makespan: 4.0, energy: 5.0 };
        let c = ObjectiveVector { makespan: 2.0, energy: 9.0 };

        // Irreflexive.
        assert!(!a.dominates(&a));
        // a dominates b, never both ways.
        assert!(a.dominates(&b));
        assert!(!b.dominates(&a));
        // Mutually non-dominating pair.
        assert!(!a.dominates(&c));
        assert!(!c.dominates(&a));
    }
}
