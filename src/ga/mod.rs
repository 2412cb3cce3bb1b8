//! NSGA-II genetic search over the OS/MS encoding.
//!
//! # Submodules
//!
//! - [`chromosome`]: dual-vector encoding and random initialization
//! - [`operators`]: POX / uniform crossover, insertion / re-draw mutation
//! - [`selection`]: binary tournament under Pareto dominance
//! - [`sorting`]: fast non-dominated sort and crowding distance
//! - [`engine`]: the evolutionary loop and environment selection
//!
//! # References
//! - Deb et al. (2002), "A Fast and Elitist Multiobjective Genetic Algorithm: NSGA-II"
//! - Bierwirth (1995), "A generalized permutation approach to JSSP"

pub mod chromosome;
pub mod engine;
pub mod operators;
pub mod selection;
pub mod sorting;

pub use chromosome::Chromosome;
pub use engine::{ConfigError, GaConfig, Member, Nsga2, RunResult, environment_selection};
pub use operators::{
    insert_mutation, pox_crossover, reassign_mutation, uniform_crossover,
    uniform_crossover_with_mask,
};
pub use selection::binary_tournament;
pub use sorting::{crowding_distance, fast_non_dominated_sort};
