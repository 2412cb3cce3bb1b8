//! Energy-aware flexible job-shop scheduling.
//!
//! Searches for Pareto-optimal production schedules under two competing
//! objectives — makespan and total energy consumption — using NSGA-II
//! over the classic OS/MS dual-vector encoding.
//!
//! # Modules
//!
//! - **`problem`**: the per-operation candidate-machine table consumed
//!   from the data-loading collaborator
//! - **`decode`**: the deterministic schedule simulator mapping a
//!   chromosome to an objective vector and optional schedule trace
//! - **`ga`**: chromosome encoding, feasibility-preserving operators,
//!   Pareto selection machinery, and the evolutionary loop
//!
//! # Usage
//!
//! ```
//! use fjsp_nsga2::decode::Decoder;
//! use fjsp_nsga2::ga::{GaConfig, Nsga2};
//! use fjsp_nsga2::problem::ProblemTable;
//!
//! let table = ProblemTable::from_flat(
//!     vec![1, 1, 2, 2],
//!     vec![vec![1, 3, 2, 5], vec![2, 4], vec![1, 2, 3, 6], vec![3, 1]],
//! )?;
//! let decoder = Decoder::new(&table);
//! let config = GaConfig::default()
//!     .with_generations(50)
//!     .with_population_size(20)
//!     .with_seed(42);
//! let result = Nsga2::new(config, &table, &decoder)?.run()?;
//!
//! for point in &result.pareto_front {
//!     println!("makespan {:.2}, energy {:.2}", point.makespan, point.energy);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # References
//!
//! - Deb et al. (2002), "A Fast and Elitist Multiobjective Genetic
//!   Algorithm: NSGA-II"
//! - Brandimarte (1993), "Routing and scheduling in a flexible job shop
//!   by tabu search"
//! - Bierwirth (1995), "A generalized permutation approach to JSSP"

pub mod decode;
pub mod ga;
pub mod problem;
