//! NSGA-II evolutionary loop for the energy-aware FJSP.
//!
//! Orchestrates initialization, generation-by-generation offspring
//! production, decoding, and elitist environment selection, under a
//! generation-count or wall-clock budget. The budget is checked only at
//! generation boundaries: an in-progress generation always completes.
//!
//! Offspring decoding is embarrassingly parallel; when the `parallel`
//! flag is set, evaluation fans out over rayon and results are collected
//! in order before environment selection runs. Nothing else touches
//! shared state across members, so parallel and sequential runs with the
//! same seed produce identical results.
//!
//! # Reference
//! Deb et al. (2002), "A Fast and Elitist Multiobjective Genetic
//! Algorithm: NSGA-II"

use std::time::{Duration, Instant};

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::decode::{DecodeError, Decoder, ObjectiveVector};
use crate::ga::chromosome::Chromosome;
use crate::ga::operators::{
    insert_mutation, pox_crossover, reassign_mutation, uniform_crossover,
};
use crate::ga::selection::binary_tournament;
use crate::ga::sorting::{crowding_distance, fast_non_dominated_sort};
use crate::problem::ProblemTable;

/// Objective vectors closer than this per dimension are duplicates when
/// the final front is extracted.
const DEDUP_EPSILON: f64 = 1e-6;

/// Search parameters of one NSGA-II run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaConfig {
    /// Generation-count ceiling (the scored initial population counts as
    /// generation 0).
    pub generations: usize,
    /// Population size, constant across generations.
    pub population_size: usize,
    /// Per-pair probability of applying crossover to both encoding halves.
    pub crossover_rate: f64,
    /// Per-pair probability of mutating both offspring.
    pub mutation_rate: f64,
    /// RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Evaluate offspring on the rayon pool.
    pub parallel: bool,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            generations: 2000,
            population_size: 50,
            crossover_rate: 0.8,
            mutation_rate: 0.15,
            seed: None,
            parallel: false,
        }
    }
}

impl GaConfig {
    /// Sets the generation ceiling.
    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Fixes the RNG seed for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables parallel offspring evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Rejects unusable parameter combinations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::ZeroPopulation);
        }
        if self.generations == 0 {
            return Err(ConfigError::ZeroGenerations);
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err(ConfigError::CrossoverRateOutOfRange(self.crossover_rate));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigError::MutationRateOutOfRange(self.mutation_rate));
        }
        Ok(())
    }
}

/// Invalid search parameters, rejected at construction time.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Population size must be positive.
    ZeroPopulation,
    /// At least the initial generation must run.
    ZeroGenerations,
    /// Crossover rate outside [0, 1].
    CrossoverRateOutOfRange(f64),
    /// Mutation rate outside [0, 1].
    MutationRateOutOfRange(f64),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroPopulation => write!(f, "population size must be positive"),
            Self::ZeroGenerations => write!(f, "generation count must be positive"),
            Self::CrossoverRateOutOfRange(r) => {
                write!(f, "crossover rate {r} outside [0, 1]")
            }
            Self::MutationRateOutOfRange(r) => {
                write!(f, "mutation rate {r} outside [0, 1]")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// One scored population member.
#[derive(Debug, Clone)]
pub struct Member {
    /// The chromosome.
    pub chromosome: Chromosome,
    /// Its decoded objective vector.
    pub objectives: ObjectiveVector,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Deduplicated final Pareto front, ascending by makespan.
    pub pareto_front: Vec<ObjectiveVector>,
    /// Chromosome of the lowest-makespan front member.
    pub best: Chromosome,
    /// Generations actually executed after initialization (smaller than
    /// the ceiling when the wall-clock budget expires).
    pub generations_run: usize,
}

/// NSGA-II search over one problem instance.
pub struct Nsga2<'a> {
    config: GaConfig,
    table: &'a ProblemTable,
    decoder: &'a Decoder<'a>,
    time_limit: Option<Duration>,
}

impl<'a> Nsga2<'a> {
    /// Creates a runner, rejecting invalid configurations.
    pub fn new(
        config: GaConfig,
        table: &'a ProblemTable,
        decoder: &'a Decoder<'a>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            table,
            decoder,
            time_limit: None,
        })
    }

    /// Caps the run by wall-clock time, checked once per generation
    /// boundary. Callers typically scale this with instance size.
    pub fn set_time_limit(&mut self, limit: Duration) {
        self.time_limit = Some(limit);
    }

    /// Runs the search to its generation or time budget and extracts the
    /// deduplicated Pareto front.
    ///
    /// A [`DecodeError`] aborts the run: given maintained invariants it
    /// can only mean an operator or initialization bug.
    pub fn run(&self) -> Result<RunResult, DecodeError> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let start = Instant::now();

        let initial: Vec<Chromosome> = (0..self.config.population_size)
            .map(|_| Chromosome::random(self.table, &mut rng))
            .collect();
        let mut population = self.evaluate(initial)?;
        info!(
            "initialized population of {} over {} operations",
            population.len(),
            self.table.operation_count()
        );

        let mut generations_run = 0;
        for generation in 1..self.config.generations {
            if let Some(limit) = self.time_limit {
                if start.elapsed() > limit {
                    info!("time budget reached after {generations_run} generations");
                    break;
                }
            }

            let offspring = self.make_offspring(&population, &mut rng);
            let scored = self.evaluate(offspring)?;

            let mut pool = population;
            pool.extend(scored);
            population = environment_selection(pool, self.config.population_size);
            generations_run = generation;

            debug!(
                "generation {generation}: best makespan {:.2}",
                population
                    .iter()
                    .map(|m| m.objectives.makespan)
                    .fold(f64::INFINITY, f64::min)
            );
        }

        let result = extract_pareto(&population, generations_run);
        info!(
            "finished after {} generations with {} Pareto points",
            result.generations_run,
            result.pareto_front.len()
        );
        Ok(result)
    }

    /// Mating pool by binary tournament, then pairwise crossover and
    /// mutation under single per-pair gates covering both encoding halves.
    fn make_offspring<R: Rng>(&self, population: &[Member], rng: &mut R) -> Vec<Chromosome> {
        let objectives: Vec<ObjectiveVector> =
            population.iter().map(|m| m.objectives).collect();
        let pool = binary_tournament(&objectives, rng);

        let mut offspring = Vec::with_capacity(pool.len());
        for pair in pool.chunks(2) {
            let mut first = population[pair[0]].chromosome.clone();
            if pair.len() == 1 {
                // Unpaired trailing member of an odd pool.
                if rng.random_bool(self.config.mutation_rate) {
                    insert_mutation(&mut first.os, rng);
                    reassign_mutation(&mut first.ms, self.table, rng);
                }
                offspring.push(first);
                continue;
            }
            let mut second = population[pair[1]].chromosome.clone();

            if rng.random_bool(self.config.crossover_rate) {
                let (os1, os2) = pox_crossover(&first.os, &second.os, rng);
                let (ms1, ms2) = uniform_crossover(&first.ms, &second.ms, rng);
                first = Chromosome { os: os1, ms: ms1 };
                second = Chromosome { os: os2, ms: ms2 };
            }
            if rng.random_bool(self.config.mutation_rate) {
                insert_mutation(&mut first.os, rng);
                reassign_mutation(&mut first.ms, self.table, rng);
                insert_mutation(&mut second.os, rng);
                reassign_mutation(&mut second.ms, self.table, rng);
            }

            offspring.push(first);
            offspring.push(second);
        }
        offspring
    }

    /// Scores chromosomes through the decoder, on the rayon pool when
    /// configured. Result order always matches input order.
    fn evaluate(&self, chromosomes: Vec<Chromosome>) -> Result<Vec<Member>, DecodeError> {
        let score = |chromosome: Chromosome| -> Result<Member, DecodeError> {
            let simulation = self.decoder.simulate(&chromosome.os, &chromosome.ms, false)?;
            Ok(Member {
                chromosome,
                objectives: simulation.objectives,
            })
        };

        if self.config.parallel {
            chromosomes.into_par_iter().map(score).collect()
        } else {
            chromosomes.into_iter().map(score).collect()
        }
    }
}

/// Elitist NSGA-II environment selection.
///
/// Accepts whole fronts in rank order while they fit; the front that
/// would overflow is truncated by descending crowding distance, ties
/// keeping their pre-sort order within the front. Given a pool of at
/// least `target` members, the result has exactly `target` members.
pub fn environment_selection(pool: Vec<Member>, target: usize) -> Vec<Member> {
    let objectives: Vec<ObjectiveVector> = pool.iter().map(|m| m.objectives).collect();
    let fronts = fast_non_dominated_sort(&objectives);

    let mut chosen: Vec<usize> = Vec::with_capacity(target);
    for front in &fronts {
        if chosen.len() + front.len() <= target {
            chosen.extend_from_slice(front);
            if chosen.len() == target {
                break;
            }
        } else {
            let distances = crowding_distance(&objectives, front);
            let mut boundary = front.clone();
            // Stable sort: equal distances keep the front's own order.
            boundary.sort_by(|&a, &b| {
                distances[b]
                    .partial_cmp(&distances[a])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            boundary.truncate(target - chosen.len());
            chosen.extend(boundary);
            break;
        }
    }

    let mut slots: Vec<Option<Member>> = pool.into_iter().map(Some).collect();
    chosen
        .into_iter()
        .map(|i| slots[i].take().expect("front indices are unique"))
        .collect()
}

/// Front 0 of the final population, ε-deduplicated (first occurrence
/// kept), sorted ascending by makespan; the lowest-makespan member's
/// chromosome is the single best representative.
fn extract_pareto(population: &[Member], generations_run: usize) -> RunResult {
    let objectives: Vec<ObjectiveVector> = population.iter().map(|m| m.objectives).collect();
    let fronts = fast_non_dominated_sort(&objectives);

    let mut unique: Vec<(ObjectiveVector, usize)> = Vec::new();
    for &i in &fronts[0] {
        if !unique
            .iter()
            .any(|(seen, _)| seen.approx_eq(&objectives[i], DEDUP_EPSILON))
        {
            unique.push((objectives[i], i));
        }
    }
    unique.sort_by(|a, b| {
        a.0.makespan
            .partial_cmp(&b.0.makespan)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let best = population[unique[0].1].chromosome.clone();
    RunResult {
        pareto_front: unique.into_iter().map(|(objectives, _)| objectives).collect(),
        best,
        generations_run,
    }
}
