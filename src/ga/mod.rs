//! Genetic algorithm engine for the symmetric TSP.
//!
//! A run evolves a fixed-size population of [`Tour`]s. Each generation
//! applies tournament selection, pairwise permutation crossover, swap
//! mutation and fitness evaluation, then hands the generation's best to the
//! [`AdaptiveController`], which tracks stagnation and reacts by nudging
//! operator rates, switching crossover strategy, firing a mutation bomb or
//! stopping the run.
//!
//! # Key Types
//!
//! - [`GaConfig`]: run parameters (population, budget, rates, strategy)
//! - [`Evolution`]: one run, stepped generation by generation
//! - [`GaRunner`]: one-call façade over [`Evolution`]
//! - [`GaResult`]: best tour plus run statistics
//!
//! # Submodules
//!
//! - [`operators`]: PMX, OX and CX crossover and swap mutation
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - Larrañaga et al. (1999), "Genetic Algorithms for the Travelling
//!   Salesman Problem: A Review of Representations and Operators"

mod adaptive;
mod config;
mod fitness;
pub mod operators;
mod runner;
mod selection;
mod types;

pub use adaptive::{AdaptiveController, Decision, RunState, SearchState, StopReason};
pub use config::{AdaptiveConfig, GaConfig};
pub use fitness::{check_permutation, FitnessEvaluator};
pub use operators::CrossoverStrategy;
pub use runner::{crossover_population, mutate_population, Evolution, GaResult, GaRunner};
pub use selection::{derived_tournament_size, select_population, tournament};
pub use types::{best_index, Cost, Individual, Population, Tour};
