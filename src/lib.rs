//! Adaptive genetic algorithm for the symmetric Traveling Salesman Problem.
//!
//! Given a symmetric [`DistanceMatrix`], the engine searches for a cheap
//! Hamiltonian cycle within a generation budget. It is a stochastic
//! heuristic: the returned tour is the best one seen, not a proven optimum.
//!
//! - [`matrix`]: the distance matrix and its text loader
//! - [`ga`]: population, operators, adaptive control and the run loop
//! - [`report`]: progress/result sinks
//! - [`error`]: the error taxonomy
//!
//! ```
//! use tsp_ga::{DistanceMatrix, GaConfig, GaRunner, StopReason};
//!
//! let matrix: DistanceMatrix = "4\n0\n10 0\n35 20 0\n40 25 30 0\n".parse()?;
//! let config = GaConfig::new(20, 50).with_seed(7);
//! let result = GaRunner::run(&matrix, &config)?;
//!
//! assert_eq!(result.stop_reason, StopReason::GenerationBudget);
//! assert_eq!(result.best.len(), 4);
//! # Ok::<(), tsp_ga::TspError>(())
//! ```

pub mod error;
pub mod ga;
pub mod matrix;
pub mod report;

pub use error::{ArgumentError, InputFormatError, Operator, PermutationError, TspError};
pub use ga::{
    AdaptiveConfig, CrossoverStrategy, Evolution, FitnessEvaluator, GaConfig, GaResult, GaRunner,
    StopReason, Tour,
};
pub use matrix::DistanceMatrix;
pub use report::{LogReporter, NoopReporter, RecordingReporter, Reporter};
