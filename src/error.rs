//! Error taxonomy for loading, configuring and running the solver.
//!
//! Every public entry point returns [`TspError`]. Configuration and input
//! errors are raised before any evolutionary work begins;
//! [`TspError::InvalidPermutation`] signals a defect in an operator and is
//! never retried.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::ga::CrossoverStrategy;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum TspError {
    /// The distance matrix input is malformed.
    #[error("invalid distance matrix: {0}")]
    InputFormat(#[from] InputFormatError),

    /// A configuration value is out of range.
    #[error("invalid argument: {0}")]
    Argument(#[from] ArgumentError),

    /// A tour stopped being a permutation of `0..n`. `operator` is the
    /// last phase that touched the population.
    #[error("invalid tour after {operator} in generation {generation}: {source}")]
    InvalidPermutation {
        operator: Operator,
        generation: usize,
        #[source]
        source: PermutationError,
    },

    /// A crossover strategy name with no implementation.
    #[error("unsupported crossover strategy `{0}` (expected one of: pmx, ox, cx)")]
    UnsupportedStrategy(String),
}

impl TspError {
    /// Returns `true` for errors that stem from user-supplied arguments.
    pub fn is_argument_error(&self) -> bool {
        matches!(self, TspError::Argument(_) | TspError::UnsupportedStrategy(_))
    }
}

/// Malformed or undersized distance matrix input.
#[derive(Debug, Error)]
pub enum InputFormatError {
    #[error("cannot read `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("missing size line")]
    MissingSize,

    #[error("size line `{0}` is not a non-negative integer")]
    InvalidSize(String),

    #[error("matrix must contain at least one node")]
    EmptyMatrix,

    #[error("row {row}: `{token}` is not a non-negative integer")]
    InvalidValue { row: usize, token: String },

    #[error("row {row}: expected at least {expected} values, found {found}")]
    RowTooShort {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("row {row}: expected at most {max} values, found {found}")]
    RowTooLong { row: usize, max: usize, found: usize },

    #[error("expected {expected} rows, found {found}")]
    MissingRows { expected: usize, found: usize },

    #[error("unexpected data after the last row at line {line}")]
    TrailingData { line: usize },

    #[error("distance from node {node} to itself must be 0, found {value}")]
    NonZeroDiagonal { node: usize, value: u64 },

    #[error("matrix is not square")]
    NotSquare,

    #[error("matrix is not symmetric at ({i}, {j})")]
    Asymmetric { i: usize, j: usize },

    #[error("distance {max} over {nodes} nodes can overflow a tour cost")]
    CostOverflow { nodes: usize, max: u64 },
}

/// Out-of-range configuration values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArgumentError {
    #[error("population size must be positive")]
    PopulationSize,

    #[error("generation budget must be positive")]
    GenerationBudget,

    #[error("tournament size {tournament} exceeds population size {population}")]
    TournamentTooLarge { tournament: usize, population: usize },

    #[error("tournament size must be at least 1")]
    TournamentTooSmall,

    #[error("{name} must be within [0, 1], got {value}")]
    Probability { name: &'static str, value: f64 },

    #[error("report interval must be positive")]
    ReportInterval,
}

/// Why a sequence is not a permutation of `0..n`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermutationError {
    #[error("expected {expected} nodes, found {found}")]
    WrongLength { expected: usize, found: usize },

    #[error("node {value} at position {position} is out of range")]
    OutOfRange { position: usize, value: usize },

    #[error("node {value} appears more than once (again at position {position})")]
    Duplicate { position: usize, value: usize },
}

/// The engine phase that produced a tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Initialization,
    Crossover(CrossoverStrategy),
    Mutation,
    MutationBomb,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Initialization => write!(f, "initialization"),
            Operator::Crossover(strategy) => write!(f, "{strategy} crossover"),
            Operator::Mutation => write!(f, "mutation"),
            Operator::MutationBomb => write!(f, "mutation bomb"),
        }
    }
}
