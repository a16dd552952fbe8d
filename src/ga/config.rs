//! GA configuration.
//!
//! [`GaConfig`] holds the run parameters; [`AdaptiveConfig`] holds the
//! constants of the stagnation-driven operator control.

use super::operators::CrossoverStrategy;
use super::selection::derived_tournament_size;
use crate::error::ArgumentError;

/// Configuration for the TSP genetic algorithm.
///
/// # Defaults
///
/// ```
/// use tsp_ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert!((config.crossover_rate - 0.95).abs() < 1e-12);
/// assert!((config.mutation_rate - 0.005).abs() < 1e-12);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use tsp_ga::{CrossoverStrategy, GaConfig};
///
/// let config = GaConfig::new(200, 5_000)
///     .with_strategy(CrossoverStrategy::Ox)
///     .with_tournament_size(7)
///     .with_seed(42);
/// assert_eq!(config.tournament_size(), 7);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GaConfig {
    /// Number of tours in the population, fixed for the run.
    pub population_size: usize,

    /// Generation budget. The run stops after this many generations unless
    /// the stagnation ceiling stops it first.
    pub max_generations: usize,

    /// Default probability of recombining a selected pair (0.0–1.0).
    pub crossover_rate: f64,

    /// Default probability of swap-mutating a tour (0.0–1.0).
    pub mutation_rate: f64,

    /// Tournament size. `None` derives it from the population size
    /// (5%, at least 2).
    pub tournament_size: Option<usize>,

    /// Crossover strategy active at the start of the run.
    pub strategy: CrossoverStrategy,

    /// Whether to run the per-tour phases in parallel using rayon.
    ///
    /// Results are identical either way for a fixed seed.
    pub parallel: bool,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,

    /// Generations between progress reports.
    pub report_interval: usize,

    /// Whether to verify every tour is a permutation right after crossover
    /// and mutation, so a defect is attributed to the operator that caused
    /// it. Fitness evaluation always checks.
    pub validate_operators: bool,

    /// Whether to record the tracked best fitness of every generation in
    /// [`GaResult::fitness_history`](super::GaResult::fitness_history).
    pub keep_history: bool,

    /// Stagnation response constants.
    pub adaptive: AdaptiveConfig,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 1000,
            crossover_rate: 0.95,
            mutation_rate: 0.005,
            tournament_size: None,
            strategy: CrossoverStrategy::default(),
            parallel: true,
            seed: None,
            report_interval: 500,
            validate_operators: cfg!(debug_assertions),
            keep_history: true,
            adaptive: AdaptiveConfig::default(),
        }
    }
}

impl GaConfig {
    /// Creates a configuration with the two required parameters.
    pub fn new(population_size: usize, max_generations: usize) -> Self {
        Self {
            population_size,
            max_generations,
            ..Self::default()
        }
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the generation budget.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the default crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    /// Sets the default mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets an explicit tournament size.
    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = Some(k);
        self
    }

    /// Sets the initial crossover strategy.
    pub fn with_strategy(mut self, strategy: CrossoverStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Enables or disables parallel phases.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the progress report interval in generations.
    pub fn with_report_interval(mut self, generations: usize) -> Self {
        self.report_interval = generations;
        self
    }

    /// Enables or disables per-operator permutation checks.
    pub fn with_validate_operators(mut self, validate: bool) -> Self {
        self.validate_operators = validate;
        self
    }

    /// Enables or disables the per-generation fitness history.
    pub fn with_keep_history(mut self, keep: bool) -> Self {
        self.keep_history = keep;
        self
    }

    /// Replaces the adaptive control constants.
    pub fn with_adaptive(mut self, adaptive: AdaptiveConfig) -> Self {
        self.adaptive = adaptive;
        self
    }

    /// Effective tournament size: the explicit one, or 5% of the
    /// population (at least 2).
    pub fn tournament_size(&self) -> usize {
        self.tournament_size
            .unwrap_or_else(|| derived_tournament_size(self.population_size))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ArgumentError> {
        if self.population_size == 0 {
            return Err(ArgumentError::PopulationSize);
        }
        if self.max_generations == 0 {
            return Err(ArgumentError::GenerationBudget);
        }
        if let Some(k) = self.tournament_size {
            if k == 0 {
                return Err(ArgumentError::TournamentTooSmall);
            }
            if k > self.population_size {
                return Err(ArgumentError::TournamentTooLarge {
                    tournament: k,
                    population: self.population_size,
                });
            }
        }
        check_probability("crossover rate", self.crossover_rate)?;
        check_probability("mutation rate", self.mutation_rate)?;
        if self.report_interval == 0 {
            return Err(ArgumentError::ReportInterval);
        }
        Ok(())
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), ArgumentError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ArgumentError::Probability { name, value })
    }
}

/// Constants of the stagnation response.
///
/// All generation arithmetic uses the 1-based generation counter and the
/// count of consecutive non-improving generations.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AdaptiveConfig {
    /// Every this many stagnant generations the rates are nudged.
    pub nudge_every: usize,

    /// Added to the mutation rate on each nudge.
    pub mutation_step: f64,

    /// Subtracted from the crossover rate on each nudge.
    pub crossover_step: f64,

    /// Length of the rolling generation window.
    pub window: usize,

    /// Generations past this offset within the window count as late phase.
    pub late_phase: usize,

    /// Stagnation above which a late-phase generation switches strategy.
    pub switch_after: usize,

    /// Mutation bombs fire in the late phase when
    /// `stagnation % bomb_modulus > bomb_threshold`.
    pub bomb_modulus: usize,

    /// See [`bomb_modulus`](Self::bomb_modulus).
    pub bomb_threshold: usize,

    /// The run stops once stagnation reaches this many generations.
    pub stagnation_ceiling: usize,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            nudge_every: 600,
            mutation_step: 0.005,
            crossover_step: 0.02,
            window: 1000,
            late_phase: 800,
            switch_after: 300,
            bomb_modulus: 100,
            bomb_threshold: 90,
            stagnation_ceiling: 15_000,
        }
    }
}
