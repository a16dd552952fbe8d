//! GA evolutionary loop execution.
//!
//! [`Evolution`] owns one run: the population, the [`SearchState`] and the
//! master RNG. Each generation runs strictly phase after phase:
//! selection → crossover → mutation → evaluation → adaptive control.
//! Within the crossover, mutation and evaluation phases work is spread
//! over rayon with every task owning a disjoint slot (or pair of slots)
//! and its own RNG stream, so results do not depend on scheduling.
//!
//! [`GaRunner`] wraps the loop for one-call use.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use super::adaptive::{AdaptiveController, RunState, SearchState, StopReason};
use super::config::GaConfig;
use super::fitness::{check_permutation, FitnessEvaluator};
use super::operators::{swap_mutation, CrossoverStrategy};
use super::selection::select_population;
use super::types::{best_index, Cost, Individual, Population, Tour};
use crate::error::{Operator, TspError};
use crate::matrix::DistanceMatrix;
use crate::report::{NoopReporter, Reporter};

/// Result of a GA optimization run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaResult {
    /// The best tour found during the entire run. Not necessarily a member
    /// of the final population.
    pub best: Tour,

    /// Cost of `best`.
    pub best_fitness: Cost,

    /// Total number of generations executed.
    pub generations: usize,

    /// Why the run ended.
    pub stop_reason: StopReason,

    /// Tracked best fitness: the initial population's, then one entry per
    /// generation. Never increases.
    ///
    /// Holds `generations + 1` entries, so memory grows with the run length.
    /// Empty when [`GaConfig::keep_history`] is off.
    pub fitness_history: Vec<Cost>,

    /// How many times the strategy was re-drawn.
    pub strategy_switches: usize,

    /// How many mutation bombs fired.
    pub mutation_bombs: usize,

    /// Operator rates and strategy in effect when the run stopped.
    pub final_mutation_rate: f64,
    pub final_crossover_rate: f64,
    pub final_strategy: CrossoverStrategy,
}

/// One GA run over a shared distance matrix.
///
/// ```
/// use tsp_ga::{DistanceMatrix, Evolution, GaConfig, StopReason};
///
/// let m = DistanceMatrix::from_rows(vec![
///     vec![0, 2, 9, 10],
///     vec![2, 0, 6, 4],
///     vec![9, 6, 0, 3],
///     vec![10, 4, 3, 0],
/// ]).unwrap();
/// let mut evo = Evolution::new(&m, GaConfig::new(10, 3).with_seed(1)).unwrap();
/// assert_eq!(evo.step().unwrap(), None);
/// assert_eq!(evo.step().unwrap(), None);
/// assert_eq!(evo.step().unwrap(), Some(StopReason::GenerationBudget));
/// ```
pub struct Evolution<'m> {
    matrix: &'m DistanceMatrix,
    config: GaConfig,
    tournament_size: usize,
    controller: AdaptiveController,
    population: Population,
    state: SearchState,
    status: RunState,
    rng: StdRng,
    fitness_history: Vec<Cost>,
    strategy_switches: usize,
    mutation_bombs: usize,
}

impl<'m> Evolution<'m> {
    /// Validates `config`, then generates and evaluates the initial
    /// population.
    pub fn new(matrix: &'m DistanceMatrix, config: GaConfig) -> Result<Self, TspError> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };

        let n = matrix.len();
        let mut population: Population = (0..config.population_size)
            .map(|_| Tour::random(n, &mut rng))
            .collect();
        evaluate(matrix, &mut population, config.parallel, Operator::Initialization, 0)?;

        let best = population[best_index(&population).unwrap_or(0)].clone();
        let controller = AdaptiveController::new(
            config.adaptive.clone(),
            config.mutation_rate,
            config.crossover_rate,
            config.max_generations,
        );
        let state = controller.initial_state(best, config.strategy);

        let mut fitness_history = Vec::new();
        if config.keep_history {
            fitness_history.reserve(config.max_generations.min(1 << 16) + 1);
            fitness_history.push(state.best.fitness());
        }

        Ok(Self {
            matrix,
            tournament_size: config.tournament_size(),
            config,
            controller,
            population,
            state,
            status: RunState::Running,
            rng,
            fitness_history,
            strategy_switches: 0,
            mutation_bombs: 0,
        })
    }

    /// Runs one generation.
    ///
    /// Returns the stop reason once the run has stopped; further calls keep
    /// returning it without doing any work.
    pub fn step(&mut self) -> Result<Option<StopReason>, TspError> {
        if let RunState::Stopped(reason) = self.status {
            return Ok(Some(reason));
        }

        self.state.generation += 1;
        let generation = self.state.generation;
        let parallel = self.config.parallel;

        let mut next = select_population(&self.population, self.tournament_size, &mut self.rng);

        let strategy = self.state.strategy;
        crossover_population(
            &mut next,
            strategy,
            self.state.crossover_rate,
            self.rng.random(),
            parallel,
        );
        if self.config.validate_operators {
            check_population(&next, self.matrix.len(), Operator::Crossover(strategy), generation)?;
        }

        mutate_population(&mut next, self.state.mutation_rate, self.rng.random(), parallel);
        evaluate(self.matrix, &mut next, parallel, Operator::Mutation, generation)?;

        self.population = next;

        let gen_best = &self.population[best_index(&self.population).unwrap_or(0)];
        let decision = self.controller.observe(&mut self.state, gen_best, &mut self.rng);
        if self.config.keep_history {
            self.fitness_history.push(self.state.best.fitness());
        }

        tracing::trace!(
            generation,
            generation_best = gen_best.fitness(),
            best = self.state.best.fitness(),
            stagnation = self.state.stagnation,
            "generation done"
        );

        if decision.switched_to.is_some() {
            self.strategy_switches += 1;
        }

        if let Some(reason) = decision.stop {
            self.status = RunState::Stopped(reason);
            return Ok(Some(reason));
        }

        if decision.bomb {
            self.mutation_bomb()?;
        }

        Ok(None)
    }

    /// Swap-mutates every tour once and re-evaluates the population. The
    /// configured mutation rate is untouched.
    pub fn mutation_bomb(&mut self) -> Result<(), TspError> {
        let generation = self.state.generation;
        tracing::debug!(generation, stagnation = self.state.stagnation, "mutation bomb");
        mutate_population(&mut self.population, 1.0, self.rng.random(), self.config.parallel);
        evaluate(
            self.matrix,
            &mut self.population,
            self.config.parallel,
            Operator::MutationBomb,
            generation,
        )?;
        self.mutation_bombs += 1;
        Ok(())
    }

    /// Drives the run until it stops, reporting progress along the way.
    ///
    /// `cancel` is checked only between generations.
    pub fn run<Rep: Reporter + ?Sized>(
        mut self,
        reporter: &mut Rep,
        cancel: Option<&AtomicBool>,
    ) -> Result<GaResult, TspError> {
        let span = tracing::info_span!(
            "evolve",
            nodes = self.matrix.len(),
            population = self.config.population_size
        );
        let _guard = span.enter();

        tracing::info!(
            max_generations = self.config.max_generations,
            tournament_size = self.tournament_size,
            strategy = %self.state.strategy,
            initial_best = self.state.best.fitness(),
            "starting run"
        );

        let reason = loop {
            if let Some(flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    self.status = RunState::Stopped(StopReason::Cancelled);
                    break StopReason::Cancelled;
                }
            }

            let stopped = self.step()?;
            if self.state.generation % self.config.report_interval == 0 {
                reporter.progress(self.state.generation, &self.state.best);
            }
            if let Some(reason) = stopped {
                break reason;
            }
        };

        let result = self.into_result(reason);
        tracing::info!(
            reason = %result.stop_reason,
            generations = result.generations,
            best = result.best_fitness,
            switches = result.strategy_switches,
            bombs = result.mutation_bombs,
            "run stopped"
        );
        reporter.finished(&result);
        Ok(result)
    }

    fn into_result(self, stop_reason: StopReason) -> GaResult {
        GaResult {
            best_fitness: self.state.best.fitness(),
            best: self.state.best,
            generations: self.state.generation,
            stop_reason,
            fitness_history: self.fitness_history,
            strategy_switches: self.strategy_switches,
            mutation_bombs: self.mutation_bombs,
            final_mutation_rate: self.state.mutation_rate,
            final_crossover_rate: self.state.crossover_rate,
            final_strategy: self.state.strategy,
        }
    }

    /// The current population.
    pub fn population(&self) -> &[Tour] {
        &self.population
    }

    /// Cross-generation bookkeeping.
    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn status(&self) -> RunState {
        self.status
    }

    /// Independent copy of the best tour seen so far.
    pub fn best(&self) -> &Tour {
        &self.state.best
    }

    pub fn fitness_history(&self) -> &[Cost] {
        &self.fitness_history
    }
}

/// Executes the GA evolutionary loop in one call.
///
/// # Usage
///
/// ```
/// use tsp_ga::{DistanceMatrix, GaConfig, GaRunner};
///
/// let m: DistanceMatrix = "3\n0\n4 0\n5 6 0\n".parse().unwrap();
/// let result = GaRunner::run(&m, &GaConfig::new(8, 20).with_seed(3)).unwrap();
/// assert_eq!(result.best_fitness, 15);
/// ```
pub struct GaRunner;

impl GaRunner {
    /// Runs the GA optimization.
    pub fn run(matrix: &DistanceMatrix, config: &GaConfig) -> Result<GaResult, TspError> {
        Self::run_with(matrix, config, &mut NoopReporter, None)
    }

    /// Runs the GA with an optional cancellation token.
    ///
    /// If `cancel` is `Some` and the flag is set to `true`, the GA will
    /// stop at the next generation boundary and return the best tour found
    /// so far.
    pub fn run_with_cancel(
        matrix: &DistanceMatrix,
        config: &GaConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<GaResult, TspError> {
        Self::run_with(matrix, config, &mut NoopReporter, cancel.as_deref())
    }

    /// Runs the GA, feeding progress to `reporter`.
    pub fn run_with<Rep: Reporter + ?Sized>(
        matrix: &DistanceMatrix,
        config: &GaConfig,
        reporter: &mut Rep,
        cancel: Option<&AtomicBool>,
    ) -> Result<GaResult, TspError> {
        Evolution::new(matrix, config.clone())?.run(reporter, cancel)
    }
}

// ============================================================================
// Population phases
// ============================================================================

/// Independent RNG stream for one slot of one phase.
fn slot_rng(phase_seed: u64, slot: usize) -> StdRng {
    StdRng::seed_from_u64(phase_seed.wrapping_add(slot as u64))
}

/// Recombines pairs `(0, 1), (2, 3), ...` with probability `rate`,
/// replacing both members by the children. An odd last tour passes
/// through.
///
/// # Panics
/// Panics if `rate` is outside `[0, 1]`, or if a pair's tours differ in
/// length.
pub fn crossover_population(
    population: &mut [Tour],
    strategy: CrossoverStrategy,
    rate: f64,
    phase_seed: u64,
    parallel: bool,
) {
    let recombine = |(i, pair): (usize, &mut [Tour])| {
        if pair.len() < 2 {
            return;
        }
        let mut rng = slot_rng(phase_seed, i);
        if rng.random_bool(rate) {
            let (c1, c2) = strategy.apply(pair[0].cities(), pair[1].cities(), &mut rng);
            pair[0] = Tour::new(c1);
            pair[1] = Tour::new(c2);
        }
    };

    if parallel {
        population.par_chunks_mut(2).enumerate().for_each(recombine);
    } else {
        population.chunks_mut(2).enumerate().for_each(recombine);
    }
}

/// Swap-mutates each tour with probability `rate`, invalidating the
/// cached cost of every mutated tour.
///
/// # Panics
/// Panics if `rate` is outside `[0, 1]`.
pub fn mutate_population(population: &mut [Tour], rate: f64, phase_seed: u64, parallel: bool) {
    let mutate = |(i, tour): (usize, &mut Tour)| {
        let mut rng = slot_rng(phase_seed, i);
        if rng.random_bool(rate) {
            swap_mutation(tour.cities_mut(), &mut rng);
        }
    };

    if parallel {
        population.par_iter_mut().enumerate().for_each(mutate);
    } else {
        population.iter_mut().enumerate().for_each(mutate);
    }
}

fn check_population(
    population: &[Tour],
    n: usize,
    operator: Operator,
    generation: usize,
) -> Result<(), TspError> {
    population
        .iter()
        .try_for_each(|tour| check_permutation(tour.cities(), n))
        .map_err(|source| TspError::InvalidPermutation {
            operator,
            generation,
            source,
        })
}

fn evaluate(
    matrix: &DistanceMatrix,
    population: &mut [Tour],
    parallel: bool,
    after: Operator,
    generation: usize,
) -> Result<(), TspError> {
    FitnessEvaluator::new(matrix)
        .evaluate_population(population, parallel)
        .map_err(|(index, source)| {
            tracing::error!(%after, generation, index, %source, "invalid tour");
            TspError::InvalidPermutation {
                operator: after,
                generation,
                source,
            }
        })
}

// ============================================================================
// Tests
// ============================================================================
