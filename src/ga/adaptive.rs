//! Stagnation-driven operator control.
//!
//! After every fully evaluated generation the [`AdaptiveController`]
//! compares the generation's best tour with the tracked best, updates the
//! [`SearchState`], and tells the loop whether to fire a mutation bomb or
//! stop. It runs single-threaded between parallel phases.

use rand::Rng;

use super::config::AdaptiveConfig;
use super::operators::CrossoverStrategy;
use super::types::{Individual, Tour};

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopReason {
    /// The generation counter reached the configured budget.
    GenerationBudget,
    /// Stagnation reached the hard ceiling.
    StagnationExceeded,
    /// The cancellation flag was observed at a generation boundary.
    Cancelled,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            StopReason::GenerationBudget => "generation budget exhausted",
            StopReason::StagnationExceeded => "stagnation ceiling exceeded",
            StopReason::Cancelled => "cancelled",
        })
    }
}

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Stopped(StopReason),
}

/// State carried across generations besides the population itself.
#[derive(Debug, Clone)]
pub struct SearchState {
    /// Generations completed so far (1-based once the first one ran).
    pub generation: usize,
    /// Consecutive generations without improvement.
    pub stagnation: usize,
    /// Independent copy of the best tour seen.
    pub best: Tour,
    /// Current mutation probability.
    pub mutation_rate: f64,
    /// Current crossover probability.
    pub crossover_rate: f64,
    /// Crossover strategy applied to the next generation.
    pub strategy: CrossoverStrategy,
}

/// Actions the controller requests after observing a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decision {
    /// The generation's best was adopted as the new tracked best.
    pub improved: bool,
    /// Rates were nudged this generation.
    pub nudged: bool,
    /// The strategy was re-drawn; holds the new one.
    pub switched_to: Option<CrossoverStrategy>,
    /// The loop should mutate every tour once.
    pub bomb: bool,
    /// The run must stop.
    pub stop: Option<StopReason>,
}

/// Applies the stagnation response rules.
#[derive(Debug, Clone)]
pub struct AdaptiveController {
    config: AdaptiveConfig,
    default_mutation_rate: f64,
    default_crossover_rate: f64,
    max_generations: usize,
}

impl AdaptiveController {
    pub fn new(
        config: AdaptiveConfig,
        default_mutation_rate: f64,
        default_crossover_rate: f64,
        max_generations: usize,
    ) -> Self {
        Self {
            config,
            default_mutation_rate,
            default_crossover_rate,
            max_generations,
        }
    }

    /// Fresh state for a run whose initial population's best is `best`.
    pub fn initial_state(&self, best: Tour, strategy: CrossoverStrategy) -> SearchState {
        SearchState {
            generation: 0,
            stagnation: 0,
            best,
            mutation_rate: self.default_mutation_rate,
            crossover_rate: self.default_crossover_rate,
            strategy,
        }
    }

    /// Observes the best tour of the generation `state.generation` and
    /// updates `state`.
    ///
    /// Rules, in order:
    ///
    /// 1. A best no worse than the tracked one is adopted and resets
    ///    stagnation; otherwise the rates return to their defaults and
    ///    stagnation grows.
    /// 2. Every `nudge_every` stagnant generations the mutation rate rises
    ///    and the crossover rate falls by one step, clamped to `[0, 1]`.
    /// 3. Late in the window with stagnation above `switch_after`, the
    ///    strategy is re-drawn at random.
    /// 4. Late in the window with `stagnation % bomb_modulus >
    ///    bomb_threshold`, a mutation bomb is requested.
    /// 5. Stagnation at the ceiling stops the run; so does reaching the
    ///    generation budget.
    pub fn observe<R: Rng>(
        &self,
        state: &mut SearchState,
        generation_best: &Tour,
        rng: &mut R,
    ) -> Decision {
        let cfg = &self.config;
        let mut decision = Decision::default();

        if generation_best.fitness() <= state.best.fitness() {
            state.best = generation_best.clone();
            state.stagnation = 0;
            decision.improved = true;
        } else {
            state.mutation_rate = self.default_mutation_rate;
            state.crossover_rate = self.default_crossover_rate;
            state.stagnation += 1;
        }

        if state.stagnation > 0 && state.stagnation % cfg.nudge_every == 0 {
            state.mutation_rate = (state.mutation_rate + cfg.mutation_step).clamp(0.0, 1.0);
            state.crossover_rate = (state.crossover_rate - cfg.crossover_step).clamp(0.0, 1.0);
            decision.nudged = true;
            tracing::debug!(
                generation = state.generation,
                stagnation = state.stagnation,
                mutation_rate = state.mutation_rate,
                crossover_rate = state.crossover_rate,
                "nudged operator rates"
            );
        }

        let late_phase = state.generation % cfg.window > cfg.late_phase;

        if late_phase && state.stagnation > cfg.switch_after {
            let next = CrossoverStrategy::random(rng);
            if next != state.strategy {
                tracing::debug!(
                    generation = state.generation,
                    from = %state.strategy,
                    to = %next,
                    "switched crossover strategy"
                );
            }
            state.strategy = next;
            decision.switched_to = Some(next);
        }

        if late_phase && state.stagnation % cfg.bomb_modulus > cfg.bomb_threshold {
            decision.bomb = true;
        }

        if state.stagnation >= cfg.stagnation_ceiling {
            decision.stop = Some(StopReason::StagnationExceeded);
        } else if state.generation >= self.max_generations {
            decision.stop = Some(StopReason::GenerationBudget);
        }

        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::Cost;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tour_with_cost(cost: Cost) -> Tour {
        let mut t = Tour::new(vec![0, 1, 2]);
        t.set_cost(cost);
        t
    }

    fn controller(budget: usize) -> AdaptiveController {
        AdaptiveController::new(AdaptiveConfig::default(), 0.005, 0.95, budget)
    }

    #[test]
    fn test_improvement_adopts_copy_and_resets() {
        let ctl = controller(100);
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = ctl.initial_state(tour_with_cost(50), CrossoverStrategy::Pmx);
        state.generation = 1;
        state.stagnation = 12;

        let d = ctl.observe(&mut state, &tour_with_cost(50), &mut rng);

        assert!(d.improved, "equal fitness counts as improvement");
        assert_eq!(state.stagnation, 0);
        assert_eq!(state.best.fitness(), 50);
    }

    #[test]
    fn test_regression_resets_rates_and_counts() {
        let ctl = controller(100);
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = ctl.initial_state(tour_with_cost(50), CrossoverStrategy::Pmx);
        state.generation = 1;
        state.mutation_rate = 0.3;
        state.crossover_rate = 0.1;

        let d = ctl.observe(&mut state, &tour_with_cost(60), &mut rng);

        assert!(!d.improved);
        assert_eq!(state.stagnation, 1);
        assert_eq!(state.best.fitness(), 50);
        assert!((state.mutation_rate - 0.005).abs() < 1e-12);
        assert!((state.crossover_rate - 0.95).abs() < 1e-12);
    }

    #[test]
    fn test_nudge_every_600_stagnant_generations() {
        let ctl = controller(10_000);
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = ctl.initial_state(tour_with_cost(50), CrossoverStrategy::Pmx);
        state.generation = 100;
        state.stagnation = 599;

        let d = ctl.observe(&mut state, &tour_with_cost(60), &mut rng);

        assert!(d.nudged);
        assert_eq!(state.stagnation, 600);
        assert!((state.mutation_rate - 0.010).abs() < 1e-12);
        assert!((state.crossover_rate - 0.93).abs() < 1e-12);
    }

    #[test]
    fn test_nudge_is_clamped() {
        let cfg = AdaptiveConfig {
            nudge_every: 1,
            mutation_step: 0.7,
            crossover_step: 0.7,
            ..AdaptiveConfig::default()
        };
        let ctl = AdaptiveController::new(cfg, 0.5, 0.5, 10_000);
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = ctl.initial_state(tour_with_cost(50), CrossoverStrategy::Pmx);
        state.generation = 1;

        ctl.observe(&mut state, &tour_with_cost(60), &mut rng);

        assert_eq!(state.mutation_rate, 1.0);
        assert_eq!(state.crossover_rate, 0.0);
    }

    #[test]
    fn test_switch_only_late_in_window() {
        let ctl = controller(10_000);
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = ctl.initial_state(tour_with_cost(50), CrossoverStrategy::Pmx);

        state.generation = 1500;
        state.stagnation = 400;
        let d = ctl.observe(&mut state, &tour_with_cost(60), &mut rng);
        assert_eq!(d.switched_to, None);

        state.generation = 1801;
        let d = ctl.observe(&mut state, &tour_with_cost(60), &mut rng);
        assert!(d.switched_to.is_some());
        assert_eq!(Some(state.strategy), d.switched_to);
    }

    #[test]
    fn test_bomb_late_in_window_on_stagnation_tail() {
        let ctl = controller(10_000);
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = ctl.initial_state(tour_with_cost(50), CrossoverStrategy::Pmx);

        state.generation = 900;
        state.stagnation = 90; // becomes 91
        let d = ctl.observe(&mut state, &tour_with_cost(60), &mut rng);
        assert!(d.bomb);

        state.generation = 901;
        state.stagnation = 40;
        let d = ctl.observe(&mut state, &tour_with_cost(60), &mut rng);
        assert!(!d.bomb);

        state.generation = 500;
        state.stagnation = 95;
        let d = ctl.observe(&mut state, &tour_with_cost(60), &mut rng);
        assert!(!d.bomb, "early in the window");
    }

    #[test]
    fn test_stagnation_ceiling_stops_before_budget() {
        let ctl = controller(1_000_000);
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = ctl.initial_state(tour_with_cost(50), CrossoverStrategy::Pmx);
        state.generation = 20;
        state.stagnation = 14_999;

        let d = ctl.observe(&mut state, &tour_with_cost(60), &mut rng);

        assert_eq!(d.stop, Some(StopReason::StagnationExceeded));
    }

    #[test]
    fn test_budget_stops() {
        let ctl = controller(20);
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = ctl.initial_state(tour_with_cost(50), CrossoverStrategy::Pmx);

        state.generation = 19;
        assert_eq!(ctl.observe(&mut state, &tour_with_cost(40), &mut rng).stop, None);
        state.generation = 20;
        assert_eq!(
            ctl.observe(&mut state, &tour_with_cost(40), &mut rng).stop,
            Some(StopReason::GenerationBudget)
        );
    }
}
