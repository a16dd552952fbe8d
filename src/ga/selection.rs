//! Tournament selection.
//!
//! Each output slot is filled independently by the best of `k` members
//! sampled uniformly with replacement, so strong tours may be copied many
//! times and weak ones may vanish. All functions assume **minimization**.
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"
//! - Goldberg & Deb (1991), "A Comparative Analysis of Selection Schemes
//!   Used in Genetic Algorithms"

use rand::Rng;

use super::types::Individual;

/// Tournament size derived from the population size: 5% of it, rounded,
/// and never below 2.
///
/// ```
/// use tsp_ga::ga::derived_tournament_size;
///
/// assert_eq!(derived_tournament_size(20), 2);
/// assert_eq!(derived_tournament_size(100), 5);
/// assert_eq!(derived_tournament_size(110), 6);
/// ```
pub fn derived_tournament_size(population_size: usize) -> usize {
    let k = (0.05 * population_size as f64).round() as usize;
    k.max(2)
}

/// Picks the index of the best of `k` uniformly sampled members.
///
/// Ties keep the member sampled first.
///
/// # Panics
/// Panics if `population` is empty.
pub fn tournament<I: Individual, R: Rng>(population: &[I], k: usize, rng: &mut R) -> usize {
    assert!(
        !population.is_empty(),
        "cannot select from empty population"
    );
    let k = k.max(1);
    let n = population.len();

    let mut best_idx = rng.random_range(0..n);
    for _ in 1..k {
        let idx = rng.random_range(0..n);
        if population[idx].fitness() < population[best_idx].fitness() {
            best_idx = idx;
        }
    }
    best_idx
}

/// Builds a new population of the same size by running one tournament
/// per slot. The source population is left untouched; winners are cloned.
pub fn select_population<I: Individual, R: Rng>(
    population: &[I],
    k: usize,
    rng: &mut R,
) -> Vec<I> {
    (0..population.len())
        .map(|_| population[tournament(population, k, rng)].clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::Cost;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[derive(Clone, Debug, PartialEq)]
    struct TestInd {
        id: usize,
        fit: Cost,
    }

    impl Individual for TestInd {
        fn fitness(&self) -> Cost {
            self.fit
        }
    }

    fn make_population(fitnesses: &[Cost]) -> Vec<TestInd> {
        fitnesses
            .iter()
            .enumerate()
            .map(|(id, &fit)| TestInd { id, fit })
            .collect()
    }

    #[test]
    fn test_derived_tournament_size() {
        assert_eq!(derived_tournament_size(1), 2);
        assert_eq!(derived_tournament_size(10), 2);
        assert_eq!(derived_tournament_size(30), 2);
        assert_eq!(derived_tournament_size(50), 3); // 2.5 rounds away from zero
        assert_eq!(derived_tournament_size(200), 10);
    }

    #[test]
    fn test_tournament_favors_best() {
        let pop = make_population(&[10, 5, 1, 8]);
        let mut rng = StdRng::seed_from_u64(42);

        let mut counts = [0u32; 4];
        let n = 10000;
        for _ in 0..n {
            counts[tournament(&pop, 4, &mut rng)] += 1;
        }
        // P(best among 4 draws with replacement) = 1 - (3/4)^4 ~ 0.68
        let best_count = counts[2];
        assert!(
            best_count > 6000,
            "expected best to be selected >60% of the time, got {best_count}/{n}"
        );
    }

    #[test]
    fn test_tournament_size_1_is_random() {
        let pop = make_population(&[10, 5, 1, 8]);
        let mut rng = StdRng::seed_from_u64(42);

        let mut counts = [0u32; 4];
        for _ in 0..10000 {
            counts[tournament(&pop, 1, &mut rng)] += 1;
        }
        for &c in &counts {
            assert!(c > 1500, "expected uniform, got counts: {counts:?}");
        }
    }

    #[test]
    fn test_equal_fitness_is_uniform() {
        let pop = make_population(&[5, 5, 5, 5]);
        let mut rng = StdRng::seed_from_u64(42);

        let mut counts = [0u32; 4];
        for _ in 0..10000 {
            counts[tournament(&pop, 2, &mut rng)] += 1;
        }
        for &c in &counts {
            assert!(
                c > 1500,
                "expected roughly uniform with equal fitness, got {counts:?}"
            );
        }
    }

    #[test]
    fn test_select_population_preserves_size_and_members() {
        let pop = make_population(&[7, 3, 9, 1, 4, 4, 8]);
        let before = pop.clone();
        let mut rng = StdRng::seed_from_u64(9);

        let selected = select_population(&pop, 3, &mut rng);

        assert_eq!(selected.len(), pop.len());
        assert!(selected.iter().all(|s| pop.contains(s)));
        assert_eq!(pop, before);
    }

    #[test]
    fn test_select_population_single_member() {
        let pop = make_population(&[5]);
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(select_population(&pop, 2, &mut rng), pop);
    }

    #[test]
    #[should_panic(expected = "cannot select from empty population")]
    fn test_empty_population_panics() {
        let pop: Vec<TestInd> = vec![];
        let mut rng = StdRng::seed_from_u64(42);
        tournament(&pop, 3, &mut rng);
    }
}
