//! Tour cost evaluation.
//!
//! Evaluation reads only the shared [`DistanceMatrix`] and writes only the
//! tour's own cached cost, so a population can be evaluated in parallel
//! without synchronization.

use rayon::prelude::*;

use super::types::{Cost, Tour};
use crate::error::PermutationError;
use crate::matrix::DistanceMatrix;

/// Checks that `cities` is a permutation of `0..n`.
pub fn check_permutation(cities: &[usize], n: usize) -> Result<(), PermutationError> {
    if cities.len() != n {
        return Err(PermutationError::WrongLength {
            expected: n,
            found: cities.len(),
        });
    }
    let mut seen = vec![false; n];
    for (position, &value) in cities.iter().enumerate() {
        if value >= n {
            return Err(PermutationError::OutOfRange { position, value });
        }
        if seen[value] {
            return Err(PermutationError::Duplicate { position, value });
        }
        seen[value] = true;
    }
    Ok(())
}

/// Computes cycle costs against a shared distance matrix.
#[derive(Debug, Clone, Copy)]
pub struct FitnessEvaluator<'a> {
    matrix: &'a DistanceMatrix,
}

impl<'a> FitnessEvaluator<'a> {
    pub fn new(matrix: &'a DistanceMatrix) -> Self {
        Self { matrix }
    }

    #[inline]
    pub fn matrix(&self) -> &'a DistanceMatrix {
        self.matrix
    }

    /// Total cost of the closed cycle through `cities`, including the edge
    /// from the last node back to the first.
    ///
    /// ```
    /// use tsp_ga::{DistanceMatrix, FitnessEvaluator};
    ///
    /// let m = DistanceMatrix::from_rows(vec![
    ///     vec![0, 10, 35, 40],
    ///     vec![10, 0, 20, 25],
    ///     vec![35, 20, 0, 30],
    ///     vec![40, 25, 30, 0],
    /// ]).unwrap();
    /// let eval = FitnessEvaluator::new(&m);
    /// assert_eq!(eval.cost(&[0, 1, 2, 3]).unwrap(), 100);
    /// ```
    pub fn cost(&self, cities: &[usize]) -> Result<Cost, PermutationError> {
        let n = self.matrix.len();
        check_permutation(cities, n)?;
        Ok(self.cycle_cost(cities))
    }

    // Bounded by n * max entry, which the matrix guarantees fits in a Cost.
    fn cycle_cost(&self, cities: &[usize]) -> Cost {
        let n = cities.len();
        (0..n)
            .map(|i| self.matrix.get(cities[i], cities[(i + 1) % n]))
            .sum()
    }

    /// Evaluates one tour and stores its cost.
    pub fn evaluate(&self, tour: &mut Tour) -> Result<Cost, PermutationError> {
        let cost = self.cost(tour.cities())?;
        tour.set_cost(cost);
        Ok(cost)
    }

    /// Re-evaluates every tour, optionally in parallel.
    ///
    /// On failure reports an offending tour by index (the first one when
    /// sequential).
    pub fn evaluate_population(
        &self,
        population: &mut [Tour],
        parallel: bool,
    ) -> Result<(), (usize, PermutationError)> {
        if parallel {
            population
                .par_iter_mut()
                .enumerate()
                .try_for_each(|(i, tour)| self.evaluate(tour).map(|_| ()).map_err(|e| (i, e)))
        } else {
            population
                .iter_mut()
                .enumerate()
                .try_for_each(|(i, tour)| self.evaluate(tour).map(|_| ()).map_err(|e| (i, e)))
        }
    }
}
