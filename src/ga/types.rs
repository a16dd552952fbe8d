//! Core data model: tours, populations, and the [`Individual`] seam used
//! by selection.

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;

/// Integer travel cost. Fitness is the total cost of a tour; lower is better.
pub type Cost = u64;

/// A fixed-size, index-addressable working set of tours.
pub type Population = Vec<Tour>;

/// A candidate solution ranked by fitness.
///
/// Lower fitness is better (minimization). Selection is written against
/// this trait rather than against [`Tour`] directly.
pub trait Individual: Clone + Send + Sync {
    /// Returns the current fitness.
    fn fitness(&self) -> Cost;
}

/// One cyclic ordering of all nodes plus its cached cost.
///
/// The cached cost is cleared whenever the ordering changes through
/// [`cities_mut`](Tour::cities_mut) and must be refreshed by the
/// [`FitnessEvaluator`](super::FitnessEvaluator) before it is relied on.
/// An unevaluated tour ranks as [`Cost::MAX`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tour {
    cities: Vec<usize>,
    cost: Option<Cost>,
}

impl Tour {
    /// Wraps an ordering without evaluating it.
    pub fn new(cities: Vec<usize>) -> Self {
        Self { cities, cost: None }
    }

    /// A uniformly random permutation of `0..n`.
    pub fn random<R: Rng>(n: usize, rng: &mut R) -> Self {
        let mut cities: Vec<usize> = (0..n).collect();
        cities.shuffle(rng);
        Self::new(cities)
    }

    /// The node ordering.
    #[inline]
    pub fn cities(&self) -> &[usize] {
        &self.cities
    }

    /// Mutable access to the ordering. Invalidates the cached cost.
    #[inline]
    pub fn cities_mut(&mut self) -> &mut [usize] {
        self.cost = None;
        &mut self.cities
    }

    /// The cached cost, or `None` if the tour changed since its last
    /// evaluation.
    #[inline]
    pub fn cost(&self) -> Option<Cost> {
        self.cost
    }

    #[inline]
    pub fn is_evaluated(&self) -> bool {
        self.cost.is_some()
    }

    #[inline]
    pub(crate) fn set_cost(&mut self, cost: Cost) {
        self.cost = Some(cost);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Consumes the tour, returning the ordering.
    pub fn into_cities(self) -> Vec<usize> {
        self.cities
    }
}

impl Individual for Tour {
    fn fitness(&self) -> Cost {
        self.cost.unwrap_or(Cost::MAX)
    }
}

/// Formats as `node-node-...-node cost`; an unevaluated tour prints `?`
/// for its cost.
impl fmt::Display for Tour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, city) in self.cities.iter().enumerate() {
            if i > 0 {
                f.write_str("-")?;
            }
            write!(f, "{city}")?;
        }
        match self.cost {
            Some(cost) => write!(f, " {cost}"),
            None => f.write_str(" ?"),
        }
    }
}

/// Index of the lowest-fitness member; ties go to the first one.
///
/// Returns `None` for an empty slice.
pub fn best_index<I: Individual>(population: &[I]) -> Option<usize> {
    let mut best: Option<(usize, Cost)> = None;
    for (i, ind) in population.iter().enumerate() {
        let f = ind.fitness();
        match best {
            Some((_, b)) if f >= b => {}
            _ => best = Some((i, f)),
        }
    }
    best.map(|(i, _)| i)
}
