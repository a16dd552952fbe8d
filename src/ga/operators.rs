//! Permutation crossover and mutation operators.
//!
//! Every operator here maps valid permutations of `0..n` to valid
//! permutations of `0..n`, and every child owns a freshly allocated
//! ordering.
//!
//! # Crossover Operators
//!
//! - [`pmx_crossover`] (PMX): Goldberg & Lingle (1985), preserves absolute position
//! - [`order_crossover`] (OX): Davis (1985), preserves relative order
//! - [`cycle_crossover`] (CX): Oliver, Smith & Holland (1987), every gene keeps
//!   the position it had in one of the parents
//!
//! # Mutation Operators
//!
//! - [`swap_mutation`]: exchange two distinct random positions, O(1)
//!
//! # References
//!
//! - Davis (1985), "Applying Adaptive Algorithms to Epistatic Domains"
//! - Goldberg & Lingle (1985), "Alleles, Loci, and the Traveling Salesman Problem"
//! - Oliver, Smith & Holland (1987), "A Study of Permutation Crossover
//!   Operators on the Traveling Salesman Problem"

use std::fmt;
use std::str::FromStr;

use rand::Rng;

use crate::error::TspError;

// ============================================================================
// Strategy
// ============================================================================

/// The crossover operator applied to selected pairs.
///
/// ```
/// use tsp_ga::CrossoverStrategy;
///
/// let s: CrossoverStrategy = "ox".parse().unwrap();
/// assert_eq!(s, CrossoverStrategy::Ox);
/// assert!("erx".parse::<CrossoverStrategy>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CrossoverStrategy {
    /// Partially Mapped Crossover.
    #[default]
    Pmx,
    /// Order Crossover.
    Ox,
    /// Cycle Crossover.
    Cx,
}

impl CrossoverStrategy {
    /// Every supported strategy.
    pub const ALL: [CrossoverStrategy; 3] = [
        CrossoverStrategy::Pmx,
        CrossoverStrategy::Ox,
        CrossoverStrategy::Cx,
    ];

    /// Picks a strategy uniformly at random. May return the current one.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Recombines two parents with this strategy.
    ///
    /// # Panics
    /// Panics if parents have different lengths or are empty.
    pub fn apply<R: Rng>(
        self,
        parent1: &[usize],
        parent2: &[usize],
        rng: &mut R,
    ) -> (Vec<usize>, Vec<usize>) {
        match self {
            CrossoverStrategy::Pmx => pmx_crossover(parent1, parent2, rng),
            CrossoverStrategy::Ox => order_crossover(parent1, parent2, rng),
            CrossoverStrategy::Cx => cycle_crossover(parent1, parent2, rng),
        }
    }
}

impl fmt::Display for CrossoverStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CrossoverStrategy::Pmx => "PMX",
            CrossoverStrategy::Ox => "OX",
            CrossoverStrategy::Cx => "CX",
        })
    }
}

impl FromStr for CrossoverStrategy {
    type Err = TspError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pmx" => Ok(CrossoverStrategy::Pmx),
            "ox" => Ok(CrossoverStrategy::Ox),
            "cx" => Ok(CrossoverStrategy::Cx),
            _ => Err(TspError::UnsupportedStrategy(s.to_string())),
        }
    }
}

// ============================================================================
// Crossover operators
// ============================================================================

/// Partially Mapped Crossover (PMX).
///
/// # Algorithm
///
/// 1. Pick cut points `0 < a < b < n`
/// 2. Child1 takes parent2's segment `[a, b)`, child2 takes parent1's
/// 3. Every other position keeps the child's own parent's value; if that
///    value already sits in the copied segment, follow the segment mapping
///    (other parent's segment to this parent's segment, position by
///    position) until a value outside the segment is reached
///
/// Parents shorter than 3 are returned unchanged.
///
/// # Complexity
/// O(n) time, O(n) space
///
/// # Panics
/// Panics if parents have different lengths or are empty.
pub fn pmx_crossover<R: Rng>(
    parent1: &[usize],
    parent2: &[usize],
    rng: &mut R,
) -> (Vec<usize>, Vec<usize>) {
    let n = parent1.len();
    assert_eq!(n, parent2.len(), "parents must have equal length");
    assert!(n > 0, "parents must not be empty");

    let Some((a, b)) = cut_points(n, rng) else {
        return (parent1.to_vec(), parent2.to_vec());
    };

    (
        pmx_build_child(parent1, parent2, a, b),
        pmx_build_child(parent2, parent1, a, b),
    )
}

/// Build one PMX child: segment from `other`, the rest mapped from `own`.
fn pmx_build_child(own: &[usize], other: &[usize], a: usize, b: usize) -> Vec<usize> {
    let n = own.len();
    let mut child = own.to_vec();
    // value -> position inside the copied segment
    let mut segment_pos = vec![usize::MAX; n];

    for i in a..b {
        child[i] = other[i];
        segment_pos[other[i]] = i;
    }

    for i in (0..a).chain(b..n) {
        let mut value = own[i];
        while segment_pos[value] != usize::MAX {
            value = own[segment_pos[value]];
        }
        child[i] = value;
    }

    child
}

/// Order Crossover (OX).
///
/// # Algorithm (Davis, 1985)
///
/// 1. Pick cut points `0 < a < b < n`
/// 2. Child1 copies parent1's segment `[a, b)` to the same positions
/// 3. Starting at position `b` and wrapping around, fill the remaining
///    positions by scanning parent2 from position `b` (also wrapping),
///    skipping values already in the segment
///
/// Child2 is symmetric with the parents swapped. Parents shorter than 3
/// are returned unchanged.
///
/// # Complexity
/// O(n) time, O(n) space
///
/// # Panics
/// Panics if parents have different lengths or are empty.
pub fn order_crossover<R: Rng>(
    parent1: &[usize],
    parent2: &[usize],
    rng: &mut R,
) -> (Vec<usize>, Vec<usize>) {
    let n = parent1.len();
    assert_eq!(n, parent2.len(), "parents must have equal length");
    assert!(n > 0, "parents must not be empty");

    let Some((a, b)) = cut_points(n, rng) else {
        return (parent1.to_vec(), parent2.to_vec());
    };

    (
        ox_build_child(parent1, parent2, a, b),
        ox_build_child(parent2, parent1, a, b),
    )
}

/// Build one OX child: copy segment from `template`, fill from `donor`.
fn ox_build_child(template: &[usize], donor: &[usize], a: usize, b: usize) -> Vec<usize> {
    let n = template.len();
    let mut child = vec![usize::MAX; n];
    let mut in_segment = vec![false; n];

    for i in a..b {
        child[i] = template[i];
        in_segment[template[i]] = true;
    }

    let mut pos = b % n;
    for offset in 0..n {
        let val = donor[(b + offset) % n];
        if !in_segment[val] {
            child[pos] = val;
            pos = (pos + 1) % n;
        }
    }

    child
}

/// Cycle Crossover (CX).
///
/// Starting at a random position, follows the cycle
/// `position -> parent2 value -> position of that value in parent1`
/// until it closes. Child1 takes parent2's values on the cycle and its
/// own values elsewhere; child2 is symmetric.
///
/// When the cycle covers every position (the children would just swap
/// parents) or no cycle closes within `n` steps, the parents are returned
/// unchanged.
///
/// # Complexity
/// O(n) time, O(n) space
///
/// # Panics
/// Panics if parents have different lengths or are empty.
pub fn cycle_crossover<R: Rng>(
    parent1: &[usize],
    parent2: &[usize],
    rng: &mut R,
) -> (Vec<usize>, Vec<usize>) {
    let n = parent1.len();
    assert_eq!(n, parent2.len(), "parents must have equal length");
    assert!(n > 0, "parents must not be empty");

    let start = rng.random_range(0..n);
    let on_cycle = match find_cycle(parent1, parent2, start) {
        Some((mask, len)) if len < n => mask,
        _ => return (parent1.to_vec(), parent2.to_vec()),
    };

    let mut child1 = parent1.to_vec();
    let mut child2 = parent2.to_vec();
    for (i, &c) in on_cycle.iter().enumerate() {
        if c {
            child1[i] = parent2[i];
            child2[i] = parent1[i];
        }
    }
    (child1, child2)
}

/// Marks the positions of the cycle through `start`, returning the mask
/// and the cycle length, or `None` if it does not close within `n` steps.
fn find_cycle(parent1: &[usize], parent2: &[usize], start: usize) -> Option<(Vec<bool>, usize)> {
    let n = parent1.len();
    let mut pos_in_p1 = vec![usize::MAX; n];
    for (i, &v) in parent1.iter().enumerate() {
        *pos_in_p1.get_mut(v)? = i;
    }

    let mut on_cycle = vec![false; n];
    let mut pos = start;
    for len in 1..=n {
        on_cycle[pos] = true;
        let next = *pos_in_p1.get(parent2[pos])?;
        if next == start {
            return Some((on_cycle, len));
        }
        if next == usize::MAX || on_cycle[next] {
            return None;
        }
        pos = next;
    }
    None
}

// ============================================================================
// Mutation operators
// ============================================================================

/// Swap mutation: exchange two distinct random positions.
///
/// No-op for permutations shorter than 2.
///
/// # Complexity
/// O(1)
pub fn swap_mutation<R: Rng>(perm: &mut [usize], rng: &mut R) {
    let n = perm.len();
    if n < 2 {
        return;
    }
    let i = rng.random_range(0..n);
    let mut j = rng.random_range(0..n - 1);
    if j >= i {
        j += 1;
    }
    perm.swap(i, j);
}

// ============================================================================
// Helpers
// ============================================================================

/// Picks two distinct cut points `0 < a < b < n` uniformly, or `None` when
/// `n < 3` leaves no room for an interior segment.
fn cut_points<R: Rng>(n: usize, rng: &mut R) -> Option<(usize, usize)> {
    if n < 3 {
        return None;
    }
    let a = rng.random_range(1..n);
    let mut b = rng.random_range(1..n - 1);
    if b >= a {
        b += 1;
    }
    Some(if a < b { (a, b) } else { (b, a) })
}

// ============================================================================
// Tests
// ============================================================================
