//! # Exact Enumeration
//!
//! $$
//! m = \sum_{i=0}^{n-1} x_i\,2^{\,n-1-i},\qquad m = 0,1,\dots,2^n-1
//! $$
//!
//! Brute-force search over every binary assignment. Assignments are visited in
//! ascending `m` with position 0 as the most significant bit, and the best value
//! only moves on a strict improvement, so ties resolve to the smallest `m`.

use ndarray::Array2;
use rayon::prelude::*;

use super::Solution;
use super::Solver;
use crate::error::QuboError;
use crate::qubo::form::check_square;
use crate::qubo::form::selected_energy;

/// Largest problem size whose assignments fit a `u64` index.
pub const MAX_EXACT_VARIABLES: usize = 63;

/// Each parallel task scans `2^CHUNK_BITS` consecutive assignments.
const CHUNK_BITS: usize = 12;

/// Exhaustive QUBO minimizer. Runtime is `O(2^n n^2)`; callers bound `n`.
#[derive(Clone, Copy, Debug)]
pub struct ExactEnumerationSolver {
  /// Problems with at least this many variables are scanned in parallel.
  pub parallel_threshold: usize,
}

impl Default for ExactEnumerationSolver {
  fn default() -> Self {
    Self {
      parallel_threshold: 16,
    }
  }
}

impl ExactEnumerationSolver {
  /// Always scan on the calling thread.
  pub fn sequential() -> Self {
    Self {
      parallel_threshold: usize::MAX,
    }
  }
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
  value: f64,
  index: u64,
}

/// Bits of assignment `index`, position 0 most significant.
fn assignment_bits(index: u64, n: usize) -> Vec<u8> {
  (0..n).map(|i| ((index >> (n - 1 - i)) & 1) as u8).collect()
}

/// Best assignment in `[start, end)` under strict improvement.
fn scan_range(q: &Array2<f64>, n: usize, start: u64, end: u64) -> Option<Candidate> {
  let mut best: Option<Candidate> = None;
  let mut best_value = f64::INFINITY;
  let mut selected = Vec::with_capacity(n);

  for index in start..end {
    selected.clear();
    for i in 0..n {
      if (index >> (n - 1 - i)) & 1 == 1 {
        selected.push(i);
      }
    }

    let value = selected_energy(q, &selected);
    if value < best_value {
      best_value = value;
      best = Some(Candidate { value, index });
    }
  }

  best
}

/// Merge two partial minima: lower value wins, equal values keep the earlier index.
fn earlier_minimum(a: Option<Candidate>, b: Option<Candidate>) -> Option<Candidate> {
  match (a, b) {
    (Some(a), Some(b)) => {
      if b.value < a.value || (b.value == a.value && b.index < a.index) {
        Some(b)
      } else {
        Some(a)
      }
    }
    (a, None) => a,
    (None, b) => b,
  }
}

impl Solver for ExactEnumerationSolver {
  fn name(&self) -> &'static str {
    "exact"
  }

  #[tracing::instrument(name = "exact_enumeration", skip_all, fields(n = q.nrows()))]
  fn solve(&self, q: &Array2<f64>) -> Result<Solution, QuboError> {
    let n = check_square(q)?;
    if n > MAX_EXACT_VARIABLES {
      return Err(QuboError::configuration(format!(
        "exact enumeration supports at most {MAX_EXACT_VARIABLES} variables, got {n}"
      )));
    }

    let total = 1u64 << n;
    let parallel = n >= self.parallel_threshold && n > CHUNK_BITS;

    let best = if parallel {
      let chunk = 1u64 << CHUNK_BITS;
      (0..total >> CHUNK_BITS)
        .into_par_iter()
        .map(|c| scan_range(q, n, c * chunk, (c + 1) * chunk))
        .reduce(|| None, earlier_minimum)
    } else {
      scan_range(q, n, 0, total)
    };

    let best = best.ok_or_else(|| {
      QuboError::configuration("qubo matrix produced no comparable objective value")
    })?;

    tracing::debug!(
      index = best.index,
      value = best.value,
      parallel,
      "exact enumeration finished"
    );
    Ok(Solution::new(assignment_bits(best.index, n), best.value))
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::Array2;
  use rand::rngs::StdRng;
  use rand::Rng;
  use rand::SeedableRng;

  use super::*;
  use crate::qubo::build_qubo;
  use crate::qubo::quadratic_form;
  use crate::universe::AssetUniverse;

  fn random_symmetric(rng: &mut StdRng, n: usize) -> Array2<f64> {
    let mut q = Array2::<f64>::zeros((n, n));
    for i in 0..n {
      q[[i, i]] = rng.random_range(-5.0..5.0);
      for j in (i + 1)..n {
        let v = rng.random_range(-3.0..3.0);
        q[[i, j]] = v;
        q[[j, i]] = v;
      }
    }
    q
  }

  fn dense_form(q: &Array2<f64>, x: &[u8]) -> f64 {
    let n = x.len();
    let mut total = 0.0;
    for i in 0..n {
      for j in 0..n {
        total += f64::from(x[i]) * q[[i, j]] * f64::from(x[j]);
      }
    }
    total
  }

  #[test]
  fn enumeration_order_puts_position_zero_first() {
    assert_eq!(assignment_bits(0, 3), vec![0, 0, 0]);
    assert_eq!(assignment_bits(1, 3), vec![0, 0, 1]);
    assert_eq!(assignment_bits(4, 3), vec![1, 0, 0]);
    assert_eq!(assignment_bits(6, 3), vec![1, 1, 0]);
  }

  #[test]
  fn demo_universe_selects_single_asset() {
    let universe = AssetUniverse::demo();
    let q = build_qubo(&universe.mu, &universe.sigma, 2, 1.0, 10.0).unwrap();
    let solution = solve_sequential(&q);

    assert_eq!(solution.x, vec![0, 0, 1, 0, 0]);
    assert_abs_diff_eq!(solution.value, -30.06, epsilon = 1e-9);
    assert_eq!(solution.cardinality(), 1);
  }

  fn solve_sequential(q: &Array2<f64>) -> Solution {
    ExactEnumerationSolver::sequential().solve(q).unwrap()
  }

  #[test]
  fn ties_resolve_to_smallest_enumeration_index() {
    // x = 01 and x = 10 both reach -1; 01 is enumerated first.
    let q = ndarray::array![[-1.0, 1.0], [1.0, -1.0]];
    let solution = solve_sequential(&q);
    assert_eq!(solution.x, vec![0, 1]);
    assert_eq!(solution.value, -1.0);

    // An all-zero matrix ties everywhere; the empty selection comes first.
    let q = Array2::<f64>::zeros((4, 4));
    assert_eq!(solve_sequential(&q).x, vec![0, 0, 0, 0]);
  }

  #[test]
  fn matches_independent_exhaustive_search() {
    let mut rng = StdRng::seed_from_u64(42);
    for n in 1..=12 {
      for _ in 0..3 {
        let q = random_symmetric(&mut rng, n);
        let solution = solve_sequential(&q);

        let mut best = f64::INFINITY;
        for m in 0..(1u64 << n) {
          let x: Vec<u8> = (0..n).map(|i| ((m >> (n - 1 - i)) & 1) as u8).collect();
          best = best.min(dense_form(&q, &x));
        }

        assert_abs_diff_eq!(solution.value, best, epsilon = 1e-9);
        assert_abs_diff_eq!(dense_form(&q, &solution.x), best, epsilon = 1e-9);
        assert_eq!(solution.value, quadratic_form(&q, &solution.x));
      }
    }
  }

  #[test]
  fn parallel_scan_agrees_with_sequential_scan() {
    let mut rng = StdRng::seed_from_u64(3);
    let parallel = ExactEnumerationSolver {
      parallel_threshold: 0,
    };

    for n in [13, 14] {
      let q = random_symmetric(&mut rng, n);
      let a = solve_sequential(&q);
      let b = parallel.solve(&q).unwrap();
      assert_eq!(a, b);
    }
  }

  #[test]
  fn parallel_scan_keeps_earliest_tie_across_chunks() {
    // Selecting exactly one of positions 0 and 1 scores -1, whatever the other
    // bits are. Position 1 alone (index 4096) precedes position 0 alone (8192),
    // and the two sit in different chunks.
    let n = 14;
    let mut q = Array2::<f64>::zeros((n, n));
    q[[0, 0]] = -1.0;
    q[[1, 1]] = -1.0;
    q[[0, 1]] = 1.0;
    q[[1, 0]] = 1.0;

    let parallel = ExactEnumerationSolver {
      parallel_threshold: 0,
    };
    let solution = parallel.solve(&q).unwrap();

    let mut expected = vec![0u8; n];
    expected[1] = 1;
    assert_eq!(solution.x, expected);
    assert_eq!(solution.value, -1.0);
    assert_eq!(solution, solve_sequential(&q));
  }

  #[test]
  fn rejects_degenerate_matrices() {
    let solver = ExactEnumerationSolver::default();
    assert_eq!(
      solver.solve(&Array2::<f64>::zeros((0, 0))),
      Err(QuboError::EmptyInput)
    );
    assert!(matches!(
      solver.solve(&Array2::<f64>::zeros((3, 2))),
      Err(QuboError::Dimension { .. })
    ));
    assert!(matches!(
      solver.solve(&Array2::<f64>::zeros((64, 64))),
      Err(QuboError::Configuration(_))
    ));
  }
}
