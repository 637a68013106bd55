//! # Variational Adapter
//!
//! $$
//! Q \;\mapsto\; \Big(\{Q_{ii}\}_i,\ \{Q_{ij}\}_{i<j,\,Q_{ij}\neq 0}\Big) \;\xrightarrow{\text{backend}(p)}\; \mathbf{x}
//! $$
//!
//! Hands a QUBO to an external variational search and validates what comes
//! back. No optimality guarantee; results depend on the backend's randomness.

use std::sync::Arc;

use ndarray::Array2;

use super::Solution;
use super::Solver;
use crate::error::QuboError;
use crate::qubo::form::check_binary;
use crate::qubo::form::check_square;
use crate::qubo::form::quadratic_form;
use crate::qubo::program::QuadraticProgram;

/// Raw answer of a variational backend.
#[derive(Clone, Debug, PartialEq)]
pub struct BackendOutcome {
  /// Candidate assignment, one bit per program variable.
  pub x: Vec<u8>,
  /// Program energy of `x` as the backend measured it.
  pub energy: f64,
  /// Optimized expectation value, when the backend exposes one.
  pub expectation: Option<f64>,
  /// Outer-loop iterations spent.
  pub iterations: u64,
}

/// External variational search over a [`QuadraticProgram`].
pub trait VariationalBackend: Send + Sync {
  /// Short identifier used in logs.
  fn name(&self) -> &'static str;

  /// Search for a low-energy assignment with `depth` circuit layers.
  fn minimize(&self, program: &QuadraticProgram, depth: usize) -> anyhow::Result<BackendOutcome>;
}

/// [`Solver`] that delegates to a [`VariationalBackend`].
#[derive(Clone)]
pub struct ApproximateVariationalSolver {
  backend: Option<Arc<dyn VariationalBackend>>,
  depth: usize,
}

impl ApproximateVariationalSolver {
  /// Solver with the given search depth and no backend attached yet.
  pub fn new(depth: usize) -> Self {
    Self {
      backend: None,
      depth,
    }
  }

  /// Attach the backend that performs the search.
  pub fn with_backend(mut self, backend: Arc<dyn VariationalBackend>) -> Self {
    self.backend = Some(backend);
    self
  }

  pub fn depth(&self) -> usize {
    self.depth
  }
}

impl std::fmt::Debug for ApproximateVariationalSolver {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ApproximateVariationalSolver")
      .field("backend", &self.backend.as_ref().map(|b| b.name()))
      .field("depth", &self.depth)
      .finish()
  }
}

impl Solver for ApproximateVariationalSolver {
  fn name(&self) -> &'static str {
    "variational"
  }

  #[tracing::instrument(name = "variational", skip_all, fields(n = q.nrows(), depth = self.depth))]
  fn solve(&self, q: &Array2<f64>) -> Result<Solution, QuboError> {
    run_backend(q, self.depth, self.backend.as_deref())
  }
}

pub(crate) fn run_backend(
  q: &Array2<f64>,
  depth: usize,
  backend: Option<&dyn VariationalBackend>,
) -> Result<Solution, QuboError> {
  let n = check_square(q)?;
  let backend =
    backend.ok_or_else(|| QuboError::unavailable("no variational backend configured"))?;
  if depth == 0 {
    return Err(QuboError::unavailable("variational depth must be at least 1"));
  }

  let program = QuadraticProgram::from_qubo(q)?;
  let outcome = match backend.minimize(&program, depth) {
    Ok(outcome) => outcome,
    Err(err) => {
      tracing::warn!(backend = backend.name(), error = %err, "variational backend failed");
      return Err(QuboError::unavailable(format!(
        "{} backend failed: {err:#}",
        backend.name()
      )));
    }
  };

  if outcome.x.len() != n {
    return Err(QuboError::unavailable(format!(
      "{} backend returned {} bits for {n} variables",
      backend.name(),
      outcome.x.len()
    )));
  }
  if let Err(err) = check_binary(&outcome.x) {
    return Err(QuboError::unavailable(format!(
      "{} backend returned an invalid assignment: {err}",
      backend.name()
    )));
  }

  let value = quadratic_form(q, &outcome.x);
  tracing::debug!(
    backend = backend.name(),
    program_energy = outcome.energy,
    expectation = ?outcome.expectation,
    iterations = outcome.iterations,
    value,
    "variational search finished"
  );

  Ok(Solution::new(outcome.x, value))
}
