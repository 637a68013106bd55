//! # Solvers
//!
//! $$
//! \mathbf{x}^\* = \arg\min_{\mathbf{x}\in\{0,1\}^n} \mathbf{x}^\top Q \mathbf{x}
//! $$
//!
//! Shared solver contract with an exhaustive and a variational implementation.

use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use impl_new_derive::ImplNew;
use ndarray::Array2;
use serde::Serialize;

use crate::error::QuboError;

pub mod exact;
pub mod qaoa;
pub mod variational;

pub use exact::ExactEnumerationSolver;
pub use qaoa::QaoaBackend;
pub use qaoa::QaoaConfig;
pub use variational::ApproximateVariationalSolver;
pub use variational::BackendOutcome;
pub use variational::VariationalBackend;

/// Binary assignment together with its objective `x^T Q x`.
#[derive(ImplNew, Clone, Debug, PartialEq, Serialize)]
pub struct Solution {
  /// One bit per asset, in asset order.
  pub x: Vec<u8>,
  /// Objective value of `x` under the solved matrix.
  pub value: f64,
}

impl Solution {
  /// Number of selected assets.
  pub fn cardinality(&self) -> usize {
    self.x.iter().filter(|&&b| b == 1).count()
  }
}

/// Common contract for QUBO minimizers.
pub trait Solver: Send + Sync {
  /// Short identifier used in logs and reports.
  fn name(&self) -> &'static str;

  /// Minimize `x^T Q x` over binary `x`.
  fn solve(&self, q: &Array2<f64>) -> Result<Solution, QuboError>;
}

/// Selector for the available solver implementations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverKind {
  /// Exhaustive enumeration, optimal and deterministic.
  #[default]
  Exact,
  /// Variational backend, best effort.
  Variational,
}

impl SolverKind {
  /// Instantiate the solver behind this selector.
  ///
  /// `depth` and `backend` are only consulted by [`SolverKind::Variational`].
  pub fn build(
    self,
    depth: usize,
    backend: Option<Arc<dyn VariationalBackend>>,
  ) -> Box<dyn Solver> {
    match self {
      SolverKind::Exact => Box::new(ExactEnumerationSolver::default()),
      SolverKind::Variational => {
        let solver = ApproximateVariationalSolver::new(depth);
        match backend {
          Some(backend) => Box::new(solver.with_backend(backend)),
          None => Box::new(solver),
        }
      }
    }
  }
}

impl FromStr for SolverKind {
  type Err = QuboError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "exact" | "brute-force" | "bruteforce" | "classical" => Ok(Self::Exact),
      "variational" | "qaoa" | "quantum" => Ok(Self::Variational),
      other => Err(QuboError::configuration(format!("unknown solver '{other}'"))),
    }
  }
}

impl Display for SolverKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      SolverKind::Exact => write!(f, "exact"),
      SolverKind::Variational => write!(f, "variational"),
    }
  }
}

/// Exhaustively minimize `q` with the default [`ExactEnumerationSolver`].
pub fn solve_exact(q: &Array2<f64>) -> Result<Solution, QuboError> {
  ExactEnumerationSolver::default().solve(q)
}

/// Minimize `q` through a variational backend of the given circuit depth.
///
/// Fails with [`QuboError::SolverUnavailable`] when `backend` is `None`.
pub fn solve_approximate(
  q: &Array2<f64>,
  depth: usize,
  backend: Option<&dyn VariationalBackend>,
) -> Result<Solution, QuboError> {
  variational::run_backend(q, depth, backend)
}
