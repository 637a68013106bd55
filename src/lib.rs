//! # qubo-portfolio
//!
//! $$
//! \min_{\mathbf{x}\in\{0,1\}^n}\ -\mu^\top\mathbf{x} + \lambda\,\mathbf{x}^\top\Sigma\mathbf{x} + \gamma\Big(\sum_i x_i - K\Big)^2
//! $$
//!
//! Cardinality-constrained asset selection reformulated as a QUBO and solved
//! either exhaustively or through a variational backend.
//!
//! ```ignore
//! use qubo_portfolio::prelude::*;
//!
//! let universe = AssetUniverse::demo();
//! let q = build_qubo(&universe.mu, &universe.sigma, 2, 1.0, 10.0)?;
//! let solution = solve_exact(&q)?;
//! let (selected, _) = decode(&universe.tickers, &solution.x)?;
//! ```

pub mod decoder;
pub mod engine;
pub mod error;
pub mod qubo;
pub mod solver;
pub mod universe;

pub use decoder::decode;
pub use engine::SelectionEngine;
pub use engine::SelectionEngineConfig;
pub use engine::SelectionReport;
pub use error::QuboError;
pub use qubo::build_qubo;
pub use qubo::quadratic_form;
pub use solver::solve_approximate;
pub use solver::solve_exact;
pub use solver::Solution;
pub use solver::Solver;
pub use solver::SolverKind;
pub use universe::AssetUniverse;

pub mod prelude {
  pub use crate::decoder::decode;
  pub use crate::engine::SelectionEngine;
  pub use crate::engine::SelectionEngineConfig;
  pub use crate::error::QuboError;
  pub use crate::qubo::build_qubo;
  pub use crate::qubo::quadratic_form;
  pub use crate::solver::solve_approximate;
  pub use crate::solver::solve_exact;
  pub use crate::solver::ApproximateVariationalSolver;
  pub use crate::solver::ExactEnumerationSolver;
  pub use crate::solver::QaoaBackend;
  pub use crate::solver::QaoaConfig;
  pub use crate::solver::Solution;
  pub use crate::solver::Solver;
  pub use crate::solver::SolverKind;
  pub use crate::solver::VariationalBackend;
  pub use crate::universe::AssetUniverse;
  pub use crate::universe::JsonStatistics;
  pub use crate::universe::StatisticsProvider;
}
