//! # Selection Engine
//!
//! $$
//! (\mu, \Sigma) \xrightarrow{\text{build}} Q \xrightarrow{\text{solve}} \mathbf{x}^\* \xrightarrow{\text{decode}} (\text{selected}, \text{not selected})
//! $$
//!
//! Single entry point for the selection pipeline. Outer callers (the CLI,
//! scripts, dashboards) configure it and render the report; none of them
//! re-implement a pipeline step.

use std::sync::Arc;
use std::time::Instant;

use ndarray::Array2;
use serde::Serialize;

use crate::decoder::decode;
use crate::error::QuboError;
use crate::qubo::build_qubo;
use crate::qubo::quadratic_form;
use crate::qubo::rescale_to_max_abs;
use crate::solver::SolverKind;
use crate::solver::VariationalBackend;
use crate::universe::AssetUniverse;
use crate::universe::StatisticsProvider;

/// Runtime configuration for [`SelectionEngine`].
#[derive(Clone, Debug)]
pub struct SelectionEngineConfig {
  /// Number of assets the penalty term targets.
  pub cardinality: usize,
  /// Weight of the covariance risk term.
  pub risk_weight: f64,
  /// Weight of the cardinality penalty.
  pub penalty_weight: f64,
  /// Solver used by [`SelectionEngine::run`].
  pub solver: SolverKind,
  /// Circuit depth for the variational solver.
  pub depth: usize,
  /// Shrink the matrix handed to the solver so no entry exceeds this magnitude.
  pub rescale_max_abs: Option<f64>,
}

impl Default for SelectionEngineConfig {
  fn default() -> Self {
    Self {
      cardinality: 2,
      risk_weight: 1.0,
      penalty_weight: 10.0,
      solver: SolverKind::Exact,
      depth: 1,
      rescale_max_abs: None,
    }
  }
}

/// Everything a presentation layer needs about one selection run.
#[derive(Clone, Debug, Serialize)]
pub struct SelectionReport {
  pub tickers: Vec<String>,
  pub selected: Vec<String>,
  pub not_selected: Vec<String>,
  /// Decision vector, one bit per ticker.
  pub x: Vec<u8>,
  /// `x^T Q x` on the unscaled matrix.
  pub objective: f64,
  pub solver: SolverKind,
  /// Requested cardinality; the selection may differ in size.
  pub target_cardinality: usize,
  /// Per-asset expected returns.
  pub mu: Vec<f64>,
  /// Per-asset variances.
  pub variances: Vec<f64>,
  /// Sum of expected returns of the selected assets.
  pub portfolio_return: f64,
  /// `x^T Sigma x` of the selection.
  pub portfolio_variance: f64,
  /// Divisor applied to the matrix before solving (1.0 when not rescaled).
  pub scale: f64,
  #[serde(skip)]
  pub qubo: Array2<f64>,
}

impl SelectionReport {
  /// Number of selected assets.
  pub fn cardinality(&self) -> usize {
    self.selected.len()
  }
}

/// Pipeline orchestrator: build, solve, decode.
#[derive(Clone)]
pub struct SelectionEngine {
  config: SelectionEngineConfig,
  backend: Option<Arc<dyn VariationalBackend>>,
}

impl SelectionEngine {
  pub fn new(config: SelectionEngineConfig) -> Self {
    Self {
      config,
      backend: None,
    }
  }

  /// Attach the backend used when the configured solver is variational.
  pub fn with_backend(mut self, backend: Arc<dyn VariationalBackend>) -> Self {
    self.backend = Some(backend);
    self
  }

  pub fn config(&self) -> &SelectionEngineConfig {
    &self.config
  }

  /// Fetch statistics from `provider` and run the pipeline on them.
  pub fn run_with<P: StatisticsProvider + ?Sized>(&self, provider: &P) -> anyhow::Result<SelectionReport> {
    let universe = provider.statistics()?;
    Ok(self.run(&universe)?)
  }

  /// Run the pipeline on an in-memory universe.
  pub fn run(&self, universe: &AssetUniverse) -> Result<SelectionReport, QuboError> {
    universe.validate()?;
    let cfg = &self.config;
    let started = Instant::now();

    let q = build_qubo(
      &universe.mu,
      &universe.sigma,
      cfg.cardinality,
      cfg.risk_weight,
      cfg.penalty_weight,
    )?;

    let (solve_q, scale) = match cfg.rescale_max_abs {
      Some(max_abs) => rescale_to_max_abs(&q, max_abs)?,
      None => (q.clone(), 1.0),
    };

    let solver = cfg.solver.build(cfg.depth, self.backend.clone());
    let solution = solver.solve(&solve_q)?;
    let objective = if scale == 1.0 {
      solution.value
    } else {
      quadratic_form(&q, &solution.x)
    };

    let (selected, not_selected) = decode(&universe.tickers, &solution.x)?;
    let portfolio_return = universe
      .mu
      .iter()
      .zip(&solution.x)
      .filter(|(_, b)| **b == 1)
      .map(|(m, _)| m)
      .sum::<f64>();
    let portfolio_variance = quadratic_form(&universe.sigma, &solution.x);

    tracing::info!(
      solver = solver.name(),
      n = universe.len(),
      target = cfg.cardinality,
      picked = selected.len(),
      objective,
      elapsed_ms = started.elapsed().as_millis() as u64,
      "selection finished"
    );

    Ok(SelectionReport {
      tickers: universe.tickers.clone(),
      selected,
      not_selected,
      x: solution.x,
      objective,
      solver: cfg.solver,
      target_cardinality: cfg.cardinality,
      mu: universe.mu.to_vec(),
      variances: universe.variances(),
      portfolio_return,
      portfolio_variance,
      scale,
      qubo: q,
    })
  }
}
