//! # QUBO Builder
//!
//! $$
//! Q_{ii} = -\mu_i + \lambda\Sigma_{ii} + \gamma - 2\gamma K,\qquad
//! Q_{ij} = \lambda\Sigma_{ij} + 2\gamma \quad (i \neq j)
//! $$
//!
//! Folds the return reward, the covariance risk and the cardinality penalty
//! into one symmetric matrix. The off-diagonal penalty enters the symmetric form
//! twice, so it weighs double against a textbook `(sum x - K)^2` expansion and
//! does not vanish at `K` selections. Downstream results depend on this exact
//! formula; keep it.

use ndarray::Array1;
use ndarray::Array2;

use crate::error::QuboError;

/// Check the builder preconditions without building anything.
pub fn validate_inputs(
  mu: &Array1<f64>,
  sigma: &Array2<f64>,
  k: usize,
  lambda: f64,
  gamma: f64,
) -> Result<usize, QuboError> {
  let n = mu.len();
  if n == 0 {
    return Err(QuboError::EmptyInput);
  }

  let (rows, cols) = sigma.dim();
  if rows != n {
    return Err(QuboError::dimension("sigma rows", n, rows));
  }
  if cols != n {
    return Err(QuboError::dimension("sigma columns", n, cols));
  }

  if k < 1 || k > n {
    return Err(QuboError::configuration(format!(
      "cardinality must be in 1..={n}, got {k}"
    )));
  }
  if !lambda.is_finite() || lambda < 0.0 {
    return Err(QuboError::configuration(format!(
      "risk weight must be finite and non-negative, got {lambda}"
    )));
  }
  if !gamma.is_finite() || gamma < 0.0 {
    return Err(QuboError::configuration(format!(
      "penalty weight must be finite and non-negative, got {gamma}"
    )));
  }

  Ok(n)
}

/// Build the portfolio-selection QUBO matrix.
///
/// `mu` are expected returns, `sigma` the covariance matrix, `k` the number of
/// assets to pick, `lambda` the risk weight and `gamma` the cardinality penalty.
/// Only the upper triangle of `sigma` feeds the off-diagonal entries, so the
/// result is symmetric even if `sigma` is not.
pub fn build_qubo(
  mu: &Array1<f64>,
  sigma: &Array2<f64>,
  k: usize,
  lambda: f64,
  gamma: f64,
) -> Result<Array2<f64>, QuboError> {
  let n = validate_inputs(mu, sigma, k, lambda, gamma)?;
  let k = k as f64;

  let mut q = Array2::<f64>::zeros((n, n));
  for i in 0..n {
    q[[i, i]] = -mu[i] + lambda * sigma[[i, i]] + gamma - 2.0 * gamma * k;

    for j in (i + 1)..n {
      let v = lambda * sigma[[i, j]] + 2.0 * gamma;
      q[[i, j]] = v;
      q[[j, i]] = v;
    }
  }

  tracing::debug!(n, k, lambda, gamma, "built qubo matrix");
  Ok(q)
}
