//! # Quadratic Form
//!
//! $$
//! f(\mathbf{x}) = \mathbf{x}^\top Q \mathbf{x} = \sum_{i:x_i=1}\sum_{j:x_j=1} Q_{ij}
//! $$
//!
//! Evaluation and conditioning helpers shared by the solvers.

use ndarray::Array2;

use crate::error::QuboError;

/// Validate that `q` is a non-empty square matrix and return its size.
pub fn check_square(q: &Array2<f64>) -> Result<usize, QuboError> {
  let (rows, cols) = q.dim();
  if rows != cols {
    return Err(QuboError::dimension("qubo columns", rows, cols));
  }
  if rows == 0 {
    return Err(QuboError::EmptyInput);
  }
  Ok(rows)
}

/// Sum of `Q[i][j]` over all pairs of selected indices, row by row in index order.
///
/// Callers must pass a `selected` slice in ascending order to get results that
/// are bit-identical to [`quadratic_form`].
pub(crate) fn selected_energy(q: &Array2<f64>, selected: &[usize]) -> f64 {
  let mut acc = 0.0;
  for &i in selected {
    let mut row_acc = 0.0;
    for &j in selected {
      row_acc += q[[i, j]];
    }
    acc += row_acc;
  }
  acc
}

/// Exact `x^T Q x` for a binary vector.
///
/// Entries are treated as selected when they equal 1; use [`check_binary`]
/// first if the vector comes from an untrusted source.
pub fn quadratic_form(q: &Array2<f64>, x: &[u8]) -> f64 {
  let selected: Vec<usize> = x
    .iter()
    .enumerate()
    .filter(|(_, b)| **b == 1)
    .map(|(i, _)| i)
    .collect();
  selected_energy(q, &selected)
}

/// Verify that every entry of `x` is 0 or 1.
pub fn check_binary(x: &[u8]) -> Result<(), QuboError> {
  match x.iter().position(|&b| b > 1) {
    Some(index) => Err(QuboError::NonBinary {
      index,
      value: x[index],
    }),
    None => Ok(()),
  }
}

/// Scale `q` down so that its largest absolute entry is at most `max_abs`.
///
/// Returns the scaled matrix and the divisor applied (`1.0` if `q` already fits).
/// Dividing by a positive constant keeps the minimizer unchanged.
pub fn rescale_to_max_abs(q: &Array2<f64>, max_abs: f64) -> Result<(Array2<f64>, f64), QuboError> {
  if !max_abs.is_finite() || max_abs <= 0.0 {
    return Err(QuboError::configuration(format!(
      "rescale bound must be finite and positive, got {max_abs}"
    )));
  }

  let largest = q.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
  if largest <= max_abs {
    return Ok((q.clone(), 1.0));
  }

  let factor = largest / max_abs;
  tracing::debug!(largest, factor, "rescaling qubo matrix");
  Ok((q.mapv(|v| v / factor), factor))
}
