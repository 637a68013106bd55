//! # Quadratic Program
//!
//! $$
//! E(\mathbf{x}) = \sum_i c_i x_i + \sum_{i<j} c_{ij} x_i x_j
//! $$
//!
//! Linear/quadratic coefficient view of a QUBO matrix, the input format handed
//! to variational backends. Each unordered pair appears once, taken from the
//! upper triangle; the lower triangle is not added back in.

use impl_new_derive::ImplNew;
use ndarray::Array2;

use super::form::check_square;
use crate::error::QuboError;

/// A single `c_ij * x_i * x_j` term with `i < j`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadraticTerm {
  pub i: usize,
  pub j: usize,
  pub coefficient: f64,
}

/// Binary minimization problem in linear + pairwise form.
#[derive(ImplNew, Clone, Debug, PartialEq)]
pub struct QuadraticProgram {
  /// One coefficient per binary variable.
  pub linear: Vec<f64>,
  /// Nonzero pairwise couplings, `i < j`, in row-major order.
  pub quadratic: Vec<QuadraticTerm>,
}

impl QuadraticProgram {
  /// Re-express a QUBO matrix: diagonal as linear terms, nonzero `i < j` entries as couplings.
  pub fn from_qubo(q: &Array2<f64>) -> Result<Self, QuboError> {
    let n = check_square(q)?;
    let linear = (0..n).map(|i| q[[i, i]]).collect();

    let mut quadratic = Vec::new();
    for i in 0..n {
      for j in (i + 1)..n {
        let coefficient = q[[i, j]];
        if coefficient != 0.0 {
          quadratic.push(QuadraticTerm { i, j, coefficient });
        }
      }
    }

    Ok(Self::new(linear, quadratic))
  }

  /// Number of binary variables.
  pub fn num_variables(&self) -> usize {
    self.linear.len()
  }

  /// Program energy of a binary assignment given as a slice of bits.
  pub fn energy(&self, x: &[u8]) -> f64 {
    let mut e = 0.0;
    for (c, &b) in self.linear.iter().zip(x) {
      if b == 1 {
        e += c;
      }
    }
    for term in &self.quadratic {
      if x[term.i] == 1 && x[term.j] == 1 {
        e += term.coefficient;
      }
    }
    e
  }

  /// Program energy of a basis state where bit `i` of `z` is variable `i`.
  pub fn energy_of_index(&self, z: usize) -> f64 {
    let mut e = 0.0;
    for (i, c) in self.linear.iter().enumerate() {
      if (z >> i) & 1 == 1 {
        e += c;
      }
    }
    for term in &self.quadratic {
      if (z >> term.i) & 1 == 1 && (z >> term.j) & 1 == 1 {
        e += term.coefficient;
      }
    }
    e
  }
}
