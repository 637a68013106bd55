//! # Errors
//!
//! Typed failures of the QUBO pipeline. Every error is local and synchronous;
//! nothing in the core retries.

use thiserror::Error;

/// Errors raised while building, solving or decoding a QUBO.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuboError {
  /// Two inputs that must agree in size do not.
  #[error("dimension mismatch for {context}: expected {expected}, got {actual}")]
  Dimension {
    /// Which input was checked.
    context: &'static str,
    /// Size implied by the other inputs.
    expected: usize,
    /// Size actually supplied.
    actual: usize,
  },

  /// A parameter is outside its admissible range.
  #[error("invalid configuration: {0}")]
  Configuration(String),

  /// The asset universe is empty.
  #[error("empty input: at least one asset is required")]
  EmptyInput,

  /// The variational backend is absent, misconfigured or returned no usable assignment.
  #[error("solver unavailable: {0}")]
  SolverUnavailable(String),

  /// A solution vector holds something other than 0 or 1.
  #[error("non-binary value {value} at position {index}")]
  NonBinary {
    /// Position of the offending entry.
    index: usize,
    /// The offending value.
    value: u8,
  },
}

impl QuboError {
  pub(crate) fn dimension(context: &'static str, expected: usize, actual: usize) -> Self {
    Self::Dimension {
      context,
      expected,
      actual,
    }
  }

  pub(crate) fn configuration(message: impl Into<String>) -> Self {
    Self::Configuration(message.into())
  }

  pub(crate) fn unavailable(message: impl Into<String>) -> Self {
    Self::SolverUnavailable(message.into())
  }
}
