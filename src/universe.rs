//! # Asset Universe
//!
//! $$
//! (\text{tickers},\ \mu \in \mathbb{R}^n,\ \Sigma \in \mathbb{R}^{n\times n})
//! $$
//!
//! Statistics consumed by the selection pipeline. How the returns and
//! covariances were estimated is up to the provider; nothing here touches
//! prices.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use ndarray::Array1;
use ndarray::Array2;
use serde::Deserialize;
use serde::Serialize;

use crate::error::QuboError;

/// Tolerance for the covariance symmetry check.
const SYMMETRY_TOL: f64 = 1e-10;

/// Tickers with their expected returns and covariance matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct AssetUniverse {
  pub tickers: Vec<String>,
  pub mu: Array1<f64>,
  pub sigma: Array2<f64>,
}

/// On-disk layout of an [`AssetUniverse`].
#[derive(Serialize, Deserialize)]
struct UniverseRecord {
  tickers: Vec<String>,
  mu: Vec<f64>,
  sigma: Vec<Vec<f64>>,
}

impl AssetUniverse {
  /// Assemble a universe and check that its parts agree.
  pub fn new(tickers: Vec<String>, mu: Array1<f64>, sigma: Array2<f64>) -> Result<Self, QuboError> {
    let universe = Self { tickers, mu, sigma };
    universe.validate()?;
    Ok(universe)
  }

  /// Five large caps with illustrative annual statistics.
  pub fn demo() -> Self {
    Self {
      tickers: ["AAPL", "MSFT", "GOOGL", "AMZN", "JPM"]
        .iter()
        .map(|t| t.to_string())
        .collect(),
      mu: ndarray::array![0.15, 0.12, 0.18, 0.14, 0.10],
      sigma: ndarray::array![
        [0.10, 0.02, 0.04, 0.01, 0.03],
        [0.02, 0.08, 0.01, 0.03, 0.02],
        [0.04, 0.01, 0.12, 0.02, 0.04],
        [0.01, 0.03, 0.02, 0.09, 0.01],
        [0.03, 0.02, 0.04, 0.01, 0.07]
      ],
    }
  }

  pub fn len(&self) -> usize {
    self.mu.len()
  }

  pub fn is_empty(&self) -> bool {
    self.mu.is_empty()
  }

  /// Per-asset variances, the diagonal of `sigma`.
  pub fn variances(&self) -> Vec<f64> {
    self.sigma.diag().to_vec()
  }

  /// Check sizes, covariance symmetry and non-negative variances.
  pub fn validate(&self) -> Result<(), QuboError> {
    let n = self.mu.len();
    if n == 0 {
      return Err(QuboError::EmptyInput);
    }
    if self.tickers.len() != n {
      return Err(QuboError::dimension("tickers", n, self.tickers.len()));
    }

    let (rows, cols) = self.sigma.dim();
    if rows != n {
      return Err(QuboError::dimension("sigma rows", n, rows));
    }
    if cols != n {
      return Err(QuboError::dimension("sigma columns", n, cols));
    }

    for i in 0..n {
      if self.sigma[[i, i]] < 0.0 {
        return Err(QuboError::configuration(format!(
          "variance of {} is negative",
          self.tickers[i]
        )));
      }
      for j in (i + 1)..n {
        if (self.sigma[[i, j]] - self.sigma[[j, i]]).abs() > SYMMETRY_TOL {
          return Err(QuboError::configuration(format!(
            "covariance is not symmetric at ({i}, {j})"
          )));
        }
      }
    }

    Ok(())
  }

  /// Parse the JSON layout `{"tickers": [...], "mu": [...], "sigma": [[...], ...]}`.
  pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
    let record: UniverseRecord = serde_json::from_str(json).context("malformed universe JSON")?;
    let n = record.mu.len();

    let rows = record.sigma.len();
    let mut sigma = Array2::<f64>::zeros((rows, n));
    for (i, row) in record.sigma.iter().enumerate() {
      if row.len() != n {
        return Err(QuboError::dimension("sigma columns", n, row.len()).into());
      }
      for (j, &v) in row.iter().enumerate() {
        sigma[[i, j]] = v;
      }
    }

    Ok(Self::new(record.tickers, Array1::from(record.mu), sigma)?)
  }

  /// Serialize to the layout read by [`AssetUniverse::from_json_str`].
  pub fn to_json_string(&self) -> anyhow::Result<String> {
    let record = UniverseRecord {
      tickers: self.tickers.clone(),
      mu: self.mu.to_vec(),
      sigma: self.sigma.rows().into_iter().map(|r| r.to_vec()).collect(),
    };
    Ok(serde_json::to_string_pretty(&record)?)
  }
}

/// Source of the statistics a selection runs on.
pub trait StatisticsProvider {
  fn statistics(&self) -> anyhow::Result<AssetUniverse>;
}

impl StatisticsProvider for AssetUniverse {
  fn statistics(&self) -> anyhow::Result<AssetUniverse> {
    self.validate()?;
    Ok(self.clone())
  }
}

/// Statistics stored as a JSON file on disk.
#[derive(Clone, Debug)]
pub struct JsonStatistics {
  path: PathBuf,
}

impl JsonStatistics {
  pub fn new(path: impl AsRef<Path>) -> Self {
    Self {
      path: path.as_ref().to_path_buf(),
    }
  }
}

impl StatisticsProvider for JsonStatistics {
  fn statistics(&self) -> anyhow::Result<AssetUniverse> {
    let raw = fs::read_to_string(&self.path)
      .with_context(|| format!("failed to read statistics from {}", self.path.display()))?;
    let universe = AssetUniverse::from_json_str(&raw)
      .with_context(|| format!("invalid statistics in {}", self.path.display()))?;
    tracing::debug!(path = %self.path.display(), assets = universe.len(), "loaded statistics");
    Ok(universe)
  }
}
