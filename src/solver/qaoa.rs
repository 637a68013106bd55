//! # QAOA Backend
//!
//! $$
//! |\gamma,\beta\rangle = \prod_{l=1}^{p} e^{-i\beta_l \sum_k X_k}\, e^{-i\gamma_l H_C}\, |+\rangle^{\otimes n},
//! \qquad \min_{\gamma,\beta}\ \langle\gamma,\beta|H_C|\gamma,\beta\rangle
//! $$
//!
//! Statevector simulation of the Quantum Approximate Optimization Algorithm
//! with a Nelder-Mead outer loop and a final measurement sampling step.

use std::f64::consts::FRAC_PI_2;
use std::f64::consts::PI;
use std::sync::Arc;

use anyhow::anyhow;
use anyhow::bail;
use argmin::core::CostFunction;
use argmin::core::Executor;
use argmin::core::State;
use argmin::solver::neldermead::NelderMead;
use num_complex::Complex64;
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rayon::prelude::*;

use super::variational::BackendOutcome;
use super::variational::VariationalBackend;
use crate::qubo::program::QuadraticProgram;

/// Runtime configuration for [`QaoaBackend`].
#[derive(Clone, Debug)]
pub struct QaoaConfig {
  /// Largest program the simulator accepts; memory grows as `2^n`.
  pub max_qubits: usize,
  /// Iteration cap of the Nelder-Mead angle search.
  pub max_iters: u64,
  /// Number of measurement samples drawn from the optimized state.
  pub shots: usize,
  /// Fixed RNG seed. `None` draws a fresh one per call.
  pub seed: Option<u64>,
}

impl Default for QaoaConfig {
  fn default() -> Self {
    Self {
      max_qubits: 20,
      max_iters: 300,
      shots: 1024,
      seed: None,
    }
  }
}

/// In-process QAOA simulator implementing [`VariationalBackend`].
#[derive(Clone, Debug, Default)]
pub struct QaoaBackend {
  config: QaoaConfig,
}

impl QaoaBackend {
  pub fn new(config: QaoaConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &QaoaConfig {
    &self.config
  }
}

/// Apply `depth` cost/mixer layers to the uniform superposition.
///
/// `params` holds the `depth` cost angles followed by the `depth` mixer angles.
fn evolve(energies: &[f64], n: usize, params: &[f64], depth: usize) -> Vec<Complex64> {
  let dim = energies.len();
  let amp = Complex64::new(1.0 / (dim as f64).sqrt(), 0.0);
  let mut state = vec![amp; dim];

  for layer in 0..depth {
    let gamma = params[layer];
    let beta = params[depth + layer];

    for (a, &e) in state.iter_mut().zip(energies) {
      *a *= Complex64::from_polar(1.0, -gamma * e);
    }

    let c = beta.cos();
    let s = Complex64::new(0.0, -beta.sin());
    for qubit in 0..n {
      let bit = 1usize << qubit;
      for z in 0..dim {
        if z & bit == 0 {
          let a0 = state[z];
          let a1 = state[z | bit];
          state[z] = a0 * c + a1 * s;
          state[z | bit] = a0 * s + a1 * c;
        }
      }
    }
  }

  state
}

fn expectation(state: &[Complex64], energies: &[f64]) -> f64 {
  state
    .iter()
    .zip(energies)
    .map(|(a, &e)| a.norm_sqr() * e)
    .sum()
}

struct QaoaCost {
  energies: Arc<[f64]>,
  n: usize,
  depth: usize,
}

impl CostFunction for QaoaCost {
  type Param = Vec<f64>;
  type Output = f64;

  fn cost(&self, params: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
    let state = evolve(&self.energies, self.n, params, self.depth);
    Ok(expectation(&state, &self.energies))
  }
}

impl VariationalBackend for QaoaBackend {
  fn name(&self) -> &'static str {
    "qaoa"
  }

  fn minimize(&self, program: &QuadraticProgram, depth: usize) -> anyhow::Result<BackendOutcome> {
    let n = program.num_variables();
    if n == 0 {
      bail!("program has no variables");
    }
    if n > self.config.max_qubits {
      bail!(
        "{n} variables exceed the simulator limit of {} qubits",
        self.config.max_qubits
      );
    }
    if depth == 0 {
      bail!("circuit depth must be at least 1");
    }
    if self.config.shots == 0 {
      bail!("at least one measurement shot is required");
    }

    let energies: Arc<[f64]> = (0..1usize << n)
      .into_par_iter()
      .map(|z| program.energy_of_index(z))
      .collect::<Vec<f64>>()
      .into();

    let seed = self.config.seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = StdRng::seed_from_u64(seed);

    let mut x0 = Vec::with_capacity(2 * depth);
    for _ in 0..depth {
      x0.push(rng.random_range(0.0..PI));
    }
    for _ in 0..depth {
      x0.push(rng.random_range(0.0..FRAC_PI_2));
    }

    let mut simplex = Vec::with_capacity(2 * depth + 1);
    simplex.push(x0.clone());
    for i in 0..x0.len() {
      let mut point = x0.clone();
      point[i] += 0.5;
      simplex.push(point);
    }

    let cost = QaoaCost {
      energies: Arc::clone(&energies),
      n,
      depth,
    };
    let solver = NelderMead::new(simplex)
      .with_sd_tolerance(1e-8)
      .map_err(|e| anyhow!("invalid Nelder-Mead setup: {e}"))?;
    let res = Executor::new(cost, solver)
      .configure(|state| state.max_iters(self.config.max_iters))
      .run()
      .map_err(|e| anyhow!("angle optimization failed: {e}"))?;

    let iterations = res.state.get_iter();
    let best_params = res.state.best_param.unwrap_or(x0);

    let state = evolve(&energies, n, &best_params, depth);
    let optimized = expectation(&state, &energies);
    let probabilities: Vec<f64> = state.iter().map(|a| a.norm_sqr()).collect();
    let sampler = WeightedIndex::new(&probabilities)
      .map_err(|e| anyhow!("degenerate measurement distribution: {e}"))?;

    let mut best_z = sampler.sample(&mut rng);
    for _ in 1..self.config.shots {
      let z = sampler.sample(&mut rng);
      if energies[z] < energies[best_z] {
        best_z = z;
      }
    }

    tracing::debug!(
      seed,
      iterations,
      expectation = optimized,
      energy = energies[best_z],
      "qaoa sampling finished"
    );

    Ok(BackendOutcome {
      x: (0..n).map(|i| ((best_z >> i) & 1) as u8).collect(),
      energy: energies[best_z],
      expectation: Some(optimized),
      iterations,
    })
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::array;

  use super::*;
  use crate::qubo::build_qubo;
  use crate::qubo::quadratic_form;
  use crate::qubo::rescale_to_max_abs;
  use crate::solver::ApproximateVariationalSolver;
  use crate::solver::Solver;
  use crate::universe::AssetUniverse;

  fn seeded(seed: u64) -> QaoaBackend {
    QaoaBackend::new(QaoaConfig {
      seed: Some(seed),
      ..QaoaConfig::default()
    })
  }

  #[test]
  fn state_stays_normalized() {
    let energies = [0.0, -1.0, 2.0, 0.5, -3.0, 1.0, 0.25, -0.75];
    let state = evolve(&energies, 3, &[0.7, -0.2, 0.4, 1.1], 2);
    let norm: f64 = state.iter().map(|a| a.norm_sqr()).sum();
    assert_abs_diff_eq!(norm, 1.0, epsilon = 1e-12);
  }

  #[test]
  fn zero_angles_leave_uniform_expectation() {
    let energies = [1.0, 2.0, 3.0, 6.0];
    let state = evolve(&energies, 2, &[0.0, 0.0], 1);
    assert_abs_diff_eq!(expectation(&state, &energies), 3.0, epsilon = 1e-12);
  }

  #[test]
  fn finds_ground_state_of_small_program() {
    let q = array![[-1.0, 2.0, 0.0], [2.0, 1.0, -0.5], [0.0, -0.5, -2.0]];
    let program = QuadraticProgram::from_qubo(&q).unwrap();
    let outcome = seeded(5).minimize(&program, 2).unwrap();

    let ground = (0..8usize)
      .map(|z| program.energy_of_index(z))
      .fold(f64::INFINITY, f64::min);
    assert_abs_diff_eq!(outcome.energy, ground, epsilon = 1e-12);
    assert_abs_diff_eq!(program.energy(&outcome.x), outcome.energy, epsilon = 1e-12);
    assert!(outcome.expectation.is_some());
  }

  #[test]
  fn fixed_seed_is_reproducible() {
    let q = array![[-0.4, 0.3, 0.1], [0.3, -0.2, 0.2], [0.1, 0.2, -0.3]];
    let program = QuadraticProgram::from_qubo(&q).unwrap();

    let a = seeded(99).minimize(&program, 1).unwrap();
    let b = seeded(99).minimize(&program, 1).unwrap();
    assert_eq!(a, b);
  }

  #[test]
  fn rejects_programs_beyond_limits() {
    let program = QuadraticProgram::new(vec![-1.0; 4], Vec::new());
    let small = QaoaBackend::new(QaoaConfig {
      max_qubits: 3,
      ..QaoaConfig::default()
    });
    assert!(small.minimize(&program, 1).is_err());

    let no_shots = QaoaBackend::new(QaoaConfig {
      shots: 0,
      ..QaoaConfig::default()
    });
    assert!(no_shots.minimize(&program, 1).is_err());
    assert!(seeded(1).minimize(&program, 0).is_err());
    assert!(seeded(1)
      .minimize(&QuadraticProgram::new(Vec::new(), Vec::new()), 1)
      .is_err());
  }

  #[test]
  fn adapter_reports_full_form_objective_on_demo_universe() {
    let universe = AssetUniverse::demo();
    let q = build_qubo(&universe.mu, &universe.sigma, 2, 1.0, 10.0).unwrap();
    let (scaled, _) = rescale_to_max_abs(&q, 5.0).unwrap();

    let solver = ApproximateVariationalSolver::new(1).with_backend(Arc::new(seeded(2024)));
    let solution = solver.solve(&scaled).unwrap();

    assert_eq!(solution.x.len(), 5);
    assert!(solution.x.iter().all(|&b| b <= 1));
    assert_eq!(solution.value, quadratic_form(&scaled, &solution.x));
  }
}
