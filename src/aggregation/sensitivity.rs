//! Monte Carlo sensitivity elasticity.
//!
//! Each expert's decision matrix is min-max normalized per column, then
//! scored under random weight vectors drawn from a symmetric Dirichlet
//! distribution. A criterion's elasticity for one draw is its share of the
//! total weighted score. Shares are averaged over draws, then over experts.
//!
//! # Reproducibility
//!
//! Expert `e` draws from its own RNG seeded with `seed + e`, so results do
//! not depend on whether experts are processed sequentially or in parallel.

use super::correlation::column;
use super::types::Direction;
use crate::error::{Result, SelectionError};
use rand_distr::{Distribution, Gamma};
use tracing::debug;
use u_numflow::random::create_rng;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Configuration for the sensitivity simulation.
///
/// ```
/// use u_criteria::aggregation::SensitivityConfig;
///
/// let config = SensitivityConfig::default()
///     .with_simulations(500)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensitivityConfig {
    /// Number of random weight vectors per expert.
    pub simulations: usize,

    /// Dirichlet concentration shared by every criterion.
    ///
    /// 1.0 samples uniformly from the weight simplex.
    pub concentration: f64,

    /// Base seed. Expert `e` uses `seed + e`.
    pub seed: u64,

    /// Simulate experts in parallel (requires the `parallel` feature).
    pub parallel: bool,
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        Self {
            simulations: 1000,
            concentration: 1.0,
            seed: 42,
            parallel: false,
        }
    }
}

impl SensitivityConfig {
    pub fn with_simulations(mut self, n: usize) -> Self {
        self.simulations = n;
        self
    }

    pub fn with_concentration(mut self, alpha: f64) -> Self {
        self.concentration = alpha;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.simulations == 0 {
            return Err(SelectionError::InvalidConfig(
                "simulations must be at least 1".into(),
            ));
        }
        if !(self.concentration > 0.0 && self.concentration.is_finite()) {
            return Err(SelectionError::InvalidConfig(format!(
                "concentration must be positive, got {}",
                self.concentration
            )));
        }
        Ok(())
    }
}

/// Direction-aware min-max normalization of every column.
///
/// Benefit columns map to `(v - min) / (max - min)`, cost columns to
/// `(max - v) / (max - min)`. A column with `max == min` is fixed at 1.0.
pub fn normalize_columns(matrix: &[Vec<f64>], directions: &[Direction]) -> Vec<Vec<f64>> {
    let mut out: Vec<Vec<f64>> = matrix.iter().map(|_| vec![0.0; directions.len()]).collect();
    for (j, direction) in directions.iter().enumerate() {
        let col = column(matrix, j);
        let min = col.iter().copied().fold(f64::INFINITY, f64::min);
        let max = col.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;
        for (row, &v) in out.iter_mut().zip(&col) {
            row[j] = if range.abs() <= f64::EPSILON || !range.is_finite() {
                1.0
            } else {
                match direction {
                    Direction::Benefit => (v - min) / range,
                    Direction::Cost => (max - v) / range,
                }
            };
        }
    }
    out
}

/// Mean elasticity of each criterion for one normalized matrix.
pub fn expert_elasticity(
    normalized: &[Vec<f64>],
    criteria: usize,
    config: &SensitivityConfig,
    seed: u64,
) -> Result<Vec<f64>> {
    if criteria == 0 {
        return Ok(Vec::new());
    }
    let gamma = Gamma::new(config.concentration, 1.0)
        .map_err(|e| SelectionError::InvalidConfig(format!("dirichlet concentration: {e}")))?;
    let mut rng = create_rng(seed);

    // Σ_a w_j·r_aj = w_j·Σ_a r_aj, so column sums are all a draw needs.
    let col_sums: Vec<f64> = (0..criteria)
        .map(|j| column(normalized, j).iter().sum())
        .collect();

    let mut acc = vec![0.0; criteria];
    let mut weights = vec![0.0; criteria];
    for _ in 0..config.simulations {
        let mut weight_sum = 0.0;
        for w in weights.iter_mut() {
            *w = gamma.sample(&mut rng);
            weight_sum += *w;
        }
        if weight_sum > 0.0 {
            weights.iter_mut().for_each(|w| *w /= weight_sum);
        } else {
            weights.fill(1.0 / criteria as f64);
        }

        let total: f64 = weights.iter().zip(&col_sums).map(|(w, s)| w * s).sum();
        if total > 0.0 {
            for ((a, w), s) in acc.iter_mut().zip(&weights).zip(&col_sums) {
                *a += w * s / total;
            }
        }
    }

    let sims = config.simulations as f64;
    Ok(acc.into_iter().map(|a| a / sims).collect())
}

/// Elasticity per criterion, averaged over all experts.
///
/// `matrices` are raw alternative × criterion matrices with blanks already
/// replaced by the neutral value.
pub fn estimate_elasticity(
    matrices: &[Vec<Vec<f64>>],
    directions: &[Direction],
    config: &SensitivityConfig,
) -> Result<Vec<f64>> {
    config.validate()?;
    let n = directions.len();
    if matrices.is_empty() {
        return Ok(vec![0.0; n]);
    }

    let run = |(e, matrix): (usize, &Vec<Vec<f64>>)| {
        let normalized = normalize_columns(matrix, directions);
        expert_elasticity(&normalized, n, config, config.seed.wrapping_add(e as u64))
    };

    #[cfg(feature = "parallel")]
    let per_expert: Vec<Vec<f64>> = if config.parallel {
        matrices
            .par_iter()
            .enumerate()
            .map(run)
            .collect::<Result<_>>()?
    } else {
        matrices.iter().enumerate().map(run).collect::<Result<_>>()?
    };

    #[cfg(not(feature = "parallel"))]
    let per_expert: Vec<Vec<f64>> = matrices.iter().enumerate().map(run).collect::<Result<_>>()?;

    let experts = per_expert.len() as f64;
    let mut mean = vec![0.0; n];
    for values in &per_expert {
        for (m, v) in mean.iter_mut().zip(values) {
            *m += v / experts;
        }
    }

    debug!(
        criteria = n,
        experts = per_expert.len(),
        simulations = config.simulations,
        seed = config.seed,
        "sensitivity elasticity estimated"
    );
    Ok(mean)
}
