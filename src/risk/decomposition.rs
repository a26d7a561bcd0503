//! Per-asset attribution of portfolio variance.
//!
//! The marginal contribution of asset `i` is the sensitivity of portfolio
//! variance to its weight, `(Sigma w)_i`; weighting by `w_i` gives the total
//! contribution, and the totals sum to the quadratic form `w' Sigma w`, so the
//! percentages partition portfolio variance exactly.

use serde::{Deserialize, Serialize};

use crate::core::{AssetUniverse, PortfolioWeights, RiskError};
use crate::math::population_variance;
use crate::simulation::SimulationResult;

/// Total contributions at or below this magnitude count as an empty portfolio.
/// Exact zero for an all-zero weight vector; the floor only absorbs `-0.0` and
/// rounding noise.
const CONTRIBUTION_FLOOR: f64 = 1.0e-16;

/// Estimator for the simulated portfolio variance reported alongside the
/// per-asset attribution.
///
/// The two estimators are materially different numbers; both are pinned by
/// fixed-value tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarianceEstimator {
    /// Cross-scenario variance computed per time step, then averaged across
    /// steps (the initial step is identically 1.0 and is excluded). Smooths
    /// single-step noise; the baseline.
    #[default]
    TimeAveraged,
    /// Cross-scenario variance of terminal values only.
    Terminal,
}

/// Variance attribution for one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskContribution {
    /// Asset ticker, in universe order.
    pub ticker: String,
    /// Own variance `Sigma[i][i]`.
    pub variance: f64,
    /// Marginal contribution to portfolio variance, `(Sigma w)_i`.
    pub marginal_contribution: f64,
    /// Total contribution, `w_i * (Sigma w)_i`.
    pub total_contribution: f64,
    /// Share of the summed total contributions, in percent.
    pub contribution_pct: f64,
}

/// Portfolio variance plus the per-asset attribution, in universe order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskDecomposition {
    /// Simulated portfolio variance under the chosen estimator.
    pub portfolio_variance: f64,
    pub contributions: Vec<RiskContribution>,
}

/// Attributes portfolio variance to individual assets.
///
/// Fails with [`RiskError::EmptyPortfolio`] when the summed total contribution
/// is zero (all weights zero) rather than dividing by zero.
pub fn decompose(
    weights: &PortfolioWeights,
    universe: &AssetUniverse,
    result: &SimulationResult,
    estimator: VarianceEstimator,
) -> Result<RiskDecomposition, RiskError> {
    let n = universe.n_assets();
    if weights.len() != n {
        return Err(RiskError::DimensionMismatch(format!(
            "weights have length {}, expected {}",
            weights.len(),
            n
        )));
    }
    if result.portfolio_values.is_empty() || result.portfolio_values[0].is_empty() {
        return Err(RiskError::InvalidConfig(
            "simulation result holds no portfolio values".to_string(),
        ));
    }
    let path_len = result.portfolio_values[0].len();
    if result
        .portfolio_values
        .iter()
        .any(|row| row.len() != path_len)
    {
        return Err(RiskError::DimensionMismatch(
            "portfolio value rows have unequal lengths".to_string(),
        ));
    }

    let portfolio_variance = match estimator {
        VarianceEstimator::TimeAveraged => time_averaged_variance(&result.portfolio_values),
        VarianceEstimator::Terminal => population_variance(&result.final_values()),
    };

    let w = weights.as_slice();
    let cov = universe.covariance();
    let marginals: Vec<f64> = cov
        .iter()
        .map(|row| row.iter().zip(w).map(|(cij, wj)| cij * wj).sum())
        .collect();
    let totals: Vec<f64> = marginals.iter().zip(w).map(|(m, wi)| wi * m).collect();
    let grand_total: f64 = totals.iter().sum();
    if grand_total.abs() <= CONTRIBUTION_FLOOR {
        return Err(RiskError::EmptyPortfolio);
    }

    let contributions = universe
        .tickers()
        .iter()
        .enumerate()
        .map(|(i, ticker)| RiskContribution {
            ticker: ticker.clone(),
            variance: cov[i][i],
            marginal_contribution: marginals[i],
            total_contribution: totals[i],
            contribution_pct: 100.0 * totals[i] / grand_total,
        })
        .collect();

    Ok(RiskDecomposition {
        portfolio_variance,
        contributions,
    })
}

/// Cross-scenario population variance per step, averaged over steps >= 1.
fn time_averaged_variance(portfolio_values: &[Vec<f64>]) -> f64 {
    let steps = portfolio_values[0].len();
    if steps < 2 {
        return 0.0;
    }

    let mut column = vec![0.0_f64; portfolio_values.len()];
    let mut sum = 0.0;
    for t in 1..steps {
        for (slot, row) in column.iter_mut().zip(portfolio_values) {
            *slot = row[t];
        }
        sum += population_variance(&column);
    }
    sum / (steps - 1) as f64
}
