//! Scalar risk and return statistics from terminal portfolio values.
//!
//! VaR and CVaR are empirical: the 5% quantile of simulated terminal values
//! and the mean of the tail at or below it. Probabilities are scenario
//! frequencies. By construction `cvar_5 <= var_5 <= mean_final_value` on any
//! non-degenerate terminal distribution.

use serde::{Deserialize, Serialize};

use crate::core::RiskError;
use crate::math::{empirical_quantile, mean, population_std};
use crate::simulation::SimulationResult;

/// Tail probability for the VaR/CVaR pair.
const TAIL_PROBABILITY: f64 = 0.05;

/// Standard deviations below this floor make the Sharpe ratios undefined.
const MIN_STD: f64 = 1.0e-12;

/// Tolerance on the CVaR tail cutoff.
const TAIL_TOL: f64 = 1.0e-12;

/// Summary risk/return statistics for one simulation.
///
/// Values are in normalized portfolio units (initial value 1.0); returns are
/// simple returns over the horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub mean_final_value: f64,
    pub std_final_value: f64,
    pub mean_return: f64,
    pub std_return: f64,
    /// 5th percentile of terminal portfolio values.
    pub var_5: f64,
    /// Mean terminal value over the worst-5% tail.
    pub cvar_5: f64,
    /// Mean over standard deviation of terminal values; `None` when the
    /// deviation is zero.
    pub sharpe_value: Option<f64>,
    /// Mean over standard deviation of returns; `None` when the deviation is
    /// zero.
    pub sharpe_return: Option<f64>,
    /// Fraction of scenarios ending below the initial value.
    pub prob_loss: f64,
    /// Fraction of scenarios losing more than 10%.
    pub prob_loss_over_10pct: f64,
    /// Fraction of scenarios at least doubling.
    pub prob_doubling: f64,
    /// Fraction of scenarios losing at least half.
    pub prob_halving: f64,
}

/// Derives scalar metrics from the terminal values of a simulation.
///
/// Fails with [`RiskError::EmptyPortfolio`] when the portfolio series starts
/// at zero (no positions held), since returns are undefined in that state.
pub fn compute_metrics(result: &SimulationResult) -> Result<RiskMetrics, RiskError> {
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

    let initial_value = result.portfolio_values[0][0];
    if initial_value <= 0.0 {
        return Err(RiskError::EmptyPortfolio);
    }

    let final_values: Vec<f64> = result
        .portfolio_values
        .iter()
        .map(|row| row[path_len - 1])
        .collect();
    let returns: Vec<f64> = final_values
        .iter()
        .map(|v| (v - initial_value) / initial_value)
        .collect();

    let mut sorted = final_values.clone();
    let var_5 = empirical_quantile(&mut sorted, TAIL_PROBABILITY);

    let mut tail_sum = 0.0;
    let mut tail_count = 0usize;
    for &v in &final_values {
        if v <= var_5 + TAIL_TOL {
            tail_sum += v;
            tail_count += 1;
        }
    }
    let cvar_5 = if tail_count == 0 {
        var_5
    } else {
        tail_sum / tail_count as f64
    };

    let n = final_values.len() as f64;
    let frequency = |pred: &dyn Fn(f64) -> bool| -> f64 {
        returns.iter().filter(|r| pred(**r)).count() as f64 / n
    };

    let mean_final_value = mean(&final_values);
    let std_final_value = population_std(&final_values);
    let mean_return = mean(&returns);
    let std_return = population_std(&returns);

    Ok(RiskMetrics {
        mean_final_value,
        std_final_value,
        mean_return,
        std_return,
        var_5,
        cvar_5,
        sharpe_value: (std_final_value > MIN_STD).then(|| mean_final_value / std_final_value),
        sharpe_return: (std_return > MIN_STD).then(|| mean_return / std_return),
        prob_loss: frequency(&|r| r < 0.0),
        prob_loss_over_10pct: frequency(&|r| r < -0.10),
        prob_doubling: frequency(&|r| r > 1.0),
        prob_halving: frequency(&|r| r < -0.5),
    })
}
