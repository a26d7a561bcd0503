//! Correlated multi-asset price simulation under log-Euler GBM.
//!
//! References: Glasserman (2004), Hull (11th ed.) Ch. 14 and 21 on lognormal
//! asset dynamics and correlated path generation.
//!
//! Each time step draws one independent standard-normal shock per asset and
//! scenario, transforms it through the universe's Cholesky factor into
//! correlated shocks, and advances every price multiplicatively:
//! `S_t = S_{t-1} * exp((mu - sigma^2 / 2) * dt + sigma * sqrt(dt) * z)`.
//! The exponential update keeps prices strictly positive and converges to the
//! continuous-time model as the step count grows.
//!
//! Scenarios are mutually independent given the shared read-only factor. Each
//! scenario derives its own RNG stream from `(base_seed, scenario_index)`, so
//! a fixed seed is bit-reproducible whether or not the `parallel` feature
//! shards scenarios across a thread pool.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::{AssetUniverse, PortfolioWeights, RiskError};
use crate::math::correlate_normals;

/// Stride between per-scenario stream seeds.
const STREAM_SEED_STRIDE: u64 = 7_919;

/// Simulation dimensions and seeding.
///
/// Scenario count, step count, and horizon are always explicit caller
/// configuration. The defaults (1 year, 252 steps, 10 000 scenarios, unseeded)
/// are a starting point, not baked-in behavior.
///
/// # Examples
/// ```rust
/// use portrisk::simulation::SimulationConfig;
///
/// let config = SimulationConfig::default()
///     .with_scenarios(2_000)
///     .with_steps(64)
///     .with_seed(42);
/// assert_eq!(config.scenarios, 2_000);
/// assert_eq!(config.seed, Some(42));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Simulation horizon in years.
    pub horizon_years: f64,
    /// Number of time steps over the horizon.
    pub steps: usize,
    /// Number of simulated scenarios.
    pub scenarios: usize,
    /// RNG seed; `Some` makes the output bit-reproducible.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            horizon_years: 1.0,
            steps: 252,
            scenarios: 10_000,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn new(horizon_years: f64, steps: usize, scenarios: usize) -> Self {
        Self {
            horizon_years,
            steps,
            scenarios,
            seed: None,
        }
    }

    pub fn with_horizon(mut self, horizon_years: f64) -> Self {
        self.horizon_years = horizon_years;
        self
    }

    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_scenarios(mut self, scenarios: usize) -> Self {
        self.scenarios = scenarios;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn validate(&self) -> Result<(), RiskError> {
        if !self.horizon_years.is_finite() || self.horizon_years <= 0.0 {
            return Err(RiskError::InvalidConfig(
                "horizon_years must be finite and > 0".to_string(),
            ));
        }
        if self.steps == 0 {
            return Err(RiskError::InvalidConfig("steps must be >= 1".to_string()));
        }
        if self.scenarios == 0 {
            return Err(RiskError::InvalidConfig(
                "scenarios must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Output of one simulation call.
///
/// Both tensors include the initial state: `prices[s][0]` is the spot vector
/// and `portfolio_values[s][0]` is 1.0 for every held portfolio.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    /// Simulated prices indexed `[scenario][step][asset]`.
    pub prices: Vec<Vec<Vec<f64>>>,
    /// Normalized portfolio values indexed `[scenario][step]`.
    pub portfolio_values: Vec<Vec<f64>>,
}

impl SimulationResult {
    /// Number of simulated scenarios.
    pub fn n_scenarios(&self) -> usize {
        self.portfolio_values.len()
    }

    /// Number of time steps beyond the initial state.
    pub fn n_steps(&self) -> usize {
        self.portfolio_values
            .first()
            .map_or(0, |row| row.len().saturating_sub(1))
    }

    /// Terminal portfolio value per scenario.
    pub fn final_values(&self) -> Vec<f64> {
        self.portfolio_values
            .iter()
            .filter_map(|row| row.last().copied())
            .collect()
    }
}

/// Simulates correlated GBM price paths and the normalized portfolio value
/// trajectory `(S / S_0) . w` for every scenario.
///
/// Fails with [`RiskError::DimensionMismatch`] when the weight vector does not
/// match the universe, and [`RiskError::InvalidConfig`] for degenerate
/// dimensions. With a fixed seed, two invocations with identical inputs
/// produce bit-identical output.
pub fn simulate(
    weights: &PortfolioWeights,
    universe: &AssetUniverse,
    config: &SimulationConfig,
) -> Result<SimulationResult, RiskError> {
    config.validate()?;
    let n = universe.n_assets();
    if weights.len() != n {
        return Err(RiskError::DimensionMismatch(format!(
            "weights have length {}, expected {}",
            weights.len(),
            n
        )));
    }

    let dt = config.horizon_years / config.steps as f64;
    let sqrt_dt = dt.sqrt();
    let drift: Vec<f64> = universe
        .mu()
        .iter()
        .zip(universe.sigma())
        .map(|(mu, sigma)| (mu - 0.5 * sigma * sigma) * dt)
        .collect();
    let diffusion: Vec<f64> = universe.sigma().iter().map(|sigma| sigma * sqrt_dt).collect();

    let base_seed = config.seed.unwrap_or_else(|| rand::rng().random());
    let steps = config.steps;
    let w = weights.as_slice();
    let spot = universe.spot();
    let chol = universe.cholesky();

    let run_scenario = |scenario: usize| -> (Vec<Vec<f64>>, Vec<f64>) {
        let mut rng = StdRng::seed_from_u64(stream_seed(base_seed, scenario));
        let mut indep = vec![0.0_f64; n];
        let mut shocks = vec![0.0_f64; n];

        let mut current = spot.to_vec();
        let mut path = Vec::with_capacity(steps + 1);
        path.push(current.clone());
        let mut values = Vec::with_capacity(steps + 1);
        values.push(w.iter().sum::<f64>());

        for _ in 0..steps {
            for z in &mut indep {
                *z = StandardNormal.sample(&mut rng);
            }
            correlate_normals(chol, &indep, &mut shocks);

            for (i, price) in current.iter_mut().enumerate() {
                *price *= diffusion[i].mul_add(shocks[i], drift[i]).exp();
            }
            path.push(current.clone());

            let value = current
                .iter()
                .zip(spot)
                .zip(w)
                .map(|((price, s0), wi)| wi * price / s0)
                .sum::<f64>();
            values.push(value);
        }

        (path, values)
    };

    #[cfg(feature = "parallel")]
    let per_scenario: Vec<(Vec<Vec<f64>>, Vec<f64>)> = (0..config.scenarios)
        .into_par_iter()
        .map(run_scenario)
        .collect();

    #[cfg(not(feature = "parallel"))]
    let per_scenario: Vec<(Vec<Vec<f64>>, Vec<f64>)> =
        (0..config.scenarios).map(run_scenario).collect();

    let mut prices = Vec::with_capacity(config.scenarios);
    let mut portfolio_values = Vec::with_capacity(config.scenarios);
    for (path, values) in per_scenario {
        prices.push(path);
        portfolio_values.push(values);
    }

    Ok(SimulationResult {
        prices,
        portfolio_values,
    })
}

/// Deterministic per-scenario stream seed.
fn stream_seed(base_seed: u64, scenario: usize) -> u64 {
    base_seed.wrapping_add((scenario as u64).wrapping_mul(STREAM_SEED_STRIDE))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn two_asset_universe() -> AssetUniverse {
        AssetUniverse::new(
            vec!["AAA".to_string(), "BBB".to_string()],
            vec![0.05, 0.07],
            vec![0.20, 0.25],
            vec![vec![0.04, 0.025], vec![0.025, 0.0625]],
            vec![100.0, 50.0],
        )
        .expect("valid universe")
    }

    fn held_weights(universe: &AssetUniverse) -> PortfolioWeights {
        PortfolioWeights::from_weights(vec![0.6, 0.4], universe).expect("valid weights")
    }

    #[test]
    fn output_shape_and_initial_state() {
        let universe = two_asset_universe();
        let weights = held_weights(&universe);
        let config = SimulationConfig::new(1.0, 16, 32).with_seed(7);

        let result = simulate(&weights, &universe, &config).unwrap();

        assert_eq!(result.n_scenarios(), 32);
        assert_eq!(result.n_steps(), 16);
        assert_eq!(result.prices.len(), 32);
        for (path, values) in result.prices.iter().zip(&result.portfolio_values) {
            assert_eq!(path.len(), 17);
            assert_eq!(values.len(), 17);
            assert_eq!(path[0], vec![100.0, 50.0]);
            assert_eq!(values[0], 1.0);
        }
    }

    #[test]
    fn prices_stay_strictly_positive() {
        let universe = two_asset_universe();
        let weights = held_weights(&universe);
        let config = SimulationConfig::new(2.0, 64, 50).with_seed(11);

        let result = simulate(&weights, &universe, &config).unwrap();
        assert!(result
            .prices
            .iter()
            .flatten()
            .flatten()
            .all(|price| *price > 0.0));
    }

    #[test]
    fn fixed_seed_reproduces_bit_identical_output() {
        let universe = two_asset_universe();
        let weights = held_weights(&universe);
        let config = SimulationConfig::new(1.0, 32, 64).with_seed(123);

        let a = simulate(&weights, &universe, &config).unwrap();
        let b = simulate(&weights, &universe, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_seeds_diverge() {
        let universe = two_asset_universe();
        let weights = held_weights(&universe);
        let base = SimulationConfig::new(1.0, 8, 8);

        let a = simulate(&weights, &universe, &base.with_seed(1)).unwrap();
        let b = simulate(&weights, &universe, &base.with_seed(2)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn mismatched_weights_fail_fast() {
        let universe = two_asset_universe();
        let wide = AssetUniverse::new(
            vec!["AAA".to_string(), "BBB".to_string(), "CCC".to_string()],
            vec![0.05, 0.07, 0.04],
            vec![0.20, 0.25, 0.15],
            vec![
                vec![0.04, 0.025, 0.0],
                vec![0.025, 0.0625, 0.0],
                vec![0.0, 0.0, 0.0225],
            ],
            vec![100.0, 50.0, 25.0],
        )
        .unwrap();
        let three = PortfolioWeights::from_weights(vec![0.5, 0.3, 0.2], &wide).unwrap();

        let config = SimulationConfig::new(1.0, 4, 4).with_seed(5);
        let err = simulate(&three, &universe, &config).unwrap_err();
        assert!(matches!(err, RiskError::DimensionMismatch(_)));
    }

    #[test]
    fn degenerate_config_is_rejected() {
        let universe = two_asset_universe();
        let weights = held_weights(&universe);

        for config in [
            SimulationConfig::new(0.0, 4, 4),
            SimulationConfig::new(1.0, 0, 4),
            SimulationConfig::new(1.0, 4, 0),
        ] {
            let err = simulate(&weights, &universe, &config).unwrap_err();
            assert!(matches!(err, RiskError::InvalidConfig(_)));
        }
    }

    #[test]
    fn single_asset_terminal_mean_tracks_exponential_drift() {
        // E[S_T / S_0] = exp(mu * T) under GBM.
        let universe = AssetUniverse::new(
            vec!["AAA".to_string()],
            vec![0.05],
            vec![0.20],
            vec![vec![0.04]],
            vec![100.0],
        )
        .unwrap();
        let weights = PortfolioWeights::from_weights(vec![1.0], &universe).unwrap();
        let config = SimulationConfig::new(1.0, 32, 20_000).with_seed(99);

        let result = simulate(&weights, &universe, &config).unwrap();
        let mean_terminal = result.final_values().iter().sum::<f64>() / 20_000.0;
        assert_relative_eq!(mean_terminal, (0.05_f64).exp(), epsilon = 1.0e-2);
    }
}
