//! Validated market-statistics and portfolio-weight inputs.
//!
//! An [`AssetUniverse`] bundles the per-asset statistics an external loader has
//! estimated from historical prices: annualized drift and volatility, the
//! covariance matrix, its regularized Cholesky factor, and current spot prices.
//! Every invariant is enforced at construction, so downstream code can rely on
//! consistent dimensions and a usable factor without re-validating.
//!
//! [`PortfolioWeights`] is the matching weight vector, either supplied directly
//! or reconciled from a ledger of per-ticker market values.

use crate::core::RiskError;
use crate::math::{regularized_cholesky, COVARIANCE_EPSILON};

/// Per-asset market statistics for a simulation call.
///
/// Construction validates dimensions, finiteness, symmetry of the covariance
/// matrix, and spot positivity, then factorizes `covariance + epsilon * I` into
/// a lower-triangular Cholesky factor. Fields are private so a value of this
/// type always carries a usable factor.
///
/// # Examples
/// ```rust
/// use portrisk::core::AssetUniverse;
///
/// let universe = AssetUniverse::new(
///     vec!["AAA".to_string(), "BBB".to_string()],
///     vec![0.05, 0.07],
///     vec![0.20, 0.25],
///     vec![vec![0.04, 0.025], vec![0.025, 0.0625]],
///     vec![100.0, 50.0],
/// )
/// .unwrap();
/// assert_eq!(universe.n_assets(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AssetUniverse {
    tickers: Vec<String>,
    mu: Vec<f64>,
    sigma: Vec<f64>,
    covariance: Vec<Vec<f64>>,
    cholesky: Vec<Vec<f64>>,
    spot: Vec<f64>,
}

impl AssetUniverse {
    /// Builds a universe from externally estimated statistics.
    ///
    /// `mu` and `sigma` are annualized; `covariance` is the annualized
    /// covariance of log-returns; `spot` holds current prices.
    pub fn new(
        tickers: Vec<String>,
        mu: Vec<f64>,
        sigma: Vec<f64>,
        covariance: Vec<Vec<f64>>,
        spot: Vec<f64>,
    ) -> Result<Self, RiskError> {
        let n = tickers.len();
        if n == 0 {
            return Err(RiskError::InvalidConfig(
                "universe must contain at least one asset".to_string(),
            ));
        }
        for (name, len) in [("mu", mu.len()), ("sigma", sigma.len()), ("spot", spot.len())] {
            if len != n {
                return Err(RiskError::DimensionMismatch(format!(
                    "{name} has length {len}, expected {n}"
                )));
            }
        }
        if covariance.len() != n || covariance.iter().any(|row| row.len() != n) {
            return Err(RiskError::DimensionMismatch(format!(
                "covariance must be {n}x{n}"
            )));
        }

        for (i, ticker) in tickers.iter().enumerate() {
            if tickers[..i].contains(ticker) {
                return Err(RiskError::InvalidConfig(format!(
                    "duplicate ticker {ticker}"
                )));
            }
        }
        if mu.iter().any(|x| !x.is_finite()) {
            return Err(RiskError::InvalidConfig("mu must be finite".to_string()));
        }
        if sigma.iter().any(|x| !x.is_finite() || *x < 0.0) {
            return Err(RiskError::InvalidConfig(
                "sigma must be finite and >= 0".to_string(),
            ));
        }
        if spot.iter().any(|x| !x.is_finite() || *x <= 0.0) {
            return Err(RiskError::InvalidConfig(
                "spot prices must be finite and > 0".to_string(),
            ));
        }
        for (i, row) in covariance.iter().enumerate() {
            for (j, &cij) in row.iter().enumerate() {
                if !cij.is_finite() {
                    return Err(RiskError::InvalidConfig(
                        "covariance entries must be finite".to_string(),
                    ));
                }
                if (cij - covariance[j][i]).abs() > 1.0e-8 {
                    return Err(RiskError::InvalidConfig(
                        "covariance matrix must be symmetric".to_string(),
                    ));
                }
            }
        }

        let cholesky = regularized_cholesky(&covariance, COVARIANCE_EPSILON)?;

        Ok(Self {
            tickers,
            mu,
            sigma,
            covariance,
            cholesky,
            spot,
        })
    }

    /// Number of assets in the universe.
    pub fn n_assets(&self) -> usize {
        self.tickers.len()
    }

    /// Tickers in universe order.
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    /// Annualized drift per asset.
    pub fn mu(&self) -> &[f64] {
        &self.mu
    }

    /// Annualized volatility per asset.
    pub fn sigma(&self) -> &[f64] {
        &self.sigma
    }

    /// Annualized covariance matrix.
    pub fn covariance(&self) -> &[Vec<f64>] {
        &self.covariance
    }

    /// Lower-triangular factor `L` with `L * L^T ~= covariance + epsilon * I`.
    pub fn cholesky(&self) -> &[Vec<f64>] {
        &self.cholesky
    }

    /// Current spot price per asset.
    pub fn spot(&self) -> &[f64] {
        &self.spot
    }

    /// Position of `ticker` in universe order, if present.
    pub fn index_of(&self, ticker: &str) -> Option<usize> {
        self.tickers.iter().position(|t| t == ticker)
    }
}

/// Portfolio weight vector aligned with an [`AssetUniverse`]'s asset order.
///
/// Weights sum to 1 when positions are held. The all-zero vector is a valid,
/// explicitly distinct state (no holdings); analytics that cannot handle it
/// report [`RiskError::EmptyPortfolio`] instead of dividing by zero.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioWeights(Vec<f64>);

impl PortfolioWeights {
    /// Wraps an externally derived weight vector, checking it against the
    /// universe's dimension.
    pub fn from_weights(weights: Vec<f64>, universe: &AssetUniverse) -> Result<Self, RiskError> {
        if weights.len() != universe.n_assets() {
            return Err(RiskError::DimensionMismatch(format!(
                "weights have length {}, expected {}",
                weights.len(),
                universe.n_assets()
            )));
        }
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(RiskError::InvalidConfig(
                "weights must be finite".to_string(),
            ));
        }
        Ok(Self(weights))
    }

    /// Reconciles a ledger of `(ticker, market value)` entries into normalized
    /// weights in universe order.
    ///
    /// Every well-formed entry contributes; repeated tickers accumulate. A
    /// ticker absent from the universe fails with [`RiskError::UnknownAsset`].
    /// An empty ledger yields the all-zero weight vector.
    ///
    /// # Examples
    /// ```rust
    /// use portrisk::core::{AssetUniverse, PortfolioWeights};
    ///
    /// let universe = AssetUniverse::new(
    ///     vec!["AAA".to_string(), "BBB".to_string()],
    ///     vec![0.05, 0.07],
    ///     vec![0.20, 0.25],
    ///     vec![vec![0.04, 0.025], vec![0.025, 0.0625]],
    ///     vec![100.0, 50.0],
    /// )
    /// .unwrap();
    ///
    /// let weights =
    ///     PortfolioWeights::from_holdings(&[("AAA", 3000.0), ("BBB", 1000.0)], &universe)
    ///         .unwrap();
    /// assert_eq!(weights.as_slice(), &[0.75, 0.25]);
    /// ```
    pub fn from_holdings(
        holdings: &[(&str, f64)],
        universe: &AssetUniverse,
    ) -> Result<Self, RiskError> {
        let mut values = vec![0.0_f64; universe.n_assets()];
        for (ticker, value) in holdings {
            if !value.is_finite() || *value < 0.0 {
                return Err(RiskError::InvalidConfig(format!(
                    "holding value for {ticker} must be finite and >= 0"
                )));
            }
            let idx = universe
                .index_of(ticker)
                .ok_or_else(|| RiskError::UnknownAsset((*ticker).to_string()))?;
            values[idx] += value;
        }

        let total: f64 = values.iter().sum();
        if total > 0.0 {
            for v in &mut values {
                *v /= total;
            }
        }
        Ok(Self(values))
    }

    /// Weights in universe order.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Number of weights.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the vector holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when at least one weight is nonzero.
    pub fn has_positions(&self) -> bool {
        self.0.iter().any(|w| *w != 0.0)
    }
}
