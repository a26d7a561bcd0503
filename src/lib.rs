//! Portrisk estimates portfolio risk by simulating correlated future price
//! trajectories for a basket of assets and summarizing the resulting
//! distribution of outcomes.
//!
//! The pipeline is a pure, stateless function composition:
//! 1. an [`core::AssetUniverse`] carries externally estimated per-asset
//!    statistics (drift, volatility, covariance and its Cholesky factor, spot
//!    prices),
//! 2. [`simulation::simulate`] produces correlated GBM price paths and the
//!    normalized portfolio value trajectory per scenario,
//! 3. [`risk::decompose`], [`risk::compute_metrics`], and
//!    [`risk::return_histogram`] are independent consumers of the simulation
//!    output.
//!
//! Nothing here performs I/O, caches, or keeps state between calls; the
//! surrounding service layer owns ingestion, transport, and persistence.
//!
//! References:
//! - Glasserman (2004), *Monte Carlo Methods in Financial Engineering*, for
//!   correlated path generation and estimator behavior.
//! - McNeil, Frey, Embrechts (2015), *Quantitative Risk Management*, for
//!   VaR/ES definitions.
//!
//! Numerical considerations:
//! - Covariance input is regularized by a small diagonal epsilon before
//!   factorization, so boundary-PSD matrices remain factorizable.
//! - Monte Carlo statistics are sampling-driven; scenario count controls
//!   confidence, and a fixed seed gives bit-reproducible output.
//!
//! # Feature Flags
//! - `parallel`: shards scenarios across a Rayon thread pool. Results are
//!   identical to the sequential build for the same seed.
//!
//! # Quick Start
//! ```rust
//! use portrisk::core::{AssetUniverse, PortfolioWeights};
//! use portrisk::risk::{compute_metrics, decompose, return_histogram, VarianceEstimator};
//! use portrisk::simulation::{simulate, SimulationConfig};
//!
//! let universe = AssetUniverse::new(
//!     vec!["AAA".to_string(), "BBB".to_string()],
//!     vec![0.05, 0.07],
//!     vec![0.20, 0.25],
//!     vec![vec![0.04, 0.025], vec![0.025, 0.0625]],
//!     vec![100.0, 50.0],
//! )
//! .unwrap();
//! let weights = PortfolioWeights::from_weights(vec![0.6, 0.4], &universe).unwrap();
//!
//! let config = SimulationConfig::default()
//!     .with_scenarios(1_000)
//!     .with_steps(64)
//!     .with_seed(42);
//! let result = simulate(&weights, &universe, &config).unwrap();
//!
//! let metrics = compute_metrics(&result).unwrap();
//! assert!(metrics.cvar_5 <= metrics.var_5);
//!
//! let decomposition =
//!     decompose(&weights, &universe, &result, VarianceEstimator::default()).unwrap();
//! let pct: f64 = decomposition
//!     .contributions
//!     .iter()
//!     .map(|c| c.contribution_pct)
//!     .sum();
//! assert!((pct - 100.0).abs() < 1.0e-6);
//!
//! let returns: Vec<f64> = result
//!     .final_values()
//!     .iter()
//!     .map(|v| v - 1.0)
//!     .collect();
//! let histogram = return_histogram(&returns, 50).unwrap();
//! assert_eq!(histogram.total_count(), 1_000);
//! ```

pub mod core;
pub mod math;
pub mod risk;
pub mod simulation;

/// Common imports for ergonomic usage.
pub mod prelude {
    pub use crate::core::{AssetUniverse, PortfolioWeights, RiskError};
    pub use crate::risk::{
        compute_metrics, decompose, return_histogram, RiskContribution, RiskDecomposition,
        RiskMetrics, ReturnHistogram, VarianceEstimator,
    };
    pub use crate::simulation::{simulate, SimulationConfig, SimulationResult};
}
