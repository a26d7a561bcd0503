//! Risk analytics over simulated portfolio paths: variance decomposition,
//! scalar risk metrics, and return-distribution binning.
//!
//! The three submodules are independent consumers of a
//! [`SimulationResult`](crate::simulation::SimulationResult); none keeps state
//! across calls.

pub mod decomposition;
pub mod distribution;
pub mod metrics;

pub use decomposition::{decompose, RiskContribution, RiskDecomposition, VarianceEstimator};
pub use distribution::{return_histogram, ReturnHistogram, DEFAULT_BIN_COUNT};
pub use metrics::{compute_metrics, RiskMetrics};
