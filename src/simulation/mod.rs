//! Correlated Monte Carlo path simulation under discretized GBM.

pub mod gbm;

pub use gbm::{simulate, SimulationConfig, SimulationResult};
