//! Core error type and validated market-input structures.

pub mod types;

pub use types::*;

/// Errors surfaced by simulation and risk analytics.
///
/// All failures are local to a single call and reported to the caller as a
/// tagged result; nothing is retried internally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RiskError {
    /// Vector or matrix shape disagreement between inputs.
    DimensionMismatch(String),
    /// No positions held; the requested statistic is undefined.
    EmptyPortfolio,
    /// Covariance matrix could not be factorized even after regularization.
    CovarianceNotPsd(String),
    /// Ledger ticker not present in the asset universe.
    UnknownAsset(String),
    /// Invalid simulation, input, or binning parameter.
    InvalidConfig(String),
}

impl std::fmt::Display for RiskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DimensionMismatch(msg) => write!(f, "dimension mismatch: {msg}"),
            Self::EmptyPortfolio => write!(f, "portfolio holds no positions"),
            Self::CovarianceNotPsd(msg) => {
                write!(f, "covariance matrix is not positive semidefinite: {msg}")
            }
            Self::UnknownAsset(ticker) => write!(f, "unknown asset: {ticker}"),
            Self::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for RiskError {}
