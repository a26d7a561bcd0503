//! Equal-width histogram binning of simulated returns.
//!
//! The histogram spans `[min, max]` of the sample. Edges are left edges; a
//! value equal to the global maximum lands in the last bin, and a degenerate
//! sample (`min == max`) collapses into the first bin. Counts always sum to
//! the sample size.

use serde::{Deserialize, Serialize};

use crate::core::RiskError;

/// Default number of bins for downstream visualization.
pub const DEFAULT_BIN_COUNT: usize = 50;

/// Binned distribution: parallel arrays of bin left edges and counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnHistogram {
    /// Left edge of each bin, ascending.
    pub edges: Vec<f64>,
    /// Sample count per bin.
    pub counts: Vec<u64>,
}

impl ReturnHistogram {
    /// Total number of binned samples.
    pub fn total_count(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Bins `values` into `bin_count` equal-width bins spanning `[min, max]`.
///
/// # Examples
/// ```rust
/// use portrisk::risk::return_histogram;
///
/// let returns = [-0.2, -0.1, 0.0, 0.1, 0.1, 0.3];
/// let hist = return_histogram(&returns, 5).unwrap();
/// assert_eq!(hist.edges.len(), 5);
/// assert_eq!(hist.total_count(), 6);
/// ```
pub fn return_histogram(values: &[f64], bin_count: usize) -> Result<ReturnHistogram, RiskError> {
    if bin_count == 0 {
        return Err(RiskError::InvalidConfig(
            "bin count must be >= 1".to_string(),
        ));
    }
    if values.is_empty() {
        return Err(RiskError::InvalidConfig(
            "histogram input must not be empty".to_string(),
        ));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(RiskError::InvalidConfig(
            "histogram input must be finite".to_string(),
        ));
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = (max - min) / bin_count as f64;

    let edges: Vec<f64> = (0..bin_count).map(|i| min + width * i as f64).collect();
    let mut counts = vec![0_u64; bin_count];
    for &v in values {
        let idx = if width > 0.0 {
            (((v - min) / width) as usize).min(bin_count - 1)
        } else {
            0
        };
        counts[idx] += 1;
    }

    Ok(ReturnHistogram { edges, counts })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn counts_sum_to_sample_size() {
        let values: Vec<f64> = (0..1000).map(|i| (i as f64) * 0.003 - 1.5).collect();
        for bins in [1, 2, 7, DEFAULT_BIN_COUNT, 333] {
            let hist = return_histogram(&values, bins).unwrap();
            assert_eq!(hist.total_count(), 1000);
            assert_eq!(hist.edges.len(), bins);
            assert_eq!(hist.counts.len(), bins);
        }
    }

    #[test]
    fn edges_are_equal_width_left_edges() {
        let values = [0.0, 1.0, 2.0, 3.0, 4.0];
        let hist = return_histogram(&values, 4).unwrap();

        assert_relative_eq!(hist.edges[0], 0.0, epsilon = 1.0e-12);
        assert_relative_eq!(hist.edges[1], 1.0, epsilon = 1.0e-12);
        assert_relative_eq!(hist.edges[3], 3.0, epsilon = 1.0e-12);
        // The maximum lands in the last bin, not past it.
        assert_eq!(hist.counts, vec![1, 1, 1, 2]);
    }

    #[test]
    fn degenerate_sample_collapses_into_first_bin() {
        let values = [0.25; 9];
        let hist = return_histogram(&values, 5).unwrap();
        assert_eq!(hist.counts[0], 9);
        assert!(hist.counts[1..].iter().all(|c| *c == 0));
        assert_relative_eq!(hist.edges[0], 0.25, epsilon = 1.0e-12);
    }

    #[test]
    fn zero_bins_and_empty_input_are_rejected() {
        assert!(matches!(
            return_histogram(&[1.0], 0).unwrap_err(),
            RiskError::InvalidConfig(_)
        ));
        assert!(matches!(
            return_histogram(&[], 10).unwrap_err(),
            RiskError::InvalidConfig(_)
        ));
    }

    #[test]
    fn single_bin_spans_everything() {
        let values = [-1.0, 0.0, 2.0];
        let hist = return_histogram(&values, 1).unwrap();
        assert_eq!(hist.counts, vec![3]);
        assert_relative_eq!(hist.edges[0], -1.0, epsilon = 1.0e-12);
    }
}
