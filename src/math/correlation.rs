//! Covariance regularization and Cholesky factorization for correlated sampling.
//!
//! References:
//! - Glasserman, P. (2004), *Monte Carlo Methods in Financial Engineering*,
//!   correlated-normal generation via Cholesky factors.
//!
//! A sample covariance matrix estimated from a finite price history can sit on
//! the boundary of the PSD cone (or just outside it through rounding). Adding a
//! small `epsilon` to the diagonal before factorizing keeps the factorization
//! well defined for every matrix that is PSD up to noise; genuinely indefinite
//! input still fails with [`RiskError::CovarianceNotPsd`].

use nalgebra::{DMatrix, SymmetricEigen};

use crate::core::RiskError;

/// Diagonal regularization added to the covariance matrix before factorization.
pub const COVARIANCE_EPSILON: f64 = 1.0e-10;

/// Pivot tolerance for the factorization: diagonal pivots below `-PIVOT_TOL`
/// reject the matrix, pivots within `[-PIVOT_TOL, PIVOT_TOL]` clamp to zero.
const PIVOT_TOL: f64 = 1.0e-12;

/// Lower-triangular Cholesky factor of `covariance + epsilon * I`.
///
/// Returns `L` with `L * L^T ~= covariance + epsilon * I`. Fails with
/// [`RiskError::CovarianceNotPsd`] when a diagonal pivot is negative beyond
/// tolerance, i.e. the matrix is indefinite even after regularization.
pub fn regularized_cholesky(
    covariance: &[Vec<f64>],
    epsilon: f64,
) -> Result<Vec<Vec<f64>>, RiskError> {
    let n = covariance.len();
    if n == 0 || covariance.iter().any(|row| row.len() != n) {
        return Err(RiskError::DimensionMismatch(
            "covariance matrix must be square and non-empty".to_string(),
        ));
    }

    let mut l = vec![vec![0.0_f64; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = covariance[i][j];
            if i == j {
                sum += epsilon;
            }
            for (&lik, &ljk) in l[i].iter().zip(l[j].iter()).take(j) {
                sum -= lik * ljk;
            }

            if i == j {
                if sum < -PIVOT_TOL {
                    return Err(RiskError::CovarianceNotPsd(format!(
                        "pivot {i} is {sum:.3e}"
                    )));
                }
                l[i][j] = sum.max(0.0).sqrt();
            } else if l[j][j] > PIVOT_TOL {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    Ok(l)
}

/// Applies a lower-triangular factor to an independent standard-normal draw,
/// producing cross-asset-correlated shocks.
pub fn correlate_normals(chol: &[Vec<f64>], indep: &[f64], out: &mut [f64]) {
    for i in 0..chol.len() {
        let mut sum = 0.0;
        for (j, lij) in chol[i].iter().enumerate().take(i + 1) {
            sum += *lij * indep[j];
        }
        out[i] = sum;
    }
}

/// Minimum eigenvalue of a symmetric matrix, `None` for non-square input.
pub fn min_eigenvalue_symmetric(matrix: &[Vec<f64>]) -> Option<f64> {
    let n = matrix.len();
    if n == 0 || matrix.iter().any(|row| row.len() != n) {
        return None;
    }

    let data = matrix
        .iter()
        .flat_map(|row| row.iter().copied())
        .collect::<Vec<_>>();
    let eig = SymmetricEigen::new(DMatrix::from_row_slice(n, n, &data));
    eig.eigenvalues.iter().copied().reduce(f64::min)
}

/// Returns `true` when the matrix is positive semidefinite within `tol`.
pub fn is_positive_semidefinite(matrix: &[Vec<f64>], tol: f64) -> bool {
    min_eigenvalue_symmetric(matrix).is_some_and(|lmin| lmin >= -tol)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn reconstruct(l: &[Vec<f64>]) -> Vec<Vec<f64>> {
        let n = l.len();
        let mut out = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in 0..n {
                out[i][j] = (0..n).map(|k| l[i][k] * l[j][k]).sum();
            }
        }
        out
    }

    #[test]
    fn factor_reproduces_regularized_covariance() {
        let cov = vec![
            vec![0.04, 0.025, 0.01],
            vec![0.025, 0.0625, 0.02],
            vec![0.01, 0.02, 0.09],
        ];
        assert!(is_positive_semidefinite(&cov, 1.0e-12));

        let l = regularized_cholesky(&cov, COVARIANCE_EPSILON).expect("factorizable");
        let product = reconstruct(&l);

        for i in 0..3 {
            for j in 0..3 {
                let expected = cov[i][j] + if i == j { COVARIANCE_EPSILON } else { 0.0 };
                assert_relative_eq!(product[i][j], expected, epsilon = 1.0e-9);
            }
        }
        // Lower-triangular shape.
        assert_eq!(l[0][1], 0.0);
        assert_eq!(l[0][2], 0.0);
        assert_eq!(l[1][2], 0.0);
    }

    #[test]
    fn indefinite_matrix_is_rejected() {
        // Eigenvalues 3 and -1: indefinite regardless of epsilon.
        let bad = vec![vec![1.0, 2.0], vec![2.0, 1.0]];
        let err = regularized_cholesky(&bad, COVARIANCE_EPSILON).unwrap_err();
        assert!(matches!(err, RiskError::CovarianceNotPsd(_)));
    }

    #[test]
    fn singular_psd_matrix_still_factorizes() {
        // Rank-1: perfectly correlated pair.
        let cov = vec![vec![0.04, 0.04], vec![0.04, 0.04]];
        let l = regularized_cholesky(&cov, COVARIANCE_EPSILON).expect("PSD boundary");
        let product = reconstruct(&l);
        assert_relative_eq!(product[0][0], 0.04 + COVARIANCE_EPSILON, epsilon = 1.0e-9);
        assert_relative_eq!(product[1][0], 0.04, epsilon = 1.0e-6);
    }

    #[test]
    fn correlated_shocks_apply_the_factor_rows() {
        let l = vec![vec![2.0, 0.0], vec![1.0, 3.0]];
        let indep = [0.5, -1.0];
        let mut out = [0.0; 2];
        correlate_normals(&l, &indep, &mut out);
        assert_relative_eq!(out[0], 1.0, epsilon = 1.0e-12);
        assert_relative_eq!(out[1], -2.5, epsilon = 1.0e-12);
    }
}
