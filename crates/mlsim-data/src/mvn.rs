//! Bivariate normal sampling for correlated participant effects.

use mlsim_core::{ErrorInfo, MlsimError, RngHandle};
use nalgebra::{Cholesky, Matrix2, Vector2};

/// Tolerance below which a negative Schur complement is treated as zero.
const SEMIDEFINITE_TOLERANCE: f64 = 1e-12;

/// Builds the 2x2 covariance matrix from two standard deviations and a correlation.
pub fn covariance_matrix(sd_a: f64, sd_b: f64, correlation: f64) -> Matrix2<f64> {
    let off = correlation * sd_a * sd_b;
    Matrix2::new(sd_a * sd_a, off, off, sd_b * sd_b)
}

/// Multivariate normal distribution over two coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct BivariateNormal {
    mean: Vector2<f64>,
    /// Lower-triangular factor `L` with `L Lᵀ = Σ`.
    factor: Matrix2<f64>,
}

impl BivariateNormal {
    /// Factorizes `covariance`, accepting positive semidefinite matrices
    /// (perfectly correlated effects) through an explicit 2x2 square root.
    pub fn new(mean: Vector2<f64>, covariance: Matrix2<f64>) -> Result<Self, MlsimError> {
        if covariance.iter().any(|v| !v.is_finite()) || mean.iter().any(|v| !v.is_finite()) {
            return Err(MlsimError::Data(ErrorInfo::new(
                "mvn-non-finite",
                "mean and covariance must be finite",
            )));
        }
        if (covariance[(0, 1)] - covariance[(1, 0)]).abs() > SEMIDEFINITE_TOLERANCE {
            return Err(MlsimError::Data(
                ErrorInfo::new("mvn-asymmetric", "covariance matrix must be symmetric")
                    .with_context("upper", covariance[(0, 1)])
                    .with_context("lower", covariance[(1, 0)]),
            ));
        }
        let factor = match Cholesky::new(covariance) {
            Some(chol) => chol.l(),
            None => semidefinite_factor(&covariance)?,
        };
        Ok(Self { mean, factor })
    }

    /// Draws one sample: `μ + L z` with `z` two standard normal variates.
    pub fn sample(&self, rng: &mut RngHandle) -> Vector2<f64> {
        let z = Vector2::new(rng.standard_normal(), rng.standard_normal());
        self.mean + self.factor * z
    }

    /// Draws `n` independent samples in order.
    pub fn sample_n(&self, n: usize, rng: &mut RngHandle) -> Vec<Vector2<f64>> {
        (0..n).map(|_| self.sample(rng)).collect()
    }
}

fn semidefinite_factor(covariance: &Matrix2<f64>) -> Result<Matrix2<f64>, MlsimError> {
    let a = covariance[(0, 0)];
    let b = covariance[(1, 0)];
    let c = covariance[(1, 1)];
    if a < 0.0 || c < 0.0 {
        return Err(not_psd(covariance));
    }
    if a == 0.0 {
        if b.abs() > SEMIDEFINITE_TOLERANCE {
            return Err(not_psd(covariance));
        }
        return Ok(Matrix2::new(0.0, 0.0, 0.0, c.sqrt()));
    }
    let l11 = a.sqrt();
    let l21 = b / l11;
    let schur = c - l21 * l21;
    if schur < -SEMIDEFINITE_TOLERANCE * c.max(1.0) {
        return Err(not_psd(covariance));
    }
    Ok(Matrix2::new(l11, 0.0, l21, schur.max(0.0).sqrt()))
}

fn not_psd(covariance: &Matrix2<f64>) -> MlsimError {
    MlsimError::Data(
        ErrorInfo::new("mvn-not-psd", "covariance matrix is not positive semidefinite")
            .with_context("covariance", format!("{:?}", covariance.as_slice())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_correlation_uses_semidefinite_factor() {
        let cov = covariance_matrix(1.0, 2.0, 1.0);
        let mvn = BivariateNormal::new(Vector2::zeros(), cov).unwrap();
        let mut rng = RngHandle::from_seed(3);
        for draw in mvn.sample_n(16, &mut rng) {
            assert!((draw[1] - 2.0 * draw[0]).abs() < 1e-6);
        }
    }

    #[test]
    fn indefinite_covariance_is_rejected() {
        let cov = Matrix2::new(1.0, 2.0, 2.0, 1.0);
        let err = BivariateNormal::new(Vector2::zeros(), cov).unwrap_err();
        assert_eq!(err.code(), "mvn-not-psd");
    }
}
