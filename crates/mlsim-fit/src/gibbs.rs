//! Blocked Gibbs sampler for the varying-intercept, varying-slope model.
//!
//! The sampler works in the centered parameterization, tracking each
//! participant's coefficients `θⱼ = β + uⱼ` directly:
//!
//! ```text
//! yᵢ = zᵢᵀ θ_g[i] + εᵢ,   zᵢ = (1, xᵢ),   εᵢ ~ N(0, σ²)
//! θⱼ ~ N(β, Σ)
//! β ~ N(0, τ² I),   Σ ~ InvWishart(ν₀, S₀),   σ² ~ InvGamma(a₀, b₀)
//! ```
//!
//! Each iteration draws, in order:
//! 1. θⱼ | β, Σ, σ², y  ~ N(Qⱼ⁻¹ bⱼ, Qⱼ⁻¹), Qⱼ = ZⱼᵀZⱼ/σ² + Σ⁻¹, bⱼ = Zⱼᵀyⱼ/σ² + Σ⁻¹β
//! 2. β | θ, Σ          ~ N(Q⁻¹ b, Q⁻¹),   Q = J Σ⁻¹ + I/τ²,  b = Σ⁻¹ Σⱼ θⱼ
//! 3. Σ | θ, β          ~ InvWishart(ν₀ + J, S₀ + Σⱼ (θⱼ − β)(θⱼ − β)ᵀ)
//! 4. σ² | θ, y         ~ InvGamma(a₀ + n/2, b₀ + SSR/2)
//!
//! Participant offsets `uⱼ = θⱼ − β` are recorded with every retained draw.

use mlsim_core::{stats, ErrorInfo, MlsimError, RngHandle};
use mlsim_data::BivariateNormal;
use nalgebra::{Cholesky, Matrix2, Vector2};
use rand_distr::{ChiSquared, Distribution, Gamma};

use crate::config::{FitConfig, PriorConfig};
use crate::draws::{ChainDraws, PosteriorDraw};
use crate::model::{design_row, ModelData};

/// Lower bound on variances produced by the sampler.
const VARIANCE_FLOOR: f64 = 1e-12;

struct ChainState {
    beta: Vector2<f64>,
    /// Per-participant coefficients `θⱼ`.
    coefs: Vec<Vector2<f64>>,
    cov: Matrix2<f64>,
    sigma2: f64,
}

impl ChainState {
    fn to_draw(&self) -> PosteriorDraw {
        let sd_intercept = self.cov[(0, 0)].max(VARIANCE_FLOOR).sqrt();
        let sd_condition = self.cov[(1, 1)].max(VARIANCE_FLOOR).sqrt();
        let cor = (self.cov[(0, 1)] / (sd_intercept * sd_condition)).clamp(-1.0, 1.0);
        PosteriorDraw {
            b_intercept: self.beta[0],
            b_condition: self.beta[1],
            sd_intercept,
            sd_condition,
            cor,
            sigma: self.sigma2.sqrt(),
            effects: self
                .coefs
                .iter()
                .map(|theta| {
                    let u = theta - self.beta;
                    [u[0], u[1]]
                })
                .collect(),
        }
    }
}

/// Single-chain sampler owning its RNG stream.
pub(crate) struct GibbsSampler<'a> {
    data: &'a ModelData,
    priors: &'a PriorConfig,
    rng: RngHandle,
}

impl<'a> GibbsSampler<'a> {
    pub fn new(data: &'a ModelData, priors: &'a PriorConfig, seed: u64) -> Self {
        Self {
            data,
            priors,
            rng: RngHandle::from_seed(seed),
        }
    }

    /// Runs one chain and returns its retained draws.
    pub fn run(
        mut self,
        chain: usize,
        seed: u64,
        config: &FitConfig,
    ) -> Result<ChainDraws, MlsimError> {
        let mut state = self.initial_state();
        let mut draws = Vec::with_capacity(config.draws_per_chain());
        for iteration in 0..config.iterations {
            self.update_coefficients(&mut state)?;
            self.update_beta(&mut state)?;
            self.update_covariance(&mut state)?;
            self.update_sigma(&mut state)?;
            if iteration >= config.warmup && (iteration - config.warmup) % config.thin == 0 {
                draws.push(state.to_draw());
            }
        }
        Ok(ChainDraws { chain, seed, draws })
    }

    /// Dispersed starting point: jittered around the response mean and variance.
    fn initial_state(&mut self) -> ChainState {
        let y_mean = stats::mean(&self.data.y);
        let y_var = stats::variance(&self.data.y);
        let y_var = if y_var.is_finite() && y_var > 0.0 { y_var } else { 1.0 };
        let spread = y_var.sqrt();
        let beta = Vector2::new(
            self.rng.normal(y_mean, 0.5 * spread),
            self.rng.normal(0.0, 0.5 * spread),
        );
        let scale = self.priors.cov_scale * self.priors.cov_scale;
        ChainState {
            beta,
            coefs: vec![beta; self.data.groups.len()],
            cov: Matrix2::identity() * scale,
            sigma2: y_var * (0.5 + self.rng.uniform()),
        }
    }

    fn update_coefficients(&mut self, state: &mut ChainState) -> Result<(), MlsimError> {
        let inv_s2 = 1.0 / state.sigma2;
        let cov_inv = invert(&state.cov, "covariance-singular")?;
        let prior_linear = cov_inv * state.beta;
        for (j, group) in self.data.groups.iter().enumerate() {
            let mut zty = Vector2::zeros();
            for &i in &group.rows {
                zty += design_row(self.data.x[i]) * self.data.y[i];
            }
            let precision = group.ztz * inv_s2 + cov_inv;
            let linear = zty * inv_s2 + prior_linear;
            state.coefs[j] = draw_conditional(&precision, &linear, &mut self.rng)?;
        }
        Ok(())
    }

    fn update_beta(&mut self, state: &mut ChainState) -> Result<(), MlsimError> {
        let cov_inv = invert(&state.cov, "covariance-singular")?;
        let total: Vector2<f64> = state.coefs.iter().sum();
        let prior_precision = 1.0 / (self.priors.beta_sd * self.priors.beta_sd);
        let precision =
            cov_inv * state.coefs.len() as f64 + Matrix2::identity() * prior_precision;
        state.beta = draw_conditional(&precision, &(cov_inv * total), &mut self.rng)?;
        Ok(())
    }

    fn update_covariance(&mut self, state: &mut ChainState) -> Result<(), MlsimError> {
        let scale = self.priors.cov_scale * self.priors.cov_scale;
        let mut scatter = Matrix2::identity() * scale;
        for theta in &state.coefs {
            let u = theta - state.beta;
            scatter += u * u.transpose();
        }
        let df = self.priors.cov_df + state.coefs.len() as f64;
        state.cov = sample_inverse_wishart(df, &scatter, &mut self.rng)?;
        Ok(())
    }

    fn update_sigma(&mut self, state: &mut ChainState) -> Result<(), MlsimError> {
        let mut ssr = 0.0;
        for i in 0..self.data.rows() {
            let z = design_row(self.data.x[i]);
            let resid = self.data.y[i] - z.dot(&state.coefs[self.data.group[i]]);
            ssr += resid * resid;
        }
        let shape = self.priors.sigma_shape + 0.5 * self.data.rows() as f64;
        let rate = self.priors.sigma_rate + 0.5 * ssr;
        let gamma = Gamma::new(shape, 1.0 / rate).map_err(|err| {
            MlsimError::Fit(
                ErrorInfo::new("sigma-gamma", err.to_string())
                    .with_context("shape", shape)
                    .with_context("rate", rate),
            )
        })?;
        let precision: f64 = gamma.sample(&mut self.rng);
        state.sigma2 = (1.0 / precision).max(VARIANCE_FLOOR);
        Ok(())
    }
}

/// Draws from `N(Q⁻¹ b, Q⁻¹)` given the precision `Q` and linear term `b`.
fn draw_conditional(
    precision: &Matrix2<f64>,
    linear: &Vector2<f64>,
    rng: &mut RngHandle,
) -> Result<Vector2<f64>, MlsimError> {
    let cov = invert(precision, "precision-singular")?;
    let mean = cov * linear;
    let mvn = BivariateNormal::new(mean, cov).map_err(|err| {
        MlsimError::Fit(
            ErrorInfo::new("conditional-not-pd", err.info().message.clone())
                .with_context("precision", format!("{:?}", precision.as_slice())),
        )
    })?;
    Ok(mvn.sample(rng))
}

/// Samples `Σ ~ InvWishart(df, scale)` by drawing `Σ⁻¹ ~ Wishart(df, scale⁻¹)`
/// with the Bartlett decomposition.
pub(crate) fn sample_inverse_wishart(
    df: f64,
    scale: &Matrix2<f64>,
    rng: &mut RngHandle,
) -> Result<Matrix2<f64>, MlsimError> {
    let scale_inv = invert(scale, "wishart-scale-singular")?;
    let factor = Cholesky::new(scale_inv)
        .ok_or_else(|| {
            MlsimError::Fit(
                ErrorInfo::new(
                    "wishart-scale-not-pd",
                    "inverse-Wishart scale is not positive definite",
                )
                .with_context("scale", format!("{:?}", scale.as_slice())),
            )
        })?
        .l();
    let chi = |dof: f64| {
        ChiSquared::new(dof).map_err(|err| {
            MlsimError::Fit(ErrorInfo::new("wishart-df", err.to_string()).with_context("df", dof))
        })
    };
    let chi_first = chi(df)?;
    let chi_second = chi(df - 1.0)?;
    let c1: f64 = chi_first.sample(rng);
    let c2: f64 = chi_second.sample(rng);
    let bartlett = Matrix2::new(c1.sqrt(), 0.0, rng.standard_normal(), c2.sqrt());
    let root = factor * bartlett;
    let wishart = root * root.transpose();
    invert(&wishart, "wishart-draw-singular")
}

/// Inverts a 2x2 symmetric matrix and re-symmetrizes the result.
fn invert(matrix: &Matrix2<f64>, code: &str) -> Result<Matrix2<f64>, MlsimError> {
    let inverse = matrix.try_inverse().ok_or_else(|| {
        MlsimError::Fit(
            ErrorInfo::new(code, "matrix is not invertible")
                .with_context("matrix", format!("{:?}", matrix.as_slice())),
        )
    })?;
    Ok((inverse + inverse.transpose()) * 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_wishart_mean_matches_theory() {
        // E[Σ] = S / (df - p - 1) for p = 2.
        let scale = Matrix2::new(2.0, 0.5, 0.5, 1.0);
        let df = 10.0;
        let mut rng = RngHandle::from_seed(5);
        let draws = 20_000;
        let mut total = Matrix2::zeros();
        for _ in 0..draws {
            total += sample_inverse_wishart(df, &scale, &mut rng).unwrap();
        }
        let mean = total / draws as f64;
        let expected = scale / (df - 3.0);
        for (got, want) in mean.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 0.03, "got {got}, want {want}");
        }
    }
}
