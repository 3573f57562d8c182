use std::path::{Path, PathBuf};

use mlsim_core::codec::load_yaml;
use mlsim_core::{ErrorInfo, MlsimError};
use serde::{Deserialize, Serialize};

/// YAML-configurable parameters governing a model fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitConfig {
    /// Number of independent Markov chains.
    #[serde(default = "default_chains")]
    pub chains: usize,
    /// Total iterations per chain, warmup included.
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Leading iterations discarded from each chain.
    #[serde(default = "default_warmup")]
    pub warmup: usize,
    /// Keep every `thin`-th post-warmup iteration.
    #[serde(default = "default_thin")]
    pub thin: usize,
    /// Worker threads used to run chains in parallel.
    #[serde(default = "default_cores")]
    pub cores: usize,
    /// Master seed; chain and prediction streams are derived from it.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Prior hyperparameters.
    #[serde(default)]
    pub priors: PriorConfig,
    /// Fit cache behaviour.
    #[serde(default)]
    pub cache: CacheConfig,
}

fn default_chains() -> usize {
    4
}

fn default_iterations() -> usize {
    2000
}

fn default_warmup() -> usize {
    1000
}

fn default_thin() -> usize {
    1
}

fn default_cores() -> usize {
    4
}

fn default_seed() -> u64 {
    1
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            chains: default_chains(),
            iterations: default_iterations(),
            warmup: default_warmup(),
            thin: default_thin(),
            cores: default_cores(),
            seed: default_seed(),
            priors: PriorConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl FitConfig {
    /// Loads and validates a configuration file.
    pub fn load(path: &Path) -> Result<Self, MlsimError> {
        let config: Self = load_yaml(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Retained draws per chain after warmup and thinning.
    pub fn draws_per_chain(&self) -> usize {
        (self.iterations - self.warmup).div_ceil(self.thin)
    }

    /// Total retained draws across all chains.
    pub fn total_draws(&self) -> usize {
        self.chains * self.draws_per_chain()
    }

    /// Rejects configurations that cannot produce any retained draws.
    pub fn validate(&self) -> Result<(), MlsimError> {
        let invalid = |code: &str, message: &str| {
            MlsimError::Fit(
                ErrorInfo::new(code, message)
                    .with_context("chains", self.chains)
                    .with_context("iterations", self.iterations)
                    .with_context("warmup", self.warmup)
                    .with_context("thin", self.thin)
                    .with_context("cores", self.cores),
            )
        };
        if self.chains == 0 {
            return Err(invalid("chains-zero", "at least one chain is required"));
        }
        if self.warmup >= self.iterations {
            return Err(invalid(
                "warmup-exceeds-iterations",
                "warmup must be smaller than the iteration count",
            ));
        }
        if self.thin == 0 {
            return Err(invalid("thin-zero", "thinning interval must be at least 1"));
        }
        if self.cores == 0 {
            return Err(invalid("cores-zero", "at least one worker thread is required"));
        }
        self.priors.validate()
    }

    /// The subset of the configuration that changes sampled values.
    ///
    /// `cores` and cache settings are excluded: chains are seeded
    /// independently of scheduling, so they never alter the draws.
    pub fn sampling_key(&self) -> SamplingKey {
        SamplingKey {
            chains: self.chains,
            iterations: self.iterations,
            warmup: self.warmup,
            thin: self.thin,
            seed: self.seed,
            priors: self.priors.clone(),
        }
    }
}

/// Hashable view of the draw-affecting configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingKey {
    /// Chain count.
    pub chains: usize,
    /// Iterations per chain.
    pub iterations: usize,
    /// Warmup iterations per chain.
    pub warmup: usize,
    /// Thinning interval.
    pub thin: usize,
    /// Master seed.
    pub seed: u64,
    /// Prior hyperparameters.
    pub priors: PriorConfig,
}

/// Weakly informative conjugate priors.
///
/// `β ~ N(0, beta_sd² I)`, `Σ ~ InvWishart(cov_df, cov_scale² I)`,
/// `σ² ~ InvGamma(sigma_shape, sigma_rate)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorConfig {
    /// Prior sd of both population-level coefficients.
    #[serde(default = "default_beta_sd")]
    pub beta_sd: f64,
    /// Inverse-Wishart degrees of freedom for the random-effect covariance.
    #[serde(default = "default_cov_df")]
    pub cov_df: f64,
    /// Scale of the inverse-Wishart prior matrix.
    #[serde(default = "default_cov_scale")]
    pub cov_scale: f64,
    /// Inverse-gamma shape for the residual variance.
    #[serde(default = "default_sigma_shape")]
    pub sigma_shape: f64,
    /// Inverse-gamma rate for the residual variance.
    #[serde(default = "default_sigma_rate")]
    pub sigma_rate: f64,
}

fn default_beta_sd() -> f64 {
    10.0
}

fn default_cov_df() -> f64 {
    3.0
}

fn default_cov_scale() -> f64 {
    1.0
}

fn default_sigma_shape() -> f64 {
    1.0
}

fn default_sigma_rate() -> f64 {
    1.0
}

impl Default for PriorConfig {
    fn default() -> Self {
        Self {
            beta_sd: default_beta_sd(),
            cov_df: default_cov_df(),
            cov_scale: default_cov_scale(),
            sigma_shape: default_sigma_shape(),
            sigma_rate: default_sigma_rate(),
        }
    }
}

impl PriorConfig {
    fn validate(&self) -> Result<(), MlsimError> {
        // Inverse-Wishart over 2x2 matrices needs df > 1.
        let checks = [
            ("beta_sd", self.beta_sd, 0.0),
            ("cov_df", self.cov_df, 1.0),
            ("cov_scale", self.cov_scale, 0.0),
            ("sigma_shape", self.sigma_shape, 0.0),
            ("sigma_rate", self.sigma_rate, 0.0),
        ];
        for (name, value, lower) in checks {
            if !(value.is_finite() && value > lower) {
                return Err(MlsimError::Fit(
                    ErrorInfo::new("prior-out-of-range", "prior hyperparameter out of range")
                        .with_context("name", name)
                        .with_context("value", value)
                        .with_context("exclusive_lower_bound", lower),
                ));
            }
        }
        Ok(())
    }
}

/// How an existing fit artefact is matched to the current inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CachePolicy {
    /// Any artefact at the path is reused, whatever parameters produced it.
    #[default]
    FileExists,
    /// The artefact is reused only when its input hash matches; otherwise refit.
    ConfigHash,
}

/// Fit cache location and policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// When false the model is always refit and nothing is written.
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    /// Artefact path, relative to the working directory unless absolute.
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,
    /// Reuse policy.
    #[serde(default)]
    pub policy: CachePolicy,
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("fits/model.json")
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            path: default_cache_path(),
            policy: CachePolicy::default(),
        }
    }
}
