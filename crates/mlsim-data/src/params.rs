use std::path::Path;

use mlsim_core::codec::load_yaml;
use mlsim_core::{ErrorInfo, MlsimError};
use serde::{Deserialize, Serialize};

/// Parameters of the simulated two-condition experiment.
///
/// Defaults reproduce the reference scenario: 20 participants with 10 trials
/// each, a population effect of 0.5 and a negative intercept/slope correlation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Number of participants (ids run `1..=participants`).
    #[serde(default = "default_participants")]
    pub participants: u32,
    /// Trials per participant.
    #[serde(default = "default_trials")]
    pub trials: u32,
    /// Population mean of the participant intercepts.
    #[serde(default)]
    pub intercept_mean: f64,
    /// Population mean of the participant slopes (the effect size).
    #[serde(default = "default_effect_mean")]
    pub effect_mean: f64,
    /// Standard deviation of participant intercepts.
    #[serde(default = "default_intercept_sd")]
    pub intercept_sd: f64,
    /// Standard deviation of participant slopes.
    #[serde(default = "default_slope_sd")]
    pub slope_sd: f64,
    /// Correlation between intercept and slope offsets.
    #[serde(default = "default_correlation")]
    pub correlation: f64,
    /// Standard deviation of the per-trial measurement noise.
    #[serde(default = "default_noise_sd")]
    pub noise_sd: f64,
    /// Seed for the generator's RNG.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_participants() -> u32 {
    20
}

fn default_trials() -> u32 {
    10
}

fn default_effect_mean() -> f64 {
    0.5
}

fn default_intercept_sd() -> f64 {
    0.5
}

fn default_slope_sd() -> f64 {
    1.0
}

fn default_correlation() -> f64 {
    -0.5
}

fn default_noise_sd() -> f64 {
    1.0
}

fn default_seed() -> u64 {
    1
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            participants: default_participants(),
            trials: default_trials(),
            intercept_mean: 0.0,
            effect_mean: default_effect_mean(),
            intercept_sd: default_intercept_sd(),
            slope_sd: default_slope_sd(),
            correlation: default_correlation(),
            noise_sd: default_noise_sd(),
            seed: default_seed(),
        }
    }
}

impl SimulationParams {
    /// Loads parameters from a YAML file; missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, MlsimError> {
        let params: Self = load_yaml(path)?;
        params.validate()?;
        Ok(params)
    }

    /// Total number of observation rows.
    pub fn rows(&self) -> usize {
        self.participants as usize * self.trials as usize
    }

    /// Checks that the parameters describe a valid experiment.
    pub fn validate(&self) -> Result<(), MlsimError> {
        if self.participants == 0 {
            return Err(invalid("participants-zero", "at least one participant is required"));
        }
        if self.trials == 0 {
            return Err(invalid("trials-zero", "at least one trial per participant is required"));
        }
        for (name, value) in [
            ("intercept_mean", self.intercept_mean),
            ("effect_mean", self.effect_mean),
        ] {
            if !value.is_finite() {
                return Err(invalid_param(
                    "mean-non-finite",
                    "population means must be finite",
                    name,
                    value,
                ));
            }
        }
        for (name, value) in [
            ("intercept_sd", self.intercept_sd),
            ("slope_sd", self.slope_sd),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid_param(
                    "sd-non-positive",
                    "random-effect sds must be positive",
                    name,
                    value,
                ));
            }
        }
        if !(self.noise_sd.is_finite() && self.noise_sd >= 0.0) {
            return Err(invalid_param(
                "noise-sd-negative",
                "noise sd must be finite and non-negative",
                "noise_sd",
                self.noise_sd,
            ));
        }
        if !(-1.0..=1.0).contains(&self.correlation) {
            return Err(invalid_param(
                "correlation-range",
                "correlation must lie in [-1, 1]",
                "correlation",
                self.correlation,
            ));
        }
        Ok(())
    }
}

fn invalid(code: &str, message: &str) -> MlsimError {
    MlsimError::Data(ErrorInfo::new(code, message))
}

fn invalid_param(code: &str, message: &str, name: &str, value: f64) -> MlsimError {
    MlsimError::Data(ErrorInfo::new(code, message).with_context(name, value))
}
