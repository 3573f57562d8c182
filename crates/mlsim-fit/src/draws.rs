use mlsim_core::{ErrorInfo, MlsimError};
use nalgebra::Matrix2;
use serde::{Deserialize, Serialize};

use crate::config::FitConfig;

/// Parameter names reported by the summary, in brms-style notation.
pub const PARAMETER_NAMES: [&str; 6] = [
    "b_Intercept",
    "b_condition",
    "sd_participant__Intercept",
    "sd_participant__condition",
    "cor_participant__Intercept__condition",
    "sigma",
];

/// One retained state of the sampler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosteriorDraw {
    /// Population intercept β₀.
    pub b_intercept: f64,
    /// Population condition effect β₁.
    pub b_condition: f64,
    /// Sd of participant intercept offsets.
    pub sd_intercept: f64,
    /// Sd of participant slope offsets.
    pub sd_condition: f64,
    /// Correlation between intercept and slope offsets.
    pub cor: f64,
    /// Residual sd.
    pub sigma: f64,
    /// Participant offsets `(u₀ⱼ, u₁ⱼ)` in fitted participant order.
    pub effects: Vec<[f64; 2]>,
}

impl PosteriorDraw {
    /// Scalar parameter by its position in [`PARAMETER_NAMES`].
    pub fn parameter(&self, index: usize) -> f64 {
        match index {
            0 => self.b_intercept,
            1 => self.b_condition,
            2 => self.sd_intercept,
            3 => self.sd_condition,
            4 => self.cor,
            _ => self.sigma,
        }
    }

    /// Random-effect covariance `Σ` rebuilt from sds and correlation.
    pub fn covariance(&self) -> Matrix2<f64> {
        let off = self.cor * self.sd_intercept * self.sd_condition;
        Matrix2::new(
            self.sd_intercept * self.sd_intercept,
            off,
            off,
            self.sd_condition * self.sd_condition,
        )
    }
}

/// Retained draws of a single chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainDraws {
    /// Chain index (0-based).
    pub chain: usize,
    /// Seed the chain was started from.
    pub seed: u64,
    /// Post-warmup, thinned draws in iteration order.
    pub draws: Vec<PosteriorDraw>,
}

impl ChainDraws {
    /// Trace of one scalar parameter.
    pub fn trace(&self, parameter: usize) -> Vec<f64> {
        self.draws.iter().map(|draw| draw.parameter(parameter)).collect()
    }
}

/// Handle to a fitted model: configuration, grouping levels and all draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    /// Configuration the chains were run with.
    pub config: FitConfig,
    /// Participant ids, in the order of [`PosteriorDraw::effects`].
    pub participant_ids: Vec<u32>,
    /// Number of observations the model was fit to.
    pub observations: usize,
    /// Per-chain draws ordered by chain index.
    pub chains: Vec<ChainDraws>,
}

impl FittedModel {
    /// Total number of retained draws across chains.
    pub fn draw_count(&self) -> usize {
        self.chains.iter().map(|chain| chain.draws.len()).sum()
    }

    /// All draws, chain by chain. The position in this iterator is the draw index.
    pub fn draws(&self) -> impl Iterator<Item = &PosteriorDraw> {
        self.chains.iter().flat_map(|chain| chain.draws.iter())
    }

    /// Pooled trace of a scalar parameter across chains.
    pub fn pooled(&self, parameter: usize) -> Vec<f64> {
        self.draws().map(|draw| draw.parameter(parameter)).collect()
    }

    /// Checks internal consistency; used when a model is read back from disk.
    pub fn check_consistency(&self) -> Result<(), MlsimError> {
        let inconsistent = |message: &str| {
            MlsimError::Cache(
                ErrorInfo::new("artifact-inconsistent", message)
                    .with_context("chains", self.chains.len())
                    .with_context("participants", self.participant_ids.len()),
            )
        };
        if self.chains.is_empty() || self.draw_count() == 0 {
            return Err(inconsistent("fitted model holds no draws"));
        }
        if self.chains.len() != self.config.chains {
            return Err(inconsistent("chain count differs from the stored configuration"));
        }
        let groups = self.participant_ids.len();
        if self.draws().any(|draw| draw.effects.len() != groups) {
            return Err(inconsistent("participant effects do not match participant ids"));
        }
        let finite = self.draws().all(|draw| {
            (0..PARAMETER_NAMES.len()).all(|index| draw.parameter(index).is_finite())
        });
        if !finite {
            return Err(inconsistent("fitted model contains non-finite draws"));
        }
        Ok(())
    }
}
