use mlsim_core::stats;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::diagnostics::{effective_sample_size, split_rhat};
use crate::draws::{FittedModel, PARAMETER_NAMES};

/// R̂ above this value flags a parameter as not converged.
pub const RHAT_THRESHOLD: f64 = 1.05;

/// Posterior summary of one scalar parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSummary {
    /// Parameter name, e.g. `b_condition`.
    pub name: String,
    /// Posterior mean.
    pub mean: f64,
    /// Posterior standard deviation.
    pub sd: f64,
    /// 2.5 % quantile.
    pub lower_95: f64,
    /// 97.5 % quantile.
    pub upper_95: f64,
    /// Split R̂ across chains.
    pub rhat: f64,
    /// Effective sample size summed over chains.
    pub ess: f64,
}

/// Fit-level convergence report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitDiagnostics {
    /// True when every parameter has a finite R̂ at or below the threshold.
    pub converged: bool,
    /// Largest R̂ over all parameters.
    pub max_rhat: f64,
    /// Smallest ESS over all parameters.
    pub min_ess: f64,
    /// Parameters whose R̂ exceeded the threshold.
    pub flagged: Vec<String>,
}

/// Summary table plus diagnostics, as written to `summary.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitSummary {
    /// Chains, iterations per chain and retained draws.
    pub chains: usize,
    /// Iterations per chain including warmup.
    pub iterations: usize,
    /// Warmup iterations per chain.
    pub warmup: usize,
    /// Retained draws across chains.
    pub draws: usize,
    /// Observations the model was fit to.
    pub observations: usize,
    /// Number of participants (grouping levels).
    pub participants: usize,
    /// One entry per population-level and group-level parameter.
    pub parameters: Vec<ParameterSummary>,
    /// Convergence report.
    pub diagnostics: FitDiagnostics,
}

impl FittedModel {
    /// Summarizes every parameter. Non-convergence is logged, never an error.
    pub fn summary(&self) -> FitSummary {
        let parameters: Vec<ParameterSummary> = PARAMETER_NAMES
            .iter()
            .enumerate()
            .map(|(index, name)| self.parameter_summary(index, name))
            .collect();
        let diagnostics = diagnose(&parameters);
        if !diagnostics.converged {
            warn!(
                max_rhat = diagnostics.max_rhat,
                flagged = ?diagnostics.flagged,
                "chains have not converged; increase iterations or inspect the traces"
            );
        }
        FitSummary {
            chains: self.chains.len(),
            iterations: self.config.iterations,
            warmup: self.config.warmup,
            draws: self.draw_count(),
            observations: self.observations,
            participants: self.participant_ids.len(),
            parameters,
            diagnostics,
        }
    }

    fn parameter_summary(&self, index: usize, name: &str) -> ParameterSummary {
        let traces: Vec<Vec<f64>> = self.chains.iter().map(|chain| chain.trace(index)).collect();
        let pooled = self.pooled(index);
        let sorted = stats::sorted(&pooled);
        ParameterSummary {
            name: name.to_string(),
            mean: stats::mean(&pooled),
            sd: stats::std_dev(&pooled),
            lower_95: stats::quantile_sorted(&sorted, 0.025),
            upper_95: stats::quantile_sorted(&sorted, 0.975),
            rhat: split_rhat(&traces),
            ess: effective_sample_size(&traces),
        }
    }
}

impl FitSummary {
    /// Looks up a parameter row by name.
    pub fn parameter(&self, name: &str) -> Option<&ParameterSummary> {
        self.parameters.iter().find(|row| row.name == name)
    }
}

fn diagnose(parameters: &[ParameterSummary]) -> FitDiagnostics {
    let flagged: Vec<String> = parameters
        .iter()
        .filter(|row| !(row.rhat.is_finite() && row.rhat <= RHAT_THRESHOLD))
        .map(|row| row.name.clone())
        .collect();
    let max_rhat = parameters
        .iter()
        .map(|row| row.rhat)
        .filter(|rhat| rhat.is_finite())
        .fold(f64::NAN, f64::max);
    let min_ess = parameters
        .iter()
        .map(|row| row.ess)
        .fold(f64::INFINITY, f64::min);
    FitDiagnostics {
        converged: flagged.is_empty(),
        max_rhat,
        min_ess,
        flagged,
    }
}
