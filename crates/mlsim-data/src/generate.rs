use std::collections::BTreeMap;

use mlsim_core::stats;
use mlsim_core::{MlsimError, RngHandle};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::mvn::{covariance_matrix, BivariateNormal};
use crate::params::SimulationParams;

/// Participant-level random effects drawn from the population distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    /// Identifier in `1..=participants`.
    pub id: u32,
    /// Participant intercept (population mean plus offset).
    pub intercept: f64,
    /// Participant slope on the condition flag.
    pub slope: f64,
}

/// One simulated trial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Participant the trial belongs to.
    pub participant: u32,
    /// Trial index within the participant, starting at 1.
    pub trial: u32,
    /// Condition flag: 0 for control, 1 for experimental.
    pub condition: u8,
    /// Noise-free expected measurement `intercept + slope * condition`.
    pub mean: f64,
    /// Observed measurement `mean + noise`.
    pub measurement: f64,
}

/// Output of the generator: effects and the flattened observation table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedData {
    /// Participants in id order.
    pub participants: Vec<Participant>,
    /// Observations ordered participant-major, then by trial.
    pub observations: Vec<Observation>,
}

impl SimulatedData {
    /// Wraps an observation table loaded from elsewhere (participants unknown).
    pub fn from_observations(observations: Vec<Observation>) -> Self {
        Self {
            participants: Vec::new(),
            observations,
        }
    }

    /// Number of rows per condition label.
    pub fn condition_counts(&self) -> BTreeMap<u8, usize> {
        let mut counts = BTreeMap::new();
        for row in &self.observations {
            *counts.entry(row.condition).or_insert(0) += 1;
        }
        counts
    }

    /// Distinct participant ids in first-seen order.
    pub fn participant_ids(&self) -> Vec<u32> {
        let mut seen = Vec::new();
        for row in &self.observations {
            if !seen.contains(&row.participant) {
                seen.push(row.participant);
            }
        }
        seen
    }
}

/// Condition flags for a flattened table of `len` rows.
///
/// The pattern `0, 1` repeats across the whole participant x trial table
/// rather than within each participant, so row `k` receives `k % 2`. When
/// `len` is odd the last cycle is cut short and condition 0 gets one extra row.
pub fn condition_pattern(len: usize) -> impl Iterator<Item = u8> {
    [0u8, 1u8].into_iter().cycle().take(len)
}

/// Draws the participant random effects in id order.
pub fn draw_participants(
    params: &SimulationParams,
    rng: &mut RngHandle,
) -> Result<Vec<Participant>, MlsimError> {
    params.validate()?;
    let cov = covariance_matrix(params.intercept_sd, params.slope_sd, params.correlation);
    let mvn = BivariateNormal::new(
        Vector2::new(params.intercept_mean, params.effect_mean),
        cov,
    )?;
    Ok(mvn
        .sample_n(params.participants as usize, rng)
        .into_iter()
        .zip(1..)
        .map(|(draw, id)| Participant {
            id,
            intercept: draw[0],
            slope: draw[1],
        })
        .collect())
}

/// Simulates the full experiment using the caller's generator.
///
/// All participant effects are drawn first, then one noise value per row in
/// table order; changing that order changes every downstream number.
pub fn simulate(
    params: &SimulationParams,
    rng: &mut RngHandle,
) -> Result<SimulatedData, MlsimError> {
    let participants = draw_participants(params, rng)?;
    let trials = params.trials;
    let mut conditions = condition_pattern(params.rows());
    let mut observations = Vec::with_capacity(params.rows());
    for participant in &participants {
        for trial in 1..=trials {
            let condition = conditions.next().unwrap_or(0);
            let mean = participant.intercept + participant.slope * f64::from(condition);
            let measurement = rng.normal(mean, params.noise_sd);
            observations.push(Observation {
                participant: participant.id,
                trial,
                condition,
                mean,
                measurement,
            });
        }
    }
    debug!(
        rows = observations.len(),
        participants = participants.len(),
        "simulated observation table"
    );
    Ok(SimulatedData {
        participants,
        observations,
    })
}

/// Simulates with a fresh generator seeded from `params.seed`.
pub fn simulate_seeded(params: &SimulationParams) -> Result<SimulatedData, MlsimError> {
    let mut rng = RngHandle::from_seed(params.seed);
    simulate(params, &mut rng)
}

/// Empirical moments of drawn random effects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectMoments {
    /// Mean participant intercept.
    pub intercept_mean: f64,
    /// Mean participant slope.
    pub slope_mean: f64,
    /// Sample sd of intercepts.
    pub intercept_sd: f64,
    /// Sample sd of slopes.
    pub slope_sd: f64,
    /// Pearson correlation of intercepts and slopes.
    pub correlation: f64,
}

impl EffectMoments {
    /// Computes moments over `participants`; sds and correlation are `NaN` below two draws.
    pub fn from_participants(participants: &[Participant]) -> Self {
        let intercepts: Vec<f64> = participants.iter().map(|p| p.intercept).collect();
        let slopes: Vec<f64> = participants.iter().map(|p| p.slope).collect();
        Self {
            intercept_mean: stats::mean(&intercepts),
            slope_mean: stats::mean(&slopes),
            intercept_sd: stats::std_dev(&intercepts),
            slope_sd: stats::std_dev(&slopes),
            correlation: stats::correlation(&intercepts, &slopes),
        }
    }
}
