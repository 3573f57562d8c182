use mlsim_core::{DrawMatrix, ErrorInfo, MlsimError, RngHandle};
use mlsim_data::BivariateNormal;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::determinism::predict_seed;
use crate::draws::{FittedModel, PosteriorDraw};

/// Which participant-level effects enter the linear predictor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "mode", content = "id")]
pub enum Grouping {
    /// Population-level coefficients only; participant offsets are dropped.
    #[default]
    Population,
    /// Condition on a participant present in the fitted data.
    Participant(u32),
    /// Draw a fresh offset `u ~ N(0, Σ)` for every posterior draw.
    NewParticipant,
}

/// Whether residual noise is added to the linear predictor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PredictKind {
    /// Posterior predictive draws: linear predictor plus `N(0, σ)` noise.
    #[default]
    Predictive,
    /// Expected value: the linear predictor alone.
    Expected,
}

/// Options for [`FittedModel::posterior_predict`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PredictOptions {
    /// Grouping treatment.
    pub grouping: Grouping,
    /// Predictive or expected draws.
    pub kind: PredictKind,
    /// Substream index; calls with the same index reproduce the same draws.
    #[serde(default)]
    pub stream: u64,
}

impl FittedModel {
    /// Draws predictions for each value in `conditions`.
    ///
    /// Returns one row per posterior draw (chains concatenated in index
    /// order) and one column per entry of `conditions`.
    pub fn posterior_predict(
        &self,
        conditions: &[f64],
        options: &PredictOptions,
    ) -> Result<DrawMatrix, MlsimError> {
        if let Some((index, value)) = conditions
            .iter()
            .enumerate()
            .find(|(_, value)| !value.is_finite())
        {
            return Err(MlsimError::Fit(
                ErrorInfo::new("newdata-non-finite", "prediction inputs must be finite")
                    .with_context("row", index)
                    .with_context("value", value),
            ));
        }
        let participant = match options.grouping {
            Grouping::Participant(id) => Some(self.participant_index(id)?),
            _ => None,
        };
        let seed = predict_seed(self.config.seed, options.stream);
        let mut rng = RngHandle::from_seed(seed);
        let mut values = Vec::with_capacity(self.draw_count() * conditions.len());
        for draw in self.draws() {
            let offset = match (options.grouping, participant) {
                (Grouping::Participant(_), Some(index)) => {
                    let [u0, u1] = draw.effects[index];
                    Vector2::new(u0, u1)
                }
                (Grouping::NewParticipant, _) => new_participant_offset(draw, &mut rng)?,
                _ => Vector2::zeros(),
            };
            let intercept = draw.b_intercept + offset[0];
            let slope = draw.b_condition + offset[1];
            for &x in conditions {
                let mu = intercept + slope * x;
                let value = match options.kind {
                    PredictKind::Predictive => rng.normal(mu, draw.sigma),
                    PredictKind::Expected => mu,
                };
                values.push(value);
            }
        }
        debug!(
            draws = self.draw_count(),
            columns = conditions.len(),
            grouping = ?options.grouping,
            kind = ?options.kind,
            seed,
            "posterior prediction"
        );
        DrawMatrix::from_row_major(self.draw_count(), conditions.len(), values)
    }

    fn participant_index(&self, id: u32) -> Result<usize, MlsimError> {
        self.participant_ids
            .iter()
            .position(|known| *known == id)
            .ok_or_else(|| {
                MlsimError::Fit(
                    ErrorInfo::new("participant-unknown", "participant was not in the fitted data")
                        .with_context("participant", id)
                        .with_context("known", self.participant_ids.len())
                        .with_hint("use Grouping::NewParticipant for unseen participants"),
                )
            })
    }
}

fn new_participant_offset(
    draw: &PosteriorDraw,
    rng: &mut RngHandle,
) -> Result<Vector2<f64>, MlsimError> {
    let mvn = BivariateNormal::new(Vector2::zeros(), draw.covariance())?;
    Ok(mvn.sample(rng))
}
