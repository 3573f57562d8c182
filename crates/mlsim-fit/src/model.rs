//! Design data for `measurement ~ 1 + condition + (1 + condition | participant)`.

use std::collections::BTreeMap;

use mlsim_core::{ErrorInfo, MlsimError};
use mlsim_data::SimulatedData;
use nalgebra::{Matrix2, Vector2};

/// Rows of one participant with their precomputed cross-products.
#[derive(Debug, Clone)]
pub(crate) struct Group {
    /// Indices into the flattened response/predictor vectors.
    pub rows: Vec<usize>,
    /// `Zⱼᵀ Zⱼ` for the group's `(1, x)` design rows.
    pub ztz: Matrix2<f64>,
}

/// Response, predictor and grouping structure consumed by the sampler.
#[derive(Debug, Clone)]
pub(crate) struct ModelData {
    pub y: Vec<f64>,
    pub x: Vec<f64>,
    /// Group index for each row (position in `participant_ids`).
    pub group: Vec<usize>,
    pub groups: Vec<Group>,
    pub participant_ids: Vec<u32>,
}

impl ModelData {
    pub fn from_simulated(data: &SimulatedData) -> Result<Self, MlsimError> {
        if data.observations.is_empty() {
            return Err(MlsimError::Fit(ErrorInfo::new(
                "data-empty",
                "cannot fit a model to an empty observation table",
            )));
        }
        let participant_ids = data.participant_ids();
        let index_of: BTreeMap<u32, usize> = participant_ids
            .iter()
            .enumerate()
            .map(|(index, id)| (*id, index))
            .collect();
        let mut groups: Vec<Group> = participant_ids
            .iter()
            .map(|_| Group {
                rows: Vec::new(),
                ztz: Matrix2::zeros(),
            })
            .collect();
        let mut y = Vec::with_capacity(data.observations.len());
        let mut x = Vec::with_capacity(data.observations.len());
        let mut group = Vec::with_capacity(data.observations.len());
        for (row, obs) in data.observations.iter().enumerate() {
            if !obs.measurement.is_finite() {
                return Err(MlsimError::Fit(
                    ErrorInfo::new("measurement-non-finite", "measurements must be finite")
                        .with_context("participant", obs.participant)
                        .with_context("trial", obs.trial),
                ));
            }
            let index = index_of[&obs.participant];
            let cond = f64::from(obs.condition);
            let z = design_row(cond);
            groups[index].rows.push(row);
            groups[index].ztz += z * z.transpose();
            y.push(obs.measurement);
            x.push(cond);
            group.push(index);
        }
        Ok(Self {
            y,
            x,
            group,
            groups,
            participant_ids,
        })
    }

    pub fn rows(&self) -> usize {
        self.y.len()
    }
}

/// Design row `(1, x)` shared by the fixed and random parts.
pub(crate) fn design_row(x: f64) -> Vector2<f64> {
    Vector2::new(1.0, x)
}
