use std::collections::BTreeMap;

use mlsim_core::{ErrorInfo, MlsimError};
use serde::{Deserialize, Serialize};

use crate::reshape::PosteriorTable;

/// Difference between the two condition predictions of one replication.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContrastSample {
    /// Replication id shared by both rows.
    pub replication: usize,
    /// Measurement at condition 1 minus measurement at condition 0.
    pub contrast: f64,
}

/// Pairs condition 1 with condition 0 rows by replication id.
///
/// Row order in the table is irrelevant. Every replication must appear
/// exactly once per condition and only labels 0 and 1 are accepted. The
/// result is sorted by replication.
pub fn contrast(table: &PosteriorTable) -> Result<Vec<ContrastSample>, MlsimError> {
    if table.is_empty() {
        return Err(MlsimError::Reshape(ErrorInfo::new(
            "contrast-empty",
            "posterior table has no rows",
        )));
    }
    let mut pairs: BTreeMap<usize, [Option<f64>; 2]> = BTreeMap::new();
    for row in table.rows() {
        let slot = match row.condition {
            0 | 1 => usize::from(row.condition),
            other => {
                return Err(MlsimError::Reshape(
                    ErrorInfo::new("contrast-unknown-condition", "condition label must be 0 or 1")
                        .with_context("condition", other)
                        .with_context("replication", row.replication),
                ))
            }
        };
        let entry = pairs.entry(row.replication).or_insert([None, None]);
        if entry[slot].replace(row.measurement).is_some() {
            return Err(MlsimError::Reshape(
                ErrorInfo::new("contrast-duplicate-row", "replication appears twice for a condition")
                    .with_context("condition", row.condition)
                    .with_context("replication", row.replication),
            ));
        }
    }
    pairs
        .into_iter()
        .map(|(replication, pair)| match pair {
            [Some(control), Some(treatment)] => Ok(ContrastSample {
                replication,
                contrast: treatment - control,
            }),
            [control, _] => Err(MlsimError::Reshape(
                ErrorInfo::new("contrast-missing-partner", "replication lacks one condition")
                    .with_context("replication", replication)
                    .with_context("missing_condition", if control.is_none() { 0 } else { 1 }),
            )),
        })
        .collect()
}

/// Contrast values in replication order.
pub fn contrast_values(samples: &[ContrastSample]) -> Vec<f64> {
    samples.iter().map(|sample| sample.contrast).collect()
}
