//! Wide-to-long reshaping of posterior predictive draws.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use mlsim_core::{DrawMatrix, ErrorInfo, MlsimError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One long-form posterior predictive value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PosteriorRow {
    /// Condition label of the predictor row the value was drawn for.
    pub condition: u8,
    /// Posterior draw index, starting at 1 and shared across conditions.
    pub replication: usize,
    /// Predicted measurement.
    pub measurement: f64,
}

/// Long-form posterior predictive table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PosteriorTable {
    rows: Vec<PosteriorRow>,
}

/// Prediction grid: one row per condition level, in label order.
pub fn condition_grid() -> Vec<f64> {
    vec![0.0, 1.0]
}

fn io_error(code: &str, err: impl ToString, path: &Path) -> MlsimError {
    MlsimError::Reshape(ErrorInfo::new(code, err.to_string()).with_context("path", path.display()))
}

/// Unpivots an `S x K` draw matrix into `S * K` long rows.
///
/// Column `k` of `draws` is labelled `conditions[k]`; draw `s` becomes
/// replication `s + 1`. Rows are grouped by condition, then ordered by
/// replication.
pub fn reshape(draws: &DrawMatrix, conditions: &[u8]) -> Result<PosteriorTable, MlsimError> {
    if draws.draws() == 0 || draws.columns() == 0 {
        return Err(MlsimError::Reshape(
            ErrorInfo::new("reshape-empty", "draw matrix has no values")
                .with_context("draws", draws.draws())
                .with_context("columns", draws.columns()),
        ));
    }
    if draws.columns() != conditions.len() {
        return Err(MlsimError::Reshape(
            ErrorInfo::new(
                "reshape-label-count",
                "number of condition labels differs from the number of draw columns",
            )
            .with_context("columns", draws.columns())
            .with_context("labels", conditions.len()),
        ));
    }
    let mut seen = BTreeSet::new();
    if let Some(duplicate) = conditions.iter().find(|label| !seen.insert(**label)) {
        return Err(MlsimError::Reshape(
            ErrorInfo::new("reshape-duplicate-label", "condition labels must be distinct")
                .with_context("label", duplicate),
        ));
    }
    let mut rows = Vec::with_capacity(draws.draws() * conditions.len());
    for (values, &condition) in draws.transpose().into_iter().zip(conditions) {
        rows.extend(
            values
                .into_iter()
                .enumerate()
                .map(|(index, measurement)| PosteriorRow {
                    condition,
                    replication: index + 1,
                    measurement,
                }),
        );
    }
    debug!(rows = rows.len(), replications = draws.draws(), "reshaped posterior draws");
    Ok(PosteriorTable { rows })
}

impl PosteriorTable {
    /// Wraps rows produced elsewhere. No pairing invariants are checked here.
    pub fn from_rows(rows: Vec<PosteriorRow>) -> Self {
        Self { rows }
    }

    /// All rows in table order.
    pub fn rows(&self) -> &[PosteriorRow] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows carrying the given condition label.
    pub fn rows_for(&self, condition: u8) -> impl Iterator<Item = &PosteriorRow> {
        self.rows.iter().filter(move |row| row.condition == condition)
    }

    /// Distinct condition labels in ascending order.
    pub fn conditions(&self) -> Vec<u8> {
        self.rows
            .iter()
            .map(|row| row.condition)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Writes `condition,replication,measurement` rows as CSV.
    pub fn write_csv(&self, path: &Path) -> Result<(), MlsimError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| io_error("csv-mkdir", err, parent))?;
            }
        }
        let mut writer =
            csv::Writer::from_path(path).map_err(|err| io_error("csv-open", err, path))?;
        for row in &self.rows {
            writer
                .serialize(row)
                .map_err(|err| io_error("csv-write", err, path))?;
        }
        writer.flush().map_err(|err| io_error("csv-flush", err, path))
    }
}
