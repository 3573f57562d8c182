use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, MlsimError};

/// Dense matrix of posterior draws: one row per draw, one column per predictor row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawMatrix {
    draws: usize,
    columns: usize,
    /// Row-major values, `draws * columns` long.
    values: Vec<f64>,
}

impl DrawMatrix {
    /// Builds a matrix from row-major values, validating the shape.
    pub fn from_row_major(
        draws: usize,
        columns: usize,
        values: Vec<f64>,
    ) -> Result<Self, MlsimError> {
        if values.len() != draws * columns {
            return Err(MlsimError::Reshape(
                ErrorInfo::new("draw-matrix-shape", "value count does not match shape")
                    .with_context("draws", draws)
                    .with_context("columns", columns)
                    .with_context("values", values.len()),
            ));
        }
        Ok(Self {
            draws,
            columns,
            values,
        })
    }

    /// Builds a matrix from per-column sequences that must share one length.
    pub fn from_columns(columns: &[Vec<f64>]) -> Result<Self, MlsimError> {
        let draws = columns.first().map(Vec::len).unwrap_or(0);
        if let Some((index, column)) = columns
            .iter()
            .enumerate()
            .find(|(_, column)| column.len() != draws)
        {
            return Err(MlsimError::Reshape(
                ErrorInfo::new("draw-matrix-ragged", "columns have unequal draw counts")
                    .with_context("expected", draws)
                    .with_context("column", index)
                    .with_context("found", column.len()),
            ));
        }
        let mut values = Vec::with_capacity(draws * columns.len());
        for row in 0..draws {
            values.extend(columns.iter().map(|column| column[row]));
        }
        Self::from_row_major(draws, columns.len(), values)
    }

    /// Number of posterior draws (rows).
    pub fn draws(&self) -> usize {
        self.draws
    }

    /// Number of predictor rows (columns).
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Value at `(draw, column)`.
    pub fn get(&self, draw: usize, column: usize) -> f64 {
        self.values[draw * self.columns + column]
    }

    /// Copies one column out as a draw sequence.
    pub fn column(&self, column: usize) -> Vec<f64> {
        (0..self.draws).map(|draw| self.get(draw, column)).collect()
    }

    /// Returns the `columns x draws` transpose.
    pub fn transpose(&self) -> Vec<Vec<f64>> {
        (0..self.columns).map(|column| self.column(column)).collect()
    }
}
