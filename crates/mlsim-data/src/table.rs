//! CSV persistence for observation and participant tables.

use std::fs;
use std::path::Path;

use mlsim_core::{ErrorInfo, MlsimError};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::generate::{Observation, Participant, SimulatedData};

fn csv_error(code: &str, path: &Path, err: impl ToString) -> MlsimError {
    MlsimError::Data(ErrorInfo::new(code, err.to_string()).with_context("path", path.display()))
}

/// Writes any serializable row type as a headed CSV file.
pub fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), MlsimError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| csv_error("csv-mkdir", parent, err))?;
        }
    }
    let mut writer = csv::Writer::from_path(path).map_err(|err| csv_error("csv-open", path, err))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|err| csv_error("csv-write", path, err))?;
    }
    writer.flush().map_err(|err| csv_error("csv-flush", path, err))
}

/// Reads a headed CSV file into rows of `T`.
pub fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, MlsimError> {
    let mut reader = csv::Reader::from_path(path).map_err(|err| csv_error("csv-open", path, err))?;
    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|err| csv_error("csv-parse", path, err))
}

impl SimulatedData {
    /// Writes `participant,trial,condition,mean,measurement` rows.
    pub fn write_csv(&self, path: &Path) -> Result<(), MlsimError> {
        write_rows(path, &self.observations)
    }

    /// Writes `id,intercept,slope` rows for the drawn participants.
    pub fn write_participants_csv(&self, path: &Path) -> Result<(), MlsimError> {
        write_rows(path, &self.participants)
    }

    /// Reads an observation table; condition flags other than 0/1 are rejected.
    pub fn read_csv(path: &Path) -> Result<Self, MlsimError> {
        let observations: Vec<Observation> = read_rows(path)?;
        if observations.is_empty() {
            return Err(MlsimError::Data(
                ErrorInfo::new("observations-empty", "observation table has no rows")
                    .with_context("path", path.display()),
            ));
        }
        if let Some(row) = observations.iter().find(|row| row.condition > 1) {
            return Err(MlsimError::Data(
                ErrorInfo::new("condition-label", "condition must be 0 or 1")
                    .with_context("participant", row.participant)
                    .with_context("trial", row.trial)
                    .with_context("condition", row.condition),
            ));
        }
        Ok(Self::from_observations(observations))
    }

    /// Reads participants written by [`SimulatedData::write_participants_csv`].
    pub fn read_participants_csv(path: &Path) -> Result<Vec<Participant>, MlsimError> {
        read_rows(path)
    }
}
