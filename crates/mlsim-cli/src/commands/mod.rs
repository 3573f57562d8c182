use std::error::Error;
use std::path::{Path, PathBuf};

use mlsim_data::{SimulatedData, SimulationParams};
use mlsim_fit::FitConfig;
use tracing::info;

pub mod contrast;
pub mod fit;
pub mod run;
pub mod simulate;

/// Parameters from `path`, or the reference defaults when absent.
pub fn load_params(path: Option<&PathBuf>) -> Result<SimulationParams, Box<dyn Error>> {
    Ok(match path {
        Some(path) => SimulationParams::load(path)?,
        None => SimulationParams::default(),
    })
}

/// Fit configuration from `path`, or the defaults when absent.
pub fn load_fit_config(path: Option<&PathBuf>) -> Result<FitConfig, Box<dyn Error>> {
    Ok(match path {
        Some(path) => FitConfig::load(path)?,
        None => FitConfig::default(),
    })
}

pub fn load_data(path: &Path) -> Result<SimulatedData, Box<dyn Error>> {
    let data = SimulatedData::read_csv(path)?;
    info!(path = %path.display(), rows = data.observations.len(), "observation table loaded");
    Ok(data)
}
