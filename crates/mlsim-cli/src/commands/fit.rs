use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Args;
use mlsim_core::codec::write_json_pretty;
use mlsim_data::SimulatedData;
use mlsim_fit::{input_hash, load_or_fit, CacheOutcome, FitConfig, FitSummary, FittedModel};
use serde::Serialize;
use tracing::info;

use super::{load_data, load_fit_config};

#[derive(Args, Debug)]
pub struct FitArgs {
    /// Observation table written by `mlsim simulate`.
    #[arg(long)]
    pub data: PathBuf,
    /// YAML fit configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Output directory for `summary.json`.
    #[arg(long)]
    pub out: PathBuf,
}

#[derive(Debug, Serialize)]
struct FitReport<'a> {
    cache: CacheOutcome,
    input_hash: String,
    summary: &'a FitSummary,
}

pub fn run(args: &FitArgs) -> Result<(), Box<dyn Error>> {
    let config = load_fit_config(args.config.as_ref())?;
    let data = load_data(&args.data)?;
    let (_, summary) = fit_and_report(&data, &config, &args.out)?;
    for row in &summary.parameters {
        println!(
            "{:<40} {:>9.3} {:>9.3} [{:>8.3}, {:>8.3}] rhat {:.3}",
            row.name, row.mean, row.sd, row.lower_95, row.upper_95, row.rhat
        );
    }
    Ok(())
}

/// Loads or fits the model and writes `summary.json` under `out`.
pub fn fit_and_report(
    data: &SimulatedData,
    config: &FitConfig,
    out: &Path,
) -> Result<(FittedModel, FitSummary), Box<dyn Error>> {
    let (model, outcome) = load_or_fit(data, config)?;
    info!(?outcome, draws = model.draw_count(), "model ready");
    let summary = model.summary();
    let report = FitReport {
        cache: outcome,
        input_hash: input_hash(data, config)?,
        summary: &summary,
    };
    let path = out.join("summary.json");
    write_json_pretty(&path, &report)?;
    info!(path = %path.display(), "fit summary written");
    Ok((model, summary))
}
