use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Args;
use mlsim_core::codec::write_json_pretty;
use mlsim_fit::{load_or_fit, FittedModel, PredictOptions};
use mlsim_plot::{density_chart, pointrange_chart, write_svg, FigureConfig};
use mlsim_post::{condition_grid, contrast, direction_label, reshape, summarize, IntervalSummary};
use serde::Serialize;
use tracing::info;

use super::{load_data, load_fit_config};

#[derive(Args, Debug)]
pub struct ContrastArgs {
    /// Observation table written by `mlsim simulate`.
    #[arg(long)]
    pub data: PathBuf,
    /// YAML fit configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Output directory for the posterior table, summary and charts.
    #[arg(long)]
    pub out: PathBuf,
    /// Chart width in pixels.
    #[arg(long, default_value_t = 480)]
    pub width: u32,
    /// Chart height in pixels.
    #[arg(long, default_value_t = 240)]
    pub height: u32,
}

impl ContrastArgs {
    fn figure(&self) -> FigureConfig {
        FigureConfig {
            width: self.width,
            height: self.height,
            ..FigureConfig::default()
        }
    }
}

#[derive(Debug, Serialize)]
struct ContrastReport<'a> {
    label: String,
    replications: usize,
    summary: &'a IntervalSummary,
}

pub fn run(args: &ContrastArgs) -> Result<(), Box<dyn Error>> {
    let config = load_fit_config(args.config.as_ref())?;
    let data = load_data(&args.data)?;
    let (model, outcome) = load_or_fit(&data, &config)?;
    info!(?outcome, "model ready");
    let summary = summarize_contrast(&model, &args.out, &args.figure())?;
    println!("{}", direction_label(&summary));
    Ok(())
}

/// Predicts both conditions, pairs them by replication and writes every artefact.
pub fn summarize_contrast(
    model: &FittedModel,
    out: &Path,
    figure: &FigureConfig,
) -> Result<IntervalSummary, Box<dyn Error>> {
    let draws = model.posterior_predict(&condition_grid(), &PredictOptions::default())?;
    let table = reshape(&draws, &[0, 1])?;
    table.write_csv(&out.join("posterior.csv"))?;

    let samples = contrast(&table)?;
    let summary = summarize(&samples)?;
    let label = direction_label(&summary);
    info!(
        mean = summary.mean,
        lower95 = summary.hdi95.lower,
        upper95 = summary.hdi95.upper,
        label = %label,
        "contrast summarized"
    );
    write_json_pretty(
        &out.join("contrast.json"),
        &ContrastReport {
            label,
            replications: samples.len(),
            summary: &summary,
        },
    )?;
    write_svg(&out.join("density.svg"), &density_chart(&samples, &summary, figure))?;
    write_svg(&out.join("pointrange.svg"), &pointrange_chart(&summary, figure))?;
    Ok(summary)
}
