use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use mlsim_plot::FigureConfig;
use mlsim_post::direction_label;

use super::contrast::summarize_contrast;
use super::fit::fit_and_report;
use super::simulate::generate;
use super::{load_fit_config, load_params};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// YAML simulation parameters.
    #[arg(long)]
    pub params: Option<PathBuf>,
    /// YAML fit configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Output directory for every artefact.
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let params = load_params(args.params.as_ref())?;
    let config = load_fit_config(args.config.as_ref())?;
    let data = generate(&params, &args.out)?;
    let (model, fit_summary) = fit_and_report(&data, &config, &args.out)?;
    if !fit_summary.diagnostics.converged {
        println!(
            "warning: chains not converged (max rhat {:.3})",
            fit_summary.diagnostics.max_rhat
        );
    }
    let summary = summarize_contrast(&model, &args.out, &FigureConfig::default())?;
    println!(
        "contrast mean {:.3}, 95% HDI [{:.3}, {:.3}], {}",
        summary.mean,
        summary.hdi95.lower,
        summary.hdi95.upper,
        direction_label(&summary)
    );
    Ok(())
}
