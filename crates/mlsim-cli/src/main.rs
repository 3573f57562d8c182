use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    contrast::{self, ContrastArgs},
    fit::{self, FitArgs},
    run::{self, RunArgs},
    simulate::{self, SimulateArgs},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(
    name = "mlsim",
    about = "Simulate a multilevel two-condition experiment, fit it and summarize the contrast"
)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence when set).
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a synthetic observation table.
    Simulate(SimulateArgs),
    /// Fit the hierarchical model to an observation table and summarize it.
    Fit(FitArgs),
    /// Fit (or load) the model and summarize the condition contrast.
    Contrast(ContrastArgs),
    /// Simulate, fit and summarize in one go.
    Run(RunArgs),
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Command::Simulate(args) => simulate::run(&args),
        Command::Fit(args) => fit::run(&args),
        Command::Contrast(args) => contrast::run(&args),
        Command::Run(args) => run::run(&args),
    }
}
