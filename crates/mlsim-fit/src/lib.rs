#![deny(missing_docs)]

//! Bayesian fit of the varying-intercept, varying-slope Gaussian model.
//!
//! [`fit`] runs independent Gibbs chains in parallel; [`load_or_fit`] wraps it
//! with a JSON artefact cache. A [`FittedModel`] answers summary and
//! posterior-prediction queries.

/// Fit artefact persistence and the cache adapter.
pub mod cache;
/// YAML configuration schema and defaults.
pub mod config;
/// Deterministic seed derivation helpers.
pub mod determinism;
/// Split R̂ and effective sample size.
pub mod diagnostics;
/// Posterior draw containers.
pub mod draws;
mod gibbs;
/// Parallel chain runner and the public `fit` entry point.
pub mod kernel;
mod model;
/// Posterior predictions for new condition values.
pub mod predict;
/// Parameter summaries and convergence reporting.
pub mod summary;

pub use cache::{input_hash, load_or_fit, CacheOutcome, FitArtifact, ARTIFACT_SCHEMA};
pub use config::{CacheConfig, CachePolicy, FitConfig, PriorConfig, SamplingKey};
pub use draws::{ChainDraws, FittedModel, PosteriorDraw, PARAMETER_NAMES};
pub use kernel::fit;
pub use predict::{Grouping, PredictKind, PredictOptions};
pub use summary::{FitDiagnostics, FitSummary, ParameterSummary, RHAT_THRESHOLD};
