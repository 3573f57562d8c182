//! On-disk fit artefacts and the load-or-fit adapter.

use std::fs;
use std::path::Path;

use mlsim_core::{stable_hash_string, ErrorInfo, MlsimError, RunProvenance, SchemaVersion};
use mlsim_data::{Observation, SimulatedData};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{CachePolicy, FitConfig, SamplingKey};
use crate::draws::FittedModel;
use crate::kernel::fit;

/// Schema written into every artefact produced by this crate.
pub const ARTIFACT_SCHEMA: SchemaVersion = SchemaVersion::new(1, 0, 0);

/// Serialized fit: schema, provenance, input hash and the fitted draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitArtifact {
    /// Artefact schema version.
    pub schema: SchemaVersion,
    /// Where and when the fit was produced.
    pub provenance: RunProvenance,
    /// SHA-256 over the observations and the sampling configuration.
    pub input_hash: String,
    /// Configuration, participant ids and per-chain draws.
    pub model: FittedModel,
}

#[derive(Deserialize)]
struct ArtifactHeader {
    schema: SchemaVersion,
}

#[derive(Serialize)]
struct InputKey<'a> {
    observations: &'a [Observation],
    sampling: SamplingKey,
}

/// What [`load_or_fit`] did to obtain the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheOutcome {
    /// An existing artefact was reused.
    Loaded,
    /// No artefact existed (or caching is off); the model was fit.
    Fitted,
    /// The artefact's input hash did not match; the model was refit and overwritten.
    Refitted,
}

fn cache_error(code: &str, err: impl ToString, path: &Path) -> MlsimError {
    MlsimError::Cache(ErrorInfo::new(code, err.to_string()).with_context("path", path.display()))
}

/// Hash identifying the inputs that determine a fit's draws.
pub fn input_hash(data: &SimulatedData, config: &FitConfig) -> Result<String, MlsimError> {
    stable_hash_string(&InputKey {
        observations: &data.observations,
        sampling: config.sampling_key(),
    })
}

impl FitArtifact {
    /// Wraps a freshly fitted model with provenance.
    pub fn new(model: FittedModel, input_hash: String) -> Self {
        let provenance = RunProvenance::stamp(input_hash.clone(), model.config.seed);
        Self {
            schema: ARTIFACT_SCHEMA,
            provenance,
            input_hash,
            model,
        }
    }

    /// Reads and validates an artefact.
    ///
    /// Unreadable files, malformed JSON, incompatible schema versions and
    /// internally inconsistent models all fail with [`MlsimError::Cache`].
    pub fn load(path: &Path) -> Result<Self, MlsimError> {
        let bytes = fs::read(path).map_err(|err| cache_error("cache-read", err, path))?;
        let header: ArtifactHeader = serde_json::from_slice(&bytes)
            .map_err(|err| cache_error("cache-parse", err, path))?;
        if !header.schema.is_compatible_with(&ARTIFACT_SCHEMA) {
            return Err(MlsimError::Cache(
                ErrorInfo::new("cache-schema", "artefact schema version is not supported")
                    .with_context("path", path.display())
                    .with_context("found", header.schema)
                    .with_context("expected", ARTIFACT_SCHEMA)
                    .with_hint("delete the artefact or point cache.path elsewhere to refit"),
            ));
        }
        let artifact: Self =
            serde_json::from_slice(&bytes).map_err(|err| cache_error("cache-parse", err, path))?;
        artifact.model.check_consistency()?;
        Ok(artifact)
    }

    /// Writes the artefact as pretty JSON, creating parent directories.
    pub fn store(&self, path: &Path) -> Result<(), MlsimError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|err| cache_error("cache-mkdir", err, parent))?;
            }
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|err| cache_error("cache-serialize", err, path))?;
        fs::write(path, json).map_err(|err| cache_error("cache-write", err, path))
    }
}

/// Returns a fitted model, reusing the artefact at `config.cache.path` when allowed.
///
/// With [`CachePolicy::FileExists`] any artefact at the path is reused, even
/// one produced from different data or settings. With
/// [`CachePolicy::ConfigHash`] a hash mismatch triggers a refit that
/// overwrites the artefact. A corrupt artefact is an error under both
/// policies and is never replaced.
pub fn load_or_fit(
    data: &SimulatedData,
    config: &FitConfig,
) -> Result<(FittedModel, CacheOutcome), MlsimError> {
    config.validate()?;
    let hash = input_hash(data, config)?;
    if !config.cache.enabled {
        info!("fit cache disabled");
        return Ok((fit(data, config)?, CacheOutcome::Fitted));
    }
    let path = config.cache.path.as_path();
    if !path.exists() {
        info!(path = %path.display(), "fit cache miss");
        let model = fit(data, config)?;
        FitArtifact::new(model.clone(), hash).store(path)?;
        info!(path = %path.display(), "fit artefact written");
        return Ok((model, CacheOutcome::Fitted));
    }

    let artifact = FitArtifact::load(path)?;
    match config.cache.policy {
        CachePolicy::FileExists => {
            warn!(
                path = %path.display(),
                inputs_changed = artifact.input_hash != hash,
                "fit cache keyed by file name only; delete the artefact or use policy config-hash after changing parameters"
            );
            info!(path = %path.display(), "fit cache hit");
            Ok((artifact.model, CacheOutcome::Loaded))
        }
        CachePolicy::ConfigHash if artifact.input_hash == hash => {
            info!(path = %path.display(), "fit cache hit");
            Ok((artifact.model, CacheOutcome::Loaded))
        }
        CachePolicy::ConfigHash => {
            info!(
                path = %path.display(),
                stored = %artifact.input_hash,
                current = %hash,
                "fit cache stale; refitting"
            );
            let model = fit(data, config)?;
            FitArtifact::new(model.clone(), hash).store(path)?;
            info!(path = %path.display(), "fit artefact written");
            Ok((model, CacheOutcome::Refitted))
        }
    }
}
