use std::fs;
use std::path::Path;

use mlsim_core::SchemaVersion;
use mlsim_data::{simulate_seeded, SimulationParams};
use mlsim_fit::{load_or_fit, CacheOutcome, CachePolicy, FitArtifact, FitConfig};
use tempfile::tempdir;

fn cached_config(root: &Path, policy: CachePolicy) -> FitConfig {
    let mut config = FitConfig::default();
    config.chains = 2;
    config.iterations = 60;
    config.warmup = 30;
    config.cores = 2;
    config.cache.path = root.join("fits").join("model.json");
    config.cache.policy = policy;
    config
}

#[test]
fn second_call_is_a_cache_hit() {
    let dir = tempdir().unwrap();
    let data = simulate_seeded(&SimulationParams::default()).unwrap();
    let config = cached_config(dir.path(), CachePolicy::FileExists);

    let (fitted, outcome) = load_or_fit(&data, &config).unwrap();
    assert_eq!(outcome, CacheOutcome::Fitted);
    assert!(config.cache.path.exists());

    let (loaded, outcome) = load_or_fit(&data, &config).unwrap();
    assert_eq!(outcome, CacheOutcome::Loaded);
    assert_eq!(loaded, fitted);
}

#[test]
fn file_exists_policy_ignores_changed_parameters() {
    let dir = tempdir().unwrap();
    let data = simulate_seeded(&SimulationParams::default()).unwrap();
    let config = cached_config(dir.path(), CachePolicy::FileExists);
    let (original, _) = load_or_fit(&data, &config).unwrap();

    let mut changed = config.clone();
    changed.seed = 99;
    let other_data = simulate_seeded(&SimulationParams {
        effect_mean: 3.0,
        ..SimulationParams::default()
    })
    .unwrap();
    let (reused, outcome) = load_or_fit(&other_data, &changed).unwrap();
    assert_eq!(outcome, CacheOutcome::Loaded);
    assert_eq!(reused, original);
    assert_eq!(reused.config.seed, config.seed);
}

#[test]
fn config_hash_policy_refits_on_change() {
    let dir = tempdir().unwrap();
    let data = simulate_seeded(&SimulationParams::default()).unwrap();
    let config = cached_config(dir.path(), CachePolicy::ConfigHash);
    let (_, outcome) = load_or_fit(&data, &config).unwrap();
    assert_eq!(outcome, CacheOutcome::Fitted);

    let mut changed = config.clone();
    changed.seed = 99;
    let (refit, outcome) = load_or_fit(&data, &changed).unwrap();
    assert_eq!(outcome, CacheOutcome::Refitted);
    assert_eq!(refit.config.seed, 99);

    let (again, outcome) = load_or_fit(&data, &changed).unwrap();
    assert_eq!(outcome, CacheOutcome::Loaded);
    assert_eq!(again, refit);

    // Core count does not affect draws, so it does not invalidate the artefact.
    let mut rescheduled = changed.clone();
    rescheduled.cores = 1;
    let (_, outcome) = load_or_fit(&data, &rescheduled).unwrap();
    assert_eq!(outcome, CacheOutcome::Loaded);
}

#[test]
fn corrupt_artifact_is_an_error_and_left_in_place() {
    let dir = tempdir().unwrap();
    let data = simulate_seeded(&SimulationParams::default()).unwrap();
    for policy in [CachePolicy::FileExists, CachePolicy::ConfigHash] {
        let config = cached_config(dir.path(), policy);
        fs::create_dir_all(config.cache.path.parent().unwrap()).unwrap();
        fs::write(&config.cache.path, b"{ not json").unwrap();

        let err = load_or_fit(&data, &config).unwrap_err();
        assert_eq!(err.code(), "cache-parse");
        assert!(matches!(err, mlsim_core::MlsimError::Cache(_)));
        assert_eq!(fs::read(&config.cache.path).unwrap(), b"{ not json");
    }
}

#[test]
fn incompatible_schema_is_rejected() {
    let dir = tempdir().unwrap();
    let data = simulate_seeded(&SimulationParams::default()).unwrap();
    let config = cached_config(dir.path(), CachePolicy::ConfigHash);
    load_or_fit(&data, &config).unwrap();

    let mut artifact = FitArtifact::load(&config.cache.path).unwrap();
    artifact.schema = SchemaVersion::new(2, 0, 0);
    artifact.store(&config.cache.path).unwrap();

    let err = load_or_fit(&data, &config).unwrap_err();
    assert_eq!(err.code(), "cache-schema");
}

#[test]
fn inconsistent_artifact_is_rejected() {
    let dir = tempdir().unwrap();
    let data = simulate_seeded(&SimulationParams::default()).unwrap();
    let config = cached_config(dir.path(), CachePolicy::FileExists);
    load_or_fit(&data, &config).unwrap();

    let mut artifact = FitArtifact::load(&config.cache.path).unwrap();
    artifact.model.participant_ids.pop();
    artifact.store(&config.cache.path).unwrap();

    let err = load_or_fit(&data, &config).unwrap_err();
    assert_eq!(err.code(), "artifact-inconsistent");
}

#[test]
fn disabled_cache_always_fits_and_writes_nothing() {
    let dir = tempdir().unwrap();
    let data = simulate_seeded(&SimulationParams::default()).unwrap();
    let mut config = cached_config(dir.path(), CachePolicy::FileExists);
    config.cache.enabled = false;

    for _ in 0..2 {
        let (_, outcome) = load_or_fit(&data, &config).unwrap();
        assert_eq!(outcome, CacheOutcome::Fitted);
    }
    assert!(!config.cache.path.exists());
}

#[test]
fn artifact_records_provenance() {
    let dir = tempdir().unwrap();
    let data = simulate_seeded(&SimulationParams::default()).unwrap();
    let config = cached_config(dir.path(), CachePolicy::ConfigHash);
    load_or_fit(&data, &config).unwrap();

    let artifact = FitArtifact::load(&config.cache.path).unwrap();
    assert_eq!(artifact.input_hash, mlsim_fit::input_hash(&data, &config).unwrap());
    assert_eq!(artifact.provenance.input_hash, artifact.input_hash);
    assert_eq!(artifact.provenance.seed, config.seed);
    assert!(!artifact.provenance.created_at.is_empty());
}
