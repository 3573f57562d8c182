use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::tempdir;

fn mlsim(cwd: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_mlsim"))
        .current_dir(cwd)
        .args(args)
        .output()
        .expect("spawn mlsim")
}

fn write_small_config(dir: &Path) {
    fs::write(
        dir.join("fit.yaml"),
        "chains: 2\niterations: 200\nwarmup: 100\ncores: 2\ncache:\n  policy: config-hash\n",
    )
    .unwrap();
    fs::write(dir.join("params.yaml"), "participants: 12\ntrials: 6\nseed: 5\n").unwrap();
}

#[test]
fn run_writes_every_artifact_and_reuses_the_cache() {
    let dir = tempdir().unwrap();
    write_small_config(dir.path());
    let args = [
        "run",
        "--params",
        "params.yaml",
        "--config",
        "fit.yaml",
        "--out",
        "out",
    ];

    let output = mlsim(dir.path(), &args);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    for name in [
        "data.csv",
        "participants.csv",
        "summary.json",
        "posterior.csv",
        "contrast.json",
        "density.svg",
        "pointrange.svg",
    ] {
        assert!(dir.path().join("out").join(name).exists(), "missing {name}");
    }
    assert!(dir.path().join("fits").join("model.json").exists());

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("out/contrast.json")).unwrap())
            .unwrap();
    assert_eq!(report["replications"], 200);
    let label = report["label"].as_str().unwrap();
    assert!(label.contains("%>0") || label.contains("%<0"));

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("out/summary.json")).unwrap())
            .unwrap();
    assert_eq!(summary["cache"], "fitted");

    let again = mlsim(dir.path(), &args);
    assert!(again.status.success());
    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("out/summary.json")).unwrap())
            .unwrap();
    assert_eq!(summary["cache"], "loaded");
}

#[test]
fn simulate_then_contrast_from_csv() {
    let dir = tempdir().unwrap();
    write_small_config(dir.path());
    let simulated = mlsim(
        dir.path(),
        &["simulate", "--params", "params.yaml", "--out", "tables"],
    );
    assert!(simulated.status.success());
    let data = fs::read_to_string(dir.path().join("tables/data.csv")).unwrap();
    assert_eq!(data.lines().count(), 73);

    let contrasted = mlsim(
        dir.path(),
        &[
            "contrast",
            "--data",
            "tables/data.csv",
            "--config",
            "fit.yaml",
            "--out",
            "results",
            "--verbose",
        ],
    );
    assert!(
        contrasted.status.success(),
        "{}",
        String::from_utf8_lossy(&contrasted.stderr)
    );
    let stdout = String::from_utf8_lossy(&contrasted.stdout);
    assert!(stdout.trim().ends_with("%>0") || stdout.trim().ends_with("%<0"));
    assert!(dir.path().join("results/density.svg").exists());
}

#[test]
fn invalid_parameters_fail_with_nonzero_status() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("bad.yaml"), "participants: 0\n").unwrap();
    let output = mlsim(dir.path(), &["simulate", "--params", "bad.yaml", "--out", "x"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("participants-zero"));
}
