use mlsim_core::errors::{ErrorInfo, MlsimError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("rows", 200)
        .with_context("reason", "example")
}

#[test]
fn data_error_surface() {
    let err = MlsimError::Data(sample_info("participants-zero", "no participants"));
    assert_eq!(err.code(), "participants-zero");
    assert_eq!(err.info().context.get("rows").map(String::as_str), Some("200"));
}

#[test]
fn interval_error_surface() {
    let err = MlsimError::Interval(sample_info("hdi-empty", "empty sample").with_hint("draw more"));
    let rendered = err.to_string();
    assert!(rendered.starts_with("interval error: empty sample (code: hdi-empty)"));
    assert!(rendered.contains("rows=200"));
    assert!(rendered.ends_with("hint: draw more"));
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = MlsimError::Cache(sample_info("cache-parse", "bad json"));
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["family"], "Cache");
    assert_eq!(json["detail"]["code"], "cache-parse");
    let restored: MlsimError = serde_json::from_value(json).unwrap();
    assert_eq!(restored, err);
}

#[test]
fn every_family_exposes_its_code() {
    let families = [
        ("data", MlsimError::Data(sample_info("a", "m"))),
        ("fit", MlsimError::Fit(sample_info("b", "m"))),
        ("cache", MlsimError::Cache(sample_info("c", "m"))),
        ("reshape", MlsimError::Reshape(sample_info("d", "m"))),
        ("interval", MlsimError::Interval(sample_info("e", "m"))),
        ("plot", MlsimError::Plot(sample_info("f", "m"))),
        ("serde", MlsimError::Serde(sample_info("g", "m"))),
    ];
    for (prefix, err) in &families {
        assert!(err.to_string().starts_with(&format!("{prefix} error: ")));
        assert_eq!(err.code().len(), 1);
    }
}
