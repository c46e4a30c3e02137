//! Loading model artifacts from disk.

use std::io::Write;

use symptom_triage_model::{LinearModel, ModelError};

fn write_artifact(json: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_and_predict_from_file() {
    let file = write_artifact(
        r#"{
            "labels": ["Common Cold", "Migraine"],
            "feature_names": ["runny nose", "headache"],
            "weights": [[2.5, 0.0], [0.0, 2.5]],
            "intercepts": [0.0, 0.0]
        }"#,
    );

    let model = LinearModel::load(file.path()).unwrap();

    assert_eq!(model.feature_count(), 2);
    assert_eq!(model.labels(), &["Common Cold".to_string(), "Migraine".to_string()]);
    assert_eq!(model.predict(&[0, 1]).unwrap(), "Migraine");

    let probs = model.predict_proba(&[1, 0]).unwrap();
    assert!(probs[0] > 0.9);
}

#[test]
fn test_load_rejects_inconsistent_shape() {
    let file = write_artifact(
        r#"{
            "labels": ["a", "b"],
            "feature_names": ["x"],
            "weights": [[1.0]],
            "intercepts": [0.0, 0.0]
        }"#,
    );

    let result = LinearModel::load(file.path());
    assert!(matches!(result, Err(ModelError::InvalidShape(_))));
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = LinearModel::load(dir.path().join("missing.json"));
    assert!(matches!(result, Err(ModelError::Io(_))));
}
