//! Integration test: loading artifact bundles from disk

use ctr_prediction::demo;
use ctr_prediction::models::ArtifactLoader;
use ctr_prediction::predictor::ClickPredictor;
use ctr_prediction::types::{AdImpression, InsightThresholds};
use std::io::Write;

#[test]
fn test_load_written_bundle() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let json = serde_json::to_string_pretty(&demo::bundle()).unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let bundle = ArtifactLoader::load(file.path()).unwrap();
    assert_eq!(bundle.feature_columns.len(), demo::FEATURE_COLUMNS.len());
    assert_eq!(bundle.model.kind(), "logistic_regression");

    let predictor = ClickPredictor::new(bundle, InsightThresholds::default()).unwrap();
    let prediction = predictor
        .predict(&AdImpression::new("New York", "United States", "Technology"))
        .unwrap();
    assert!((0.0..=1.0).contains(&prediction.probability));
}

#[test]
fn test_shipped_bundle_matches_demo() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/artifacts/ctr_model.json");
    let shipped = ArtifactLoader::load(path).unwrap();
    let demo = demo::bundle();

    assert_eq!(shipped.model, demo.model);
    assert_eq!(shipped.feature_columns, demo.feature_columns);

    let impression = AdImpression::new("Seattle", "Canada", "Finance");
    let a = ClickPredictor::new(shipped, InsightThresholds::default())
        .unwrap()
        .predict(&impression)
        .unwrap();
    let b = ClickPredictor::new(demo, InsightThresholds::default())
        .unwrap()
        .predict(&impression)
        .unwrap();
    assert_eq!(a.label, b.label);
    assert!((a.probability - b.probability).abs() < 1e-12);
}

#[test]
fn test_missing_file_is_an_error() {
    let err = ArtifactLoader::load("no/such/bundle.json").unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to read artifact bundle"));
}

#[test]
fn test_malformed_file_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"{\"model\": {\"kind\": \"svm\"}}").unwrap();

    assert!(ArtifactLoader::load(file.path()).is_err());
}
