//! Artifact bundle loader

use crate::models::artifact::ArtifactBundle;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

/// Fields whose vocabulary the form and the encoder rely on.
const CATEGORICAL_FIELDS: [&str; 3] = ["city", "country", "ad_topic"];

/// Fields that carry a frequency table.
const FREQUENCY_FIELDS: [&str; 2] = ["city", "country"];

/// Loader for the JSON artifact bundle
pub struct ArtifactLoader;

impl ArtifactLoader {
    /// Load and validate a bundle from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<ArtifactBundle> {
        let path = path.as_ref();

        info!(path = %path.display(), "Loading model artifacts");

        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read artifact bundle {:?}", path))?;

        let bundle = Self::from_slice(&bytes)
            .with_context(|| format!("Invalid artifact bundle {:?}", path))?;

        info!(
            path = %path.display(),
            model = bundle.model.kind(),
            features = bundle.feature_columns.len(),
            encoders = bundle.label_encoders.len(),
            frequency_maps = bundle.frequency_maps.len(),
            has_importance = bundle.feature_importance.is_some(),
            "Model loaded successfully"
        );

        Ok(bundle)
    }

    /// Parse and validate a bundle from raw JSON bytes
    pub fn from_slice(bytes: &[u8]) -> Result<ArtifactBundle> {
        let bundle: ArtifactBundle =
            serde_json::from_slice(bytes).context("Failed to parse artifact JSON")?;
        bundle.validate()?;
        Self::report_gaps(&bundle);
        Ok(bundle)
    }

    /// Missing encoders and tables are tolerated at load time; the form and
    /// the encoder degrade on their own, so only warn here.
    fn report_gaps(bundle: &ArtifactBundle) {
        for field in CATEGORICAL_FIELDS {
            if bundle.label_encoder(field).is_none() {
                warn!(field, "Label encoder missing from artifact bundle");
            }
        }
        for field in FREQUENCY_FIELDS {
            if bundle.frequency_table(field).is_none() {
                warn!(field, "Frequency map missing from artifact bundle");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;

    #[test]
    fn test_from_slice_roundtrips_demo_bundle() {
        let bytes = serde_json::to_vec(&demo::bundle()).unwrap();
        let bundle = ArtifactLoader::from_slice(&bytes).unwrap();

        assert_eq!(bundle.feature_columns, demo::bundle().feature_columns);
        assert_eq!(bundle.model.kind(), "logistic_regression");
    }

    #[test]
    fn test_from_slice_rejects_malformed_json() {
        let err = ArtifactLoader::from_slice(b"{not json").unwrap_err();
        assert!(err.to_string().contains("parse"));
    }

    #[test]
    fn test_from_slice_rejects_inconsistent_model() {
        let mut value = serde_json::to_value(demo::bundle()).unwrap();
        value["model"]["coefficients"] = serde_json::json!([1.0, 2.0]);
        let bytes = serde_json::to_vec(&value).unwrap();

        let err = ArtifactLoader::from_slice(&bytes).unwrap_err();
        assert!(err.to_string().contains("invalid model"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(ArtifactLoader::load("does/not/exist.json").is_err());
    }
}
