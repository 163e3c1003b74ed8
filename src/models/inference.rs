//! Click-through inference engine

use crate::feature_encoder::{EncodedImpression, FeatureRow};
use crate::models::artifact::{ArtifactBundle, ArtifactError, FeatureImportance};
use crate::types::prediction::{ClickPrediction, Insight, InsightThresholds};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq)]
pub enum InferenceError {
    #[error("expected {expected} features, got {actual}")]
    FeatureCountMismatch { expected: usize, actual: usize },

    #[error("column {position} is '{actual}', model expects '{expected}'")]
    ColumnMismatch {
        position: usize,
        expected: String,
        actual: String,
    },

    #[error("feature '{0}' is not a finite number")]
    NonFiniteFeature(String),

    #[error("model produced an invalid probability: {0}")]
    InvalidProbability(f64),
}

/// Result of model inference
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionResult {
    /// Predicted class, 0 or 1
    pub label: u8,
    /// Probability of class 1 (0.0 - 1.0)
    pub probability: f64,
}

impl PredictionResult {
    /// Convert the raw result into the prediction shown to the user
    pub fn to_prediction(
        &self,
        encoded: &EncodedImpression,
        thresholds: &InsightThresholds,
    ) -> ClickPrediction {
        let insight = Insight::from_probability(self.probability, thresholds);

        ClickPrediction::new(self.label, self.probability, insight)
            .with_features(encoded.row.pairs())
            .with_unseen_categories(encoded.unseen.clone())
    }
}

/// Inference engine over the classifier in the artifact bundle
pub struct InferenceEngine {
    bundle: Arc<ArtifactBundle>,
}

impl InferenceEngine {
    /// Wrap a bundle for scoring; the bundle is checked first so that
    /// evaluation never indexes outside the row.
    pub fn new(bundle: Arc<ArtifactBundle>) -> Result<Self, ArtifactError> {
        bundle.validate()?;
        Ok(Self { bundle })
    }

    pub fn model_kind(&self) -> &'static str {
        self.bundle.model.kind()
    }

    pub fn feature_columns(&self) -> &[String] {
        &self.bundle.feature_columns
    }

    /// Top-`n` feature importance rows, if the bundle carries them
    pub fn top_features(&self, n: usize) -> Vec<FeatureImportance> {
        self.bundle.top_features(n)
    }

    /// Class probabilities `[p(no click), p(click)]` for one row
    pub fn predict_proba(&self, row: &FeatureRow) -> Result<[f64; 2], InferenceError> {
        self.check_row(row)?;

        let p = self.bundle.model.positive_probability(&row.values);
        if !(0.0..=1.0).contains(&p) {
            return Err(InferenceError::InvalidProbability(p));
        }

        Ok([1.0 - p, p])
    }

    /// Predicted class for one row; ties go to class 0
    pub fn predict(&self, row: &FeatureRow) -> Result<u8, InferenceError> {
        let [p0, p1] = self.predict_proba(row)?;
        Ok(if p1 > p0 { 1 } else { 0 })
    }

    /// Run both `predict` and `predict_proba` on a row
    pub fn score(&self, row: &FeatureRow) -> Result<PredictionResult, InferenceError> {
        let label = self.predict(row)?;
        let [_, probability] = self.predict_proba(row)?;

        debug!(
            model = self.model_kind(),
            label = label,
            probability = probability,
            "Inference complete"
        );

        Ok(PredictionResult { label, probability })
    }

    fn check_row(&self, row: &FeatureRow) -> Result<(), InferenceError> {
        let expected = &self.bundle.feature_columns;

        if row.values.len() != expected.len() || row.columns.len() != expected.len() {
            return Err(InferenceError::FeatureCountMismatch {
                expected: expected.len(),
                actual: row.values.len(),
            });
        }

        for (position, (want, have)) in expected.iter().zip(&row.columns).enumerate() {
            if want != have {
                return Err(InferenceError::ColumnMismatch {
                    position,
                    expected: want.clone(),
                    actual: have.clone(),
                });
            }
        }

        if let Some(i) = row.values.iter().position(|v| !v.is_finite()) {
            return Err(InferenceError::NonFiniteFeature(row.columns[i].clone()));
        }

        Ok(())
    }
}
