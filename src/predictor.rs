//! Single-submission prediction flow: validate, encode, score.

use crate::feature_encoder::{EncodeError, FeatureEncoder};
use crate::form::{FormSchema, ValidationError};
use crate::metrics::PredictionMetrics;
use crate::models::artifact::{ArtifactBundle, ArtifactError};
use crate::models::inference::{InferenceEngine, InferenceError};
use crate::types::{AdImpression, ClickPrediction, InsightThresholds};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum PredictError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// Everything needed to turn a submitted impression into a prediction.
///
/// Built once from the loaded bundle and shared read-only afterwards.
pub struct ClickPredictor {
    encoder: FeatureEncoder,
    engine: InferenceEngine,
    form: FormSchema,
    thresholds: InsightThresholds,
    metrics: PredictionMetrics,
}

impl ClickPredictor {
    /// Fails when the bundle does not pass [`ArtifactBundle::validate`].
    pub fn new(
        bundle: ArtifactBundle,
        thresholds: InsightThresholds,
    ) -> Result<Self, ArtifactError> {
        let form = FormSchema::from_bundle(&bundle);
        let bundle = Arc::new(bundle);
        let engine = InferenceEngine::new(bundle.clone())?;

        Ok(Self {
            encoder: FeatureEncoder::new(bundle),
            engine,
            form,
            thresholds,
            metrics: PredictionMetrics::new(),
        })
    }

    pub fn form(&self) -> &FormSchema {
        &self.form
    }

    pub fn engine(&self) -> &InferenceEngine {
        &self.engine
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    pub fn metrics(&self) -> &PredictionMetrics {
        &self.metrics
    }

    /// Validate, encode and score one impression.
    pub fn predict(&self, impression: &AdImpression) -> Result<ClickPrediction, PredictError> {
        let start_time = Instant::now();

        let result = self.run(impression);
        match &result {
            Ok(prediction) => {
                let elapsed = start_time.elapsed();
                self.metrics.record_prediction(
                    elapsed,
                    prediction.label,
                    prediction.probability,
                    prediction.insight,
                    !prediction.unseen_categories.is_empty(),
                );
                debug!(
                    prediction_id = %prediction.prediction_id,
                    label = prediction.label,
                    probability = prediction.probability,
                    insight = prediction.insight.as_str(),
                    processing_time_us = elapsed.as_micros(),
                    "Prediction completed"
                );
            }
            Err(e) => {
                self.metrics.record_failure();
                error!(error = %e, "Error making prediction");
            }
        }
        result
    }

    fn run(&self, impression: &AdImpression) -> Result<ClickPrediction, PredictError> {
        self.form.validate(impression)?;
        let encoded = self.encoder.encode(impression)?;
        let result = self.engine.score(&encoded.row)?;
        Ok(result.to_prediction(&encoded, &self.thresholds))
    }
}
