//! Artifact bundle produced by the training notebook.
//!
//! The bundle carries everything needed to score a single impression: the
//! fitted classifier, the categorical vocabularies, the frequency tables and
//! the exact feature column order the classifier was fitted on.

use crate::models::classifier::Classifier;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Reasons a bundle is rejected after it has been parsed.
#[derive(Debug, Error, PartialEq)]
pub enum ArtifactError {
    #[error("feature_columns is empty")]
    NoFeatureColumns,

    #[error("duplicate feature column: {0}")]
    DuplicateFeatureColumn(String),

    #[error("label encoder '{field}' has duplicate class '{class}'")]
    DuplicateClass { field: String, class: String },

    #[error("invalid model: {0}")]
    InvalidModel(String),
}

/// Fitted label encoder: the encoded index of a value is its position in
/// `classes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RawLabelEncoder", into = "RawLabelEncoder")]
pub struct LabelEncoder {
    classes: Vec<String>,
    index: HashMap<String, usize>,
}

#[derive(Serialize, Deserialize)]
struct RawLabelEncoder {
    classes: Vec<String>,
}

impl From<RawLabelEncoder> for LabelEncoder {
    fn from(raw: RawLabelEncoder) -> Self {
        Self::new(raw.classes)
    }
}

impl From<LabelEncoder> for RawLabelEncoder {
    fn from(encoder: LabelEncoder) -> Self {
        Self {
            classes: encoder.classes,
        }
    }
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Self {
        let mut index = HashMap::with_capacity(classes.len());
        for (i, class) in classes.iter().enumerate() {
            // First occurrence wins; duplicates are rejected by validation.
            index.entry(class.clone()).or_insert(i);
        }
        Self { classes, index }
    }

    /// Known category values, in encoding order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Encoded index of `value`, or `None` when it was never seen in training.
    pub fn transform(&self, value: &str) -> Option<usize> {
        self.index.get(value).copied()
    }

    fn duplicate_class(&self) -> Option<&str> {
        let mut seen = HashSet::with_capacity(self.classes.len());
        self.classes
            .iter()
            .find(|class| !seen.insert(class.as_str()))
            .map(String::as_str)
    }
}

/// Observed occurrence count per category value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrequencyTable(HashMap<String, u64>);

impl FrequencyTable {
    pub fn count(&self, value: &str) -> Option<u64> {
        self.0.get(value).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, u64)> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One row of the feature importance table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// The full artifact bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactBundle {
    pub model: Classifier,
    #[serde(default)]
    pub label_encoders: HashMap<String, LabelEncoder>,
    #[serde(default)]
    pub frequency_maps: HashMap<String, FrequencyTable>,
    pub feature_columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_importance: Option<Vec<FeatureImportance>>,
}

impl ArtifactBundle {
    /// Check the bundle is internally consistent.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.feature_columns.is_empty() {
            return Err(ArtifactError::NoFeatureColumns);
        }

        let mut seen = HashSet::with_capacity(self.feature_columns.len());
        for column in &self.feature_columns {
            if !seen.insert(column.as_str()) {
                return Err(ArtifactError::DuplicateFeatureColumn(column.clone()));
            }
        }

        for (field, encoder) in &self.label_encoders {
            if let Some(class) = encoder.duplicate_class() {
                return Err(ArtifactError::DuplicateClass {
                    field: field.clone(),
                    class: class.to_string(),
                });
            }
        }

        self.model
            .validate(self.feature_columns.len())
            .map_err(ArtifactError::InvalidModel)
    }

    pub fn label_encoder(&self, field: &str) -> Option<&LabelEncoder> {
        self.label_encoders.get(field)
    }

    pub fn frequency_table(&self, field: &str) -> Option<&FrequencyTable> {
        self.frequency_maps.get(field)
    }

    /// The `n` most important features, highest importance first.
    pub fn top_features(&self, n: usize) -> Vec<FeatureImportance> {
        let mut rows = self.feature_importance.clone().unwrap_or_default();
        rows.sort_by(|a, b| b.importance.total_cmp(&a.importance));
        rows.truncate(n);
        rows
    }
}
