//! Click prediction data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Qualitative read of the click probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Insight {
    Excellent,
    Moderate,
    Poor,
}

impl Insight {
    /// Determine the tier from a probability; both bounds are exclusive.
    pub fn from_probability(probability: f64, thresholds: &InsightThresholds) -> Self {
        if probability > thresholds.excellent {
            Insight::Excellent
        } else if probability > thresholds.moderate {
            Insight::Moderate
        } else {
            Insight::Poor
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            Insight::Excellent => "Excellent targeting!",
            Insight::Moderate => "Moderate targeting.",
            Insight::Poor => "Poor targeting.",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Insight::Excellent => "This user profile shows high engagement potential.",
            Insight::Moderate => "Consider optimizing ad content or timing.",
            Insight::Poor => "This user profile is unlikely to engage.",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Insight::Excellent => "excellent",
            Insight::Moderate => "moderate",
            Insight::Poor => "poor",
        }
    }
}

/// Configurable insight tier thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightThresholds {
    pub excellent: f64,
    pub moderate: f64,
}

impl Default for InsightThresholds {
    fn default() -> Self {
        Self {
            excellent: 0.7,
            moderate: 0.5,
        }
    }
}

/// Scored impression as shown to the user and returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickPrediction {
    /// Unique prediction identifier
    pub prediction_id: String,

    /// Predicted class (1 = click)
    pub label: u8,

    /// Convenience mirror of `label == 1`
    pub will_click: bool,

    /// Probability of the click class (0.0 - 1.0)
    pub probability: f64,

    pub insight: Insight,

    /// Model input, in feature column order
    pub features: Vec<(String, f64)>,

    /// Categorical fields whose value was outside the training vocabulary
    pub unseen_categories: Vec<String>,

    pub timestamp: DateTime<Utc>,
}

impl ClickPrediction {
    pub fn new(label: u8, probability: f64, insight: Insight) -> Self {
        Self {
            prediction_id: uuid::Uuid::new_v4().to_string(),
            label,
            will_click: label == 1,
            probability,
            insight,
            features: Vec::new(),
            unseen_categories: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_features(mut self, features: Vec<(String, f64)>) -> Self {
        self.features = features;
        self
    }

    pub fn with_unseen_categories(mut self, fields: Vec<String>) -> Self {
        self.unseen_categories = fields;
        self
    }

    /// Probability formatted as a percentage with one decimal, e.g. "42.3%".
    pub fn probability_percent(&self) -> String {
        format!("{:.1}%", self.probability * 100.0)
    }
}
