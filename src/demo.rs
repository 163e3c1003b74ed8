//! Demonstration artifact bundle.
//!
//! A small logistic-regression click model over the advertising dataset
//! features. Used by the `build_demo_artifact` tool and as the test fixture.

use crate::models::artifact::{ArtifactBundle, FeatureImportance, FrequencyTable, LabelEncoder};
use crate::models::classifier::Classifier;
use std::collections::HashMap;

/// Feature columns in the order the demo model was fitted on.
pub const FEATURE_COLUMNS: [&str; 14] = [
    "DailyTime_Spent_on_Site",
    "Age",
    "Area_Income",
    "Daily_Internet_Usage",
    "day_of_month",
    "hour_of_day",
    "day_of_week",
    "month",
    "City_frequency",
    "Country_frequency",
    "City_encoded",
    "Country_encoded",
    "Ad_Topic_encoded",
    "Gender_encoded",
];

// One weight per entry of FEATURE_COLUMNS.
const COEFFICIENTS: [f64; 14] = [
    -0.065, 0.085, -0.000045, -0.028, 0.002, -0.01, 0.03, 0.01, -0.0008, -0.0004, 0.01, 0.02,
    -0.05, -0.12,
];
const INTERCEPT: f64 = 7.4;

pub const CITIES: [&str; 6] = [
    "Chicago",
    "Los Angeles",
    "New York",
    "Houston",
    "San Francisco",
    "Seattle",
];
const CITY_COUNTS: [u64; 6] = [95, 110, 120, 70, 60, 45];

pub const COUNTRIES: [&str; 5] = [
    "United States",
    "Canada",
    "United Kingdom",
    "Germany",
    "Australia",
];
const COUNTRY_COUNTS: [u64; 5] = [300, 80, 65, 40, 25];

pub const AD_TOPICS: [&str; 5] = ["Fashion", "Technology", "Sports", "Travel", "Finance"];

fn encoder(classes: &[&str]) -> LabelEncoder {
    LabelEncoder::new(classes.iter().map(|s| s.to_string()).collect())
}

fn frequencies(values: &[&str], counts: &[u64]) -> FrequencyTable {
    values
        .iter()
        .zip(counts)
        .map(|(v, c)| (v.to_string(), *c))
        .collect()
}

/// Importance of each feature as |coefficient| scaled by a typical value.
fn importance() -> Vec<FeatureImportance> {
    const TYPICAL: [f64; 14] = [
        65.0, 36.0, 55000.0, 180.0, 15.0, 12.0, 3.0, 6.0, 100.0, 200.0, 3.0, 2.0, 2.0, 0.5,
    ];
    let raw: Vec<f64> = COEFFICIENTS
        .iter()
        .zip(TYPICAL)
        .map(|(w, x)| (w * x).abs())
        .collect();
    let total: f64 = raw.iter().sum();

    let mut rows: Vec<FeatureImportance> = FEATURE_COLUMNS
        .iter()
        .zip(raw)
        .map(|(feature, r)| FeatureImportance {
            feature: feature.to_string(),
            importance: r / total,
        })
        .collect();
    rows.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    rows
}

/// Build the demonstration bundle.
pub fn bundle() -> ArtifactBundle {
    let mut label_encoders = HashMap::new();
    label_encoders.insert("city".to_string(), encoder(&CITIES));
    label_encoders.insert("country".to_string(), encoder(&COUNTRIES));
    label_encoders.insert("ad_topic".to_string(), encoder(&AD_TOPICS));

    let mut frequency_maps = HashMap::new();
    frequency_maps.insert("city".to_string(), frequencies(&CITIES, &CITY_COUNTS));
    frequency_maps.insert(
        "country".to_string(),
        frequencies(&COUNTRIES, &COUNTRY_COUNTS),
    );

    ArtifactBundle {
        model: Classifier::LogisticRegression {
            coefficients: COEFFICIENTS.to_vec(),
            intercept: INTERCEPT,
        },
        label_encoders,
        frequency_maps,
        feature_columns: FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
        feature_importance: Some(importance()),
    }
}
