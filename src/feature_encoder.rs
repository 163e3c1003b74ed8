//! Feature encoding for click-through model inference.
//!
//! Builds the single-row feature table the classifier was fitted on from a
//! submitted impression, using the vocabularies and frequency tables in the
//! artifact bundle.

use crate::models::artifact::ArtifactBundle;
use crate::types::impression::AdImpression;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Frequency assigned to a category value absent from the frequency table.
pub const UNSEEN_FREQUENCY: f64 = 1.0;

/// Index assigned to a category value outside the encoder vocabulary.
///
/// Index 0 is also the code of the first known class, which is why unseen
/// fields are reported alongside the encoded row.
pub const UNSEEN_INDEX: f64 = 0.0;

#[derive(Debug, Error, PartialEq)]
pub enum EncodeError {
    #[error("frequency map for '{0}' is missing from the model artifacts")]
    MissingFrequencyMap(&'static str),
}

/// Ordered feature name/value pairs, before reindexing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRecord {
    entries: Vec<(String, f64)>,
}

impl FeatureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a feature, replacing an earlier value of the same name.
    pub fn insert(&mut self, name: &str, value: f64) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Align the record to `columns`: listed columns in order, missing ones
    /// filled with 0, unlisted entries dropped.
    pub fn reindex(&self, columns: &[String]) -> FeatureRow {
        let values = columns
            .iter()
            .map(|column| self.get(column).unwrap_or(0.0))
            .collect();

        FeatureRow {
            columns: columns.to_vec(),
            values,
        }
    }
}

/// One row in exactly the model's column order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub columns: Vec<String>,
    pub values: Vec<f64>,
}

impl FeatureRow {
    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.values[i])
    }

    /// Column/value pairs in order.
    pub fn pairs(&self) -> Vec<(String, f64)> {
        self.columns
            .iter()
            .cloned()
            .zip(self.values.iter().copied())
            .collect()
    }
}

/// An impression after encoding.
#[derive(Debug, Clone)]
pub struct EncodedImpression {
    pub record: FeatureRecord,
    pub row: FeatureRow,
    /// Categorical fields whose value fell back to a default
    pub unseen: Vec<String>,
}

/// Transforms impressions into model input rows.
pub struct FeatureEncoder {
    bundle: Arc<ArtifactBundle>,
}

impl FeatureEncoder {
    pub fn new(bundle: Arc<ArtifactBundle>) -> Self {
        Self { bundle }
    }

    /// Number of columns in every encoded row.
    pub fn feature_count(&self) -> usize {
        self.bundle.feature_columns.len()
    }

    pub fn feature_columns(&self) -> &[String] {
        &self.bundle.feature_columns
    }

    /// Build the named feature record for an impression.
    pub fn build_record(
        &self,
        impression: &AdImpression,
    ) -> Result<(FeatureRecord, Vec<String>), EncodeError> {
        let mut record = FeatureRecord::new();
        let mut unseen = Vec::new();

        // Numeric features
        record.insert("DailyTime_Spent_on_Site", impression.daily_time_spent);
        record.insert("Age", impression.age as f64);
        record.insert("Area_Income", impression.area_income);
        record.insert("Daily_Internet_Usage", impression.daily_internet_usage);

        // Time features
        record.insert("day_of_month", impression.day_of_month as f64);
        record.insert("hour_of_day", impression.hour_of_day as f64);
        record.insert("day_of_week", impression.day_of_week as f64);
        record.insert("month", impression.month as f64);

        // Frequency encoding
        let city_frequency = self.frequency("city", &impression.city, &mut unseen)?;
        record.insert("City_frequency", city_frequency);
        let country_frequency = self.frequency("country", &impression.country, &mut unseen)?;
        record.insert("Country_frequency", country_frequency);

        // Label encoding
        record.insert(
            "City_encoded",
            self.label_index("city", &impression.city, &mut unseen),
        );
        record.insert(
            "Country_encoded",
            self.label_index("country", &impression.country, &mut unseen),
        );
        record.insert(
            "Ad_Topic_encoded",
            self.label_index("ad_topic", &impression.ad_topic, &mut unseen),
        );

        record.insert("Gender_encoded", impression.gender_flag());

        Ok((record, unseen))
    }

    /// Build the record and align it to the model's feature columns.
    pub fn encode(&self, impression: &AdImpression) -> Result<EncodedImpression, EncodeError> {
        let (record, unseen) = self.build_record(impression)?;
        let row = record.reindex(&self.bundle.feature_columns);

        if !unseen.is_empty() {
            warn!(
                fields = ?unseen,
                "Unseen category values encoded with defaults"
            );
        }

        Ok(EncodedImpression {
            record,
            row,
            unseen,
        })
    }

    fn frequency(
        &self,
        field: &'static str,
        value: &str,
        unseen: &mut Vec<String>,
    ) -> Result<f64, EncodeError> {
        let table = self
            .bundle
            .frequency_table(field)
            .ok_or(EncodeError::MissingFrequencyMap(field))?;

        Ok(match table.count(value) {
            Some(count) => count as f64,
            None => {
                unseen.push(field.to_string());
                UNSEEN_FREQUENCY
            }
        })
    }

    fn label_index(&self, field: &str, value: &str, unseen: &mut Vec<String>) -> f64 {
        match self
            .bundle
            .label_encoder(field)
            .and_then(|encoder| encoder.transform(value))
        {
            Some(index) => index as f64,
            None => {
                if !unseen.iter().any(|f| f == field) {
                    unseen.push(field.to_string());
                }
                UNSEEN_INDEX
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;

    fn encoder() -> FeatureEncoder {
        FeatureEncoder::new(Arc::new(demo::bundle()))
    }

    fn example() -> AdImpression {
        AdImpression::new("New York", "United States", "Technology")
    }

    #[test]
    fn test_known_categories_use_encoder_mapping() {
        let encoded = encoder().encode(&example()).unwrap();

        assert_eq!(encoded.row.get("City_encoded"), Some(2.0));
        assert_eq!(encoded.row.get("Country_encoded"), Some(0.0));
        assert_eq!(encoded.row.get("Ad_Topic_encoded"), Some(1.0));
        assert_eq!(encoded.row.get("City_frequency"), Some(120.0));
        assert_eq!(encoded.row.get("Country_frequency"), Some(300.0));
        assert_eq!(encoded.row.get("Gender_encoded"), Some(1.0));
        assert!(encoded.unseen.is_empty());
    }

    #[test]
    fn test_unseen_categories_default() {
        let mut impression = example();
        impression.city = "Atlantis".to_string();
        impression.country = "Narnia".to_string();

        let encoded = encoder().encode(&impression).unwrap();

        assert_eq!(encoded.row.get("City_encoded"), Some(UNSEEN_INDEX));
        assert_eq!(encoded.row.get("Country_encoded"), Some(UNSEEN_INDEX));
        assert_eq!(encoded.row.get("City_frequency"), Some(UNSEEN_FREQUENCY));
        assert_eq!(encoded.row.get("Country_frequency"), Some(UNSEEN_FREQUENCY));
        assert_eq!(encoded.unseen, vec!["city", "country"]);
    }

    #[test]
    fn test_numeric_fields_pass_through() {
        let mut impression = example();
        impression.age = 44;
        impression.area_income = 61234.5;
        impression.daily_time_spent = 37.25;
        impression.daily_internet_usage = 99.0;
        impression.hour_of_day = 3;

        let encoded = encoder().encode(&impression).unwrap();

        assert_eq!(encoded.row.get("Age"), Some(44.0));
        assert_eq!(encoded.row.get("Area_Income"), Some(61234.5));
        assert_eq!(encoded.row.get("DailyTime_Spent_on_Site"), Some(37.25));
        assert_eq!(encoded.row.get("Daily_Internet_Usage"), Some(99.0));
        assert_eq!(encoded.row.get("hour_of_day"), Some(3.0));
    }

    #[test]
    fn test_female_gender_flag() {
        let mut impression = example();
        impression.gender = "Female".to_string();

        let encoded = encoder().encode(&impression).unwrap();
        assert_eq!(encoded.row.get("Gender_encoded"), Some(0.0));
    }

    #[test]
    fn test_row_matches_feature_columns() {
        let encoder = encoder();
        let encoded = encoder.encode(&example()).unwrap();

        assert_eq!(encoded.row.columns, encoder.feature_columns());
        assert_eq!(encoded.row.values.len(), encoder.feature_count());
    }

    #[test]
    fn test_reindex_fills_and_drops() {
        let mut record = FeatureRecord::new();
        record.insert("a", 1.0);
        record.insert("extra", 9.0);
        record.insert("c", 3.0);

        let columns = vec!["c".to_string(), "b".to_string(), "a".to_string()];
        let row = record.reindex(&columns);

        assert_eq!(row.columns, columns);
        assert_eq!(row.values, vec![3.0, 0.0, 1.0]);
        assert_eq!(row.get("extra"), None);
    }

    #[test]
    fn test_extra_model_column_is_zero() {
        let mut bundle = demo::bundle();
        bundle.feature_columns.push("Is_Weekend".to_string());
        let encoder = FeatureEncoder::new(Arc::new(bundle));

        let encoded = encoder.encode(&example()).unwrap();
        assert_eq!(encoded.row.values.last(), Some(&0.0));
        assert_eq!(encoded.row.get("Is_Weekend"), Some(0.0));
    }

    #[test]
    fn test_missing_label_encoder_defaults_to_zero() {
        let mut bundle = demo::bundle();
        bundle.label_encoders.remove("ad_topic");
        let encoder = FeatureEncoder::new(Arc::new(bundle));

        let encoded = encoder.encode(&example()).unwrap();
        assert_eq!(encoded.row.get("Ad_Topic_encoded"), Some(0.0));
        assert_eq!(encoded.unseen, vec!["ad_topic"]);
    }

    #[test]
    fn test_missing_frequency_map_is_an_error() {
        let mut bundle = demo::bundle();
        bundle.frequency_maps.remove("country");
        let encoder = FeatureEncoder::new(Arc::new(bundle));

        assert_eq!(
            encoder.encode(&example()).unwrap_err(),
            EncodeError::MissingFrequencyMap("country")
        );
    }
}
