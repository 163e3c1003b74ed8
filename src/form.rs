//! Prediction form: field ranges, categorical choices and validation.

use crate::models::artifact::ArtifactBundle;
use crate::types::impression::AdImpression;
use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

const FALLBACK_CITIES: [&str; 3] = ["New York", "Los Angeles", "Chicago"];
const FALLBACK_COUNTRIES: [&str; 3] = ["United States", "Canada", "United Kingdom"];
const FALLBACK_AD_TOPICS: [&str; 3] = ["Technology", "Fashion", "Sports"];

pub const GENDERS: [&str; 2] = ["Male", "Female"];

/// How a numeric field is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Widget {
    Number,
    Slider,
}

/// A bounded numeric input.
#[derive(Debug, Clone, Serialize)]
pub struct NumericField {
    pub name: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    /// Input granularity; `None` accepts any value in range
    pub step: Option<f64>,
    pub widget: Widget,
}

impl NumericField {
    const fn number(
        name: &'static str,
        label: &'static str,
        min: f64,
        max: f64,
        default: f64,
        step: Option<f64>,
    ) -> Self {
        Self {
            name,
            label,
            min,
            max,
            default,
            step,
            widget: Widget::Number,
        }
    }

    const fn slider(
        name: &'static str,
        label: &'static str,
        min: f64,
        max: f64,
        default: f64,
    ) -> Self {
        Self {
            name,
            label,
            min,
            max,
            default,
            step: Some(1.0),
            widget: Widget::Slider,
        }
    }

    fn check(&self, value: f64) -> Result<(), ValidationError> {
        if value.is_finite() && value >= self.min && value <= self.max {
            Ok(())
        } else {
            Err(ValidationError::OutOfRange {
                field: self.label,
                value,
                min: self.min,
                max: self.max,
            })
        }
    }
}

pub const AGE: NumericField = NumericField::number("age", "Age", 18.0, 100.0, 30.0, Some(1.0));
pub const AREA_INCOME: NumericField =
    NumericField::number("area_income", "Area Income ($)", 0.0, 200000.0, 50000.0, None);
pub const DAILY_TIME_SPENT: NumericField = NumericField::number(
    "daily_time_spent",
    "Daily Time Spent on Site (minutes)",
    0.0,
    500.0,
    50.0,
    None,
);
pub const DAILY_INTERNET_USAGE: NumericField = NumericField::number(
    "daily_internet_usage",
    "Daily Internet Usage (minutes)",
    0.0,
    500.0,
    150.0,
    None,
);
pub const HOUR_OF_DAY: NumericField =
    NumericField::slider("hour_of_day", "Hour of Day", 0.0, 23.0, 12.0);
pub const DAY_OF_MONTH: NumericField =
    NumericField::slider("day_of_month", "Day of Month", 1.0, 31.0, 15.0);
pub const DAY_OF_WEEK: NumericField =
    NumericField::slider("day_of_week", "Day of Week (0=Monday)", 0.0, 6.0, 3.0);
pub const MONTH: NumericField = NumericField::slider("month", "Month", 1.0, 12.0, 6.0);

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} is missing from the submission")]
    Missing { field: &'static str },

    #[error("{field} could not be read from '{value}'")]
    Unparsable { field: &'static str, value: String },
}

/// Parse one submitted field into `slot`, remembering only the first failure.
fn read_field<T: FromStr>(
    fields: &HashMap<String, String>,
    name: &str,
    label: &'static str,
    slot: &mut T,
    error: &mut Option<ValidationError>,
) {
    let failure = match fields.get(name).map(|raw| raw.trim()) {
        Some(raw) => match raw.parse() {
            Ok(value) => {
                *slot = value;
                return;
            }
            Err(_) => ValidationError::Unparsable {
                field: label,
                value: raw.to_string(),
            },
        },
        None => ValidationError::Missing { field: label },
    };
    if error.is_none() {
        *error = Some(failure);
    }
}

/// Choices for a categorical select.
#[derive(Debug, Clone, Serialize)]
pub struct Vocabulary {
    pub values: Vec<String>,
    /// True when the encoder was unavailable and the hardcoded list is used.
    pub fallback: bool,
}

impl Vocabulary {
    fn resolve(bundle: &ArtifactBundle, field: &str, fallback: &[&str]) -> Self {
        match bundle.label_encoder(field) {
            Some(encoder) if !encoder.classes().is_empty() => Self {
                values: encoder.classes().to_vec(),
                fallback: false,
            },
            _ => {
                warn!(field, "Vocabulary unavailable, using fallback list");
                Self {
                    values: fallback.iter().map(|s| s.to_string()).collect(),
                    fallback: true,
                }
            }
        }
    }

    pub fn first(&self) -> &str {
        self.values.first().map(String::as_str).unwrap_or_default()
    }
}

/// Everything needed to render and check the prediction form.
#[derive(Debug, Clone, Serialize)]
pub struct FormSchema {
    pub demographics: Vec<NumericField>,
    pub behavior: Vec<NumericField>,
    pub time_context: Vec<NumericField>,
    pub genders: Vec<String>,
    pub cities: Vocabulary,
    pub countries: Vocabulary,
    pub ad_topics: Vocabulary,
}

impl FormSchema {
    pub fn from_bundle(bundle: &ArtifactBundle) -> Self {
        Self {
            demographics: vec![AGE, AREA_INCOME],
            behavior: vec![DAILY_TIME_SPENT, DAILY_INTERNET_USAGE],
            time_context: vec![HOUR_OF_DAY, DAY_OF_MONTH, DAY_OF_WEEK, MONTH],
            genders: GENDERS.iter().map(|s| s.to_string()).collect(),
            cities: Vocabulary::resolve(bundle, "city", &FALLBACK_CITIES),
            countries: Vocabulary::resolve(bundle, "country", &FALLBACK_COUNTRIES),
            ad_topics: Vocabulary::resolve(bundle, "ad_topic", &FALLBACK_AD_TOPICS),
        }
    }

    /// Initial form values: numeric defaults and the first choice of each select.
    pub fn default_impression(&self) -> AdImpression {
        AdImpression::new(
            self.cities.first(),
            self.countries.first(),
            self.ad_topics.first(),
        )
    }

    /// Read a raw form submission field by field.
    ///
    /// Fields that parse keep the submitted value and the others keep their
    /// default, so the form can be shown again as entered. The first field
    /// that failed is returned alongside.
    pub fn parse_submission(
        &self,
        fields: &HashMap<String, String>,
    ) -> (AdImpression, Option<ValidationError>) {
        let mut values = self.default_impression();
        let mut error = None;

        read_field(fields, AGE.name, AGE.label, &mut values.age, &mut error);
        read_field(fields, "gender", "Gender", &mut values.gender, &mut error);
        read_field(
            fields,
            AREA_INCOME.name,
            AREA_INCOME.label,
            &mut values.area_income,
            &mut error,
        );
        read_field(
            fields,
            DAILY_TIME_SPENT.name,
            DAILY_TIME_SPENT.label,
            &mut values.daily_time_spent,
            &mut error,
        );
        read_field(
            fields,
            DAILY_INTERNET_USAGE.name,
            DAILY_INTERNET_USAGE.label,
            &mut values.daily_internet_usage,
            &mut error,
        );
        read_field(fields, "city", "City", &mut values.city, &mut error);
        read_field(fields, "country", "Country", &mut values.country, &mut error);
        read_field(fields, "ad_topic", "Ad Topic", &mut values.ad_topic, &mut error);
        read_field(
            fields,
            HOUR_OF_DAY.name,
            HOUR_OF_DAY.label,
            &mut values.hour_of_day,
            &mut error,
        );
        read_field(
            fields,
            DAY_OF_MONTH.name,
            DAY_OF_MONTH.label,
            &mut values.day_of_month,
            &mut error,
        );
        read_field(
            fields,
            DAY_OF_WEEK.name,
            DAY_OF_WEEK.label,
            &mut values.day_of_week,
            &mut error,
        );
        read_field(fields, MONTH.name, MONTH.label, &mut values.month, &mut error);

        (values, error)
    }

    /// Check numeric ranges and that categorical fields are filled in.
    ///
    /// Categorical values outside the vocabulary are accepted; the encoder
    /// handles them.
    pub fn validate(&self, impression: &AdImpression) -> Result<(), ValidationError> {
        AGE.check(impression.age as f64)?;
        AREA_INCOME.check(impression.area_income)?;
        DAILY_TIME_SPENT.check(impression.daily_time_spent)?;
        DAILY_INTERNET_USAGE.check(impression.daily_internet_usage)?;
        HOUR_OF_DAY.check(impression.hour_of_day as f64)?;
        DAY_OF_MONTH.check(impression.day_of_month as f64)?;
        DAY_OF_WEEK.check(impression.day_of_week as f64)?;
        MONTH.check(impression.month as f64)?;

        for (field, value) in [
            ("Gender", &impression.gender),
            ("City", &impression.city),
            ("Country", &impression.country),
            ("Ad Topic", &impression.ad_topic),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::Empty { field });
            }
        }

        Ok(())
    }
}
