//! Ad impression submitted for scoring

use serde::{Deserialize, Serialize};

/// One user/ad pairing as collected by the prediction form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdImpression {
    /// Age in years
    pub age: u32,

    /// "Male" or "Female"; anything other than "Male" encodes as 0
    pub gender: String,

    /// Average income of the user's area, in dollars
    pub area_income: f64,

    /// Daily time spent on the site, in minutes
    pub daily_time_spent: f64,

    /// Daily internet usage, in minutes
    pub daily_internet_usage: f64,

    pub city: String,
    pub country: String,
    pub ad_topic: String,

    /// Hour of day (0-23)
    pub hour_of_day: u32,

    /// Day of month (1-31)
    pub day_of_month: u32,

    /// Day of week (0 = Monday)
    pub day_of_week: u32,

    /// Month (1-12)
    pub month: u32,
}

impl AdImpression {
    /// Create an impression with the form defaults for every numeric field.
    pub fn new(city: &str, country: &str, ad_topic: &str) -> Self {
        Self {
            age: 30,
            gender: "Male".to_string(),
            area_income: 50000.0,
            daily_time_spent: 50.0,
            daily_internet_usage: 150.0,
            city: city.to_string(),
            country: country.to_string(),
            ad_topic: ad_topic.to_string(),
            hour_of_day: 12,
            day_of_month: 15,
            day_of_week: 3,
            month: 6,
        }
    }

    /// Binary gender flag fed to the model.
    pub fn gender_flag(&self) -> f64 {
        if self.gender == "Male" {
            1.0
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_flag() {
        let mut impression = AdImpression::new("New York", "United States", "Technology");
        assert_eq!(impression.gender_flag(), 1.0);

        impression.gender = "Female".to_string();
        assert_eq!(impression.gender_flag(), 0.0);

        impression.gender = "male".to_string();
        assert_eq!(impression.gender_flag(), 0.0);
    }

    #[test]
    fn test_impression_from_form_fields() {
        let json = serde_json::json!({
            "age": 45,
            "gender": "Female",
            "area_income": 32000.5,
            "daily_time_spent": 40.0,
            "daily_internet_usage": 120.0,
            "city": "Chicago",
            "country": "Canada",
            "ad_topic": "Sports",
            "hour_of_day": 22,
            "day_of_month": 1,
            "day_of_week": 6,
            "month": 12
        });

        let impression: AdImpression = serde_json::from_value(json).unwrap();
        assert_eq!(impression.age, 45);
        assert_eq!(impression.city, "Chicago");
        assert_eq!(impression.month, 12);
    }
}
