//! Type definitions for the CTR prediction service

pub mod impression;
pub mod prediction;

pub use impression::AdImpression;
pub use prediction::{ClickPrediction, Insight, InsightThresholds};
