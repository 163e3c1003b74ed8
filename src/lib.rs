//! Ad Click-Through Rate Prediction Library
//!
//! Collects user and ad attributes through a web form, encodes them into the
//! feature row a trained click classifier expects, and reports the predicted
//! click/no-click outcome with its probability.

pub mod config;
pub mod demo;
pub mod feature_encoder;
pub mod form;
pub mod metrics;
pub mod models;
pub mod predictor;
pub mod server;
pub mod types;

pub use config::AppConfig;
pub use feature_encoder::FeatureEncoder;
pub use models::{ArtifactBundle, ArtifactLoader, InferenceEngine};
pub use predictor::ClickPredictor;
pub use types::{AdImpression, ClickPrediction};
