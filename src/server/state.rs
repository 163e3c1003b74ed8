//! Application state shared across handlers

use crate::predictor::ClickPredictor;
use chrono::{DateTime, Utc};

/// Read-only state built once at startup
pub struct AppState {
    pub predictor: ClickPredictor,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(predictor: ClickPredictor) -> Self {
        Self {
            predictor,
            started_at: Utc::now(),
        }
    }
}
