//! Error types for the server

use crate::predictor::PredictError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Prediction error: {0}")]
    Prediction(#[from] PredictError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ServerError::Prediction(e @ PredictError::Validation(_))
            | ServerError::Prediction(e @ PredictError::Encode(_)) => {
                (StatusCode::BAD_REQUEST, format!("Error making prediction: {}", e))
            }
            ServerError::Prediction(e @ PredictError::Inference(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error making prediction: {}", e),
            ),
        };

        let body = Json(json!({
            "error": true,
            "message": message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
