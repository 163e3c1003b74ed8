//! HTTP request handlers

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, rejection::JsonRejection, State},
    response::Html,
    Form, Json,
};
use serde_json::json;

use crate::types::{AdImpression, ClickPrediction};

use super::error::{Result, ServerError};
use super::render::{self, Outcome};
use super::state::AppState;

/// Number of importance rows shown with a prediction
const TOP_FEATURES: usize = 10;

// ============================================================================
// UI Handlers
// ============================================================================

/// Prediction form with default values
pub async fn serve_index(State(state): State<Arc<AppState>>) -> Html<String> {
    let form = state.predictor.form();
    Html(render::page(form, &form.default_impression(), &Outcome::Empty))
}

/// Handle a form submission and render the result below the form
pub async fn submit_form(
    State(state): State<Arc<AppState>>,
    submission: std::result::Result<Form<HashMap<String, String>>, FormRejection>,
) -> Html<String> {
    let predictor = &state.predictor;
    let form = predictor.form();

    let impression = match submission {
        Ok(Form(fields)) => match form.parse_submission(&fields) {
            (impression, None) => impression,
            (impression, Some(e)) => {
                predictor.metrics().record_failure();
                tracing::warn!(error = %e, "Rejected form submission");
                return Html(render::page(
                    form,
                    &impression,
                    &Outcome::Error(e.to_string()),
                ));
            }
        },
        Err(rejection) => {
            predictor.metrics().record_failure();
            tracing::warn!(error = %rejection.body_text(), "Rejected form submission");
            return Html(render::page(
                form,
                &form.default_impression(),
                &Outcome::Error(rejection.body_text()),
            ));
        }
    };

    let html = match predictor.predict(&impression) {
        Ok(prediction) => {
            let importance = predictor.engine().top_features(TOP_FEATURES);
            render::page(
                form,
                &impression,
                &Outcome::Prediction {
                    prediction: &prediction,
                    importance: &importance,
                },
            )
        }
        Err(e) => render::page(form, &impression, &Outcome::Error(e.to_string())),
    };

    Html(html)
}

// ============================================================================
// JSON API Handlers
// ============================================================================

/// Score one impression
pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<AdImpression>, JsonRejection>,
) -> Result<Json<ClickPrediction>> {
    let Json(impression) = payload.map_err(|rejection| {
        state.predictor.metrics().record_failure();
        ServerError::BadRequest(rejection.body_text())
    })?;

    let prediction = state.predictor.predict(&impression)?;
    Ok(Json(prediction))
}

/// Field ranges and categorical vocabularies
pub async fn get_schema(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let form = state.predictor.form();
    Json(json!({
        "form": form,
        "defaults": form.default_impression(),
    }))
}

/// Model summary and feature importance
pub async fn get_model(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let engine = state.predictor.engine();
    Json(json!({
        "kind": engine.model_kind(),
        "feature_columns": engine.feature_columns(),
        "feature_importance": engine.top_features(TOP_FEATURES),
    }))
}

/// Prediction counters
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "started_at": state.started_at.to_rfc3339(),
        "metrics": state.predictor.metrics().snapshot(),
    }))
}

pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
