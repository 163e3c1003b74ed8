//! Integration test: prediction form and JSON API

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use ctr_prediction::demo;
use ctr_prediction::predictor::ClickPredictor;
use ctr_prediction::server::{create_router, AppState};
use ctr_prediction::types::InsightThresholds;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_state() -> Arc<AppState> {
    let predictor = ClickPredictor::new(demo::bundle(), InsightThresholds::default()).unwrap();
    Arc::new(AppState::new(predictor))
}

fn test_app() -> axum::Router {
    create_router(test_state())
}

const EXAMPLE_FORM: &str = "age=30&gender=Male&area_income=50000&daily_time_spent=50\
&daily_internet_usage=150&city=New+York&country=United+States&ad_topic=Technology\
&hour_of_day=12&day_of_month=15&day_of_week=3&month=6";

fn example_json() -> Value {
    json!({
        "age": 30,
        "gender": "Male",
        "area_income": 50000.0,
        "daily_time_spent": 50.0,
        "daily_internet_usage": 150.0,
        "city": "New York",
        "country": "United States",
        "ad_topic": "Technology",
        "hour_of_day": 12,
        "day_of_month": 15,
        "day_of_week": 3,
        "month": 6
    })
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

fn post_form(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_json(value: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(value.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_root_serves_form() {
    let response = test_app().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Model loaded successfully!"));
    assert!(html.contains("id=\"prediction-form\""));
    assert!(html.contains("<option value=\"New York\">"));
    assert!(!html.contains("id=\"result\""));
}

#[tokio::test]
async fn test_form_submission_renders_prediction() {
    let response = test_app().oneshot(post_form(EXAMPLE_FORM)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Prediction completed!"));
    assert!(html.contains("id=\"probability\""));
    assert!(html.contains("id=\"insight\""));
    assert!(html.contains("id=\"feature-importance\""));
    // Submitted values stay selected
    assert!(html.contains("<option value=\"New York\" selected>"));
}

#[tokio::test]
async fn test_form_out_of_range_renders_error() {
    let body = EXAMPLE_FORM.replace("month=6", "month=13");
    let response = test_app().oneshot(post_form(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Error making prediction:"));
    assert!(html.contains("Please check your input values and try again."));
    assert!(!html.contains("Prediction completed!"));
}

#[tokio::test]
async fn test_form_malformed_renders_error() {
    let body = EXAMPLE_FORM.replace("age=30", "age=thirty");
    let response = test_app().oneshot(post_form(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("id=\"error\""));
    assert!(html.contains("Age could not be read from &#39;thirty&#39;"));
    // Everything else stays as entered
    assert!(html.contains("<option value=\"New York\" selected>"));
    assert!(html.contains("<option value=\"Technology\" selected>"));
}

#[tokio::test]
async fn test_form_keeps_unknown_category() {
    let body = EXAMPLE_FORM.replace("city=New+York", "city=Atlantis");
    let response = test_app().oneshot(post_form(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Prediction completed!"));
    assert!(html.contains("id=\"unseen\""));
    assert!(html.contains("<option value=\"Atlantis\" selected>"));
    assert!(!html.contains("<option value=\"Chicago\" selected>"));
}

#[tokio::test]
async fn test_form_accepts_fractional_values() {
    let body = EXAMPLE_FORM
        .replace("area_income=50000", "area_income=61234.5")
        .replace("daily_time_spent=50", "daily_time_spent=37.25");
    let response = test_app().oneshot(post_form(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Prediction completed!"));
    assert!(html.contains("value=\"61234.5\""));
    assert!(html.contains(
        "id=\"area_income\" name=\"area_income\" min=\"0\" max=\"200000\" step=\"any\""
    ));
}

#[tokio::test]
async fn test_api_predict() {
    let response = test_app().oneshot(post_json(&example_json())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let probability = json["probability"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&probability));
    assert_eq!(
        json["will_click"].as_bool().unwrap(),
        json["label"].as_u64().unwrap() == 1
    );
    assert_eq!(json["unseen_categories"], json!([]));
    assert_eq!(json["features"].as_array().unwrap().len(), 14);
}

#[tokio::test]
async fn test_api_predict_reports_unseen_category() {
    let mut payload = example_json();
    payload["city"] = json!("Atlantis");

    let response = test_app().oneshot(post_json(&payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["unseen_categories"], json!(["city"]));
}

#[tokio::test]
async fn test_api_predict_validation_error() {
    let mut payload = example_json();
    payload["age"] = json!(12);

    let response = test_app().oneshot(post_json(&payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], json!(true));
    assert!(json["message"]
        .as_str()
        .unwrap()
        .starts_with("Error making prediction:"));
}

#[tokio::test]
async fn test_api_predict_missing_field() {
    let mut payload = example_json();
    payload.as_object_mut().unwrap().remove("country");

    let response = test_app().oneshot(post_json(&payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_endpoint() {
    let response = test_app().oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], json!("ok"));
}

#[tokio::test]
async fn test_schema_endpoint() {
    let response = test_app().oneshot(get("/api/schema")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["form"]["cities"]["values"][2], json!("New York"));
    assert_eq!(json["form"]["cities"]["fallback"], json!(false));
    assert_eq!(json["defaults"]["age"], json!(30));
}

#[tokio::test]
async fn test_model_endpoint() {
    let response = test_app().oneshot(get("/api/model")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["kind"], json!("logistic_regression"));
    assert_eq!(json["feature_columns"].as_array().unwrap().len(), 14);
    assert_eq!(json["feature_importance"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_stats_count_predictions() {
    let state = test_state();
    let app = create_router(state.clone());

    app.clone().oneshot(post_json(&example_json())).await.unwrap();
    app.clone().oneshot(post_form(EXAMPLE_FORM)).await.unwrap();

    let response = app.oneshot(get("/api/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["metrics"]["predictions_served"], json!(2));
    assert_eq!(json["metrics"]["failures"], json!(0));
}

#[tokio::test]
async fn test_unknown_route_returns_json_404() {
    let response = test_app().oneshot(get("/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["error"], json!(true));
}

#[tokio::test]
async fn test_wrong_method_returns_405() {
    let response = test_app().oneshot(get("/api/predict")).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
