//! CTR Prediction Service - Main Entry Point
//!
//! Loads the model artifacts once, then serves the prediction form.

use anyhow::{Context, Result};
use ctr_prediction::{
    config::{AppConfig, LogFormat, LoggingConfig},
    models::ArtifactLoader,
    predictor::ClickPredictor,
    server::{self, AppState},
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("ctr_prediction={},tower_http=info", logging.level)))
        .context("Invalid log level")?;

    match logging.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    init_tracing(&config.logging)?;
    info!("Starting CTR Prediction Service");
    info!(
        artifact = %config.artifact.path,
        excellent = config.insights.excellent,
        moderate = config.insights.moderate,
        "Configuration loaded"
    );

    // Load model artifacts; nothing can be served without them
    let bundle = match ArtifactLoader::load(&config.artifact.path) {
        Ok(bundle) => bundle,
        Err(e) => {
            error!(
                path = %config.artifact.path,
                error = format!("{:#}", e),
                "Could not load model artifacts. Please check the file path."
            );
            return Err(e);
        }
    };

    let predictor = ClickPredictor::new(bundle, config.insights.clone())?;
    info!(
        features = predictor.encoder().feature_count(),
        model = predictor.engine().model_kind(),
        "Predictor initialized"
    );

    let state = Arc::new(AppState::new(predictor));
    server::run_server(&config.server, state.clone()).await?;

    // Print final summary
    state.predictor.metrics().print_summary();

    Ok(())
}
