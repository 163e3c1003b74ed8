//! Demo Artifact Builder
//!
//! Writes the demonstration model bundle to disk, loads it back the way the
//! service does, and scores a batch of random impressions against it.

use anyhow::Context;
use ctr_prediction::demo;
use ctr_prediction::models::ArtifactLoader;
use ctr_prediction::predictor::ClickPredictor;
use ctr_prediction::types::{AdImpression, InsightThresholds};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::path::Path;
use tracing::{info, warn};

/// Random impression generator for exercising a bundle
struct ImpressionGenerator {
    rng: StdRng,
    unseen_rate: f64,
}

impl ImpressionGenerator {
    fn new(seed: u64, unseen_rate: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            unseen_rate,
        }
    }

    fn generate(&mut self) -> AdImpression {
        let city = if self.rng.gen_bool(self.unseen_rate) {
            "Springfield"
        } else {
            self.random_choice(&demo::CITIES)
        };
        let country = self.random_choice(&demo::COUNTRIES);
        let ad_topic = self.random_choice(&demo::AD_TOPICS);

        AdImpression {
            age: self.rng.gen_range(18..=70),
            gender: self.random_choice(&["Male", "Female"]).to_string(),
            area_income: self.rng.gen_range(15000.0..80000.0),
            daily_time_spent: self.rng.gen_range(30.0..95.0),
            daily_internet_usage: self.rng.gen_range(100.0..280.0),
            hour_of_day: self.rng.gen_range(0..24),
            day_of_month: self.rng.gen_range(1..=28),
            day_of_week: self.rng.gen_range(0..7),
            month: self.rng.gen_range(1..=12),
            ..AdImpression::new(city, country, ad_topic)
        }
    }

    fn random_choice<'a>(&mut self, choices: &[&'a str]) -> &'a str {
        choices.choose(&mut self.rng).copied().unwrap_or_default()
    }
}

fn write_bundle(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(&demo::bundle())?;
    std::fs::write(path, json + "\n")
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!(path = %path.display(), "Demo artifact written");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("build_demo_artifact=info".parse()?)
                .add_directive("ctr_prediction=info".parse()?),
        )
        .init();

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let path = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("artifacts/ctr_model.json");
    let count: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(20);
    let seed: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(42);
    let unseen_rate: f64 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(0.1);

    info!(
        path = %path,
        count = count,
        seed = seed,
        unseen_rate = unseen_rate,
        "Configuration loaded"
    );

    write_bundle(Path::new(path))?;

    // Load it back exactly as the service would
    let bundle = ArtifactLoader::load(path)?;
    let predictor = ClickPredictor::new(bundle, InsightThresholds::default())?;
    let mut generator = ImpressionGenerator::new(seed, unseen_rate);

    info!("Scoring {} sample impressions...", count);

    for i in 0..count {
        let impression = generator.generate();
        match predictor.predict(&impression) {
            Ok(prediction) => {
                if (i + 1) % 5 == 0 || i == 0 {
                    info!(
                        "Sample {}: {} / {} / {} -> {} ({})",
                        i + 1,
                        impression.city,
                        impression.country,
                        impression.ad_topic,
                        if prediction.will_click { "click" } else { "no click" },
                        prediction.probability_percent()
                    );
                }
            }
            Err(e) => warn!(sample = i + 1, error = %e, "Sample failed"),
        }
    }

    predictor.metrics().print_summary();

    Ok(())
}
