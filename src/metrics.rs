//! Prediction counters and latency statistics for the CTR service.

use crate::types::prediction::Insight;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for served predictions
pub struct PredictionMetrics {
    /// Successful predictions
    pub predictions_served: AtomicU64,
    /// Predictions with label 1
    pub clicks_predicted: AtomicU64,
    /// Submissions that failed validation, encoding or inference
    pub failures: AtomicU64,
    /// Impressions scored with at least one unseen category
    pub unseen_category_hits: AtomicU64,
    /// Handling times (in microseconds)
    latencies: RwLock<Vec<u64>>,
    /// Click probability distribution buckets
    probability_buckets: RwLock<[u64; 10]>,
    /// Predictions by insight tier
    insights: RwLock<HashMap<&'static str, u64>>,
    start_time: Instant,
}

impl PredictionMetrics {
    pub fn new() -> Self {
        Self {
            predictions_served: AtomicU64::new(0),
            clicks_predicted: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            unseen_category_hits: AtomicU64::new(0),
            latencies: RwLock::new(Vec::with_capacity(1000)),
            probability_buckets: RwLock::new([0; 10]),
            insights: RwLock::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Record a successful prediction
    pub fn record_prediction(
        &self,
        elapsed: Duration,
        label: u8,
        probability: f64,
        insight: Insight,
        had_unseen: bool,
    ) {
        self.predictions_served.fetch_add(1, Ordering::Relaxed);
        if label == 1 {
            self.clicks_predicted.fetch_add(1, Ordering::Relaxed);
        }
        if had_unseen {
            self.unseen_category_hits.fetch_add(1, Ordering::Relaxed);
        }

        if let Ok(mut times) = self.latencies.write() {
            times.push(elapsed.as_micros() as u64);
            // Keep only the most recent window
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        let bucket = (probability * 10.0).clamp(0.0, 9.0) as usize;
        if let Ok(mut buckets) = self.probability_buckets.write() {
            buckets[bucket] += 1;
        }

        if let Ok(mut by_tier) = self.insights.write() {
            *by_tier.entry(insight.as_str()).or_insert(0) += 1;
        }
    }

    /// Record a failed submission
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Latency statistics over the recent window
    pub fn latency_stats(&self) -> LatencyStats {
        let mut sorted = match self.latencies.read() {
            Ok(times) => times.clone(),
            Err(_) => return LatencyStats::default(),
        };
        if sorted.is_empty() {
            return LatencyStats::default();
        }
        sorted.sort_unstable();

        let count = sorted.len();
        let sum: u64 = sorted.iter().sum();
        let at = |q: f64| sorted[((count as f64 * q) as usize).min(count - 1)];

        LatencyStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: at(0.5),
            p95_us: at(0.95),
            p99_us: at(0.99),
            max_us: sorted[count - 1],
        }
    }

    pub fn probability_distribution(&self) -> [u64; 10] {
        self.probability_buckets
            .read()
            .map(|b| *b)
            .unwrap_or_default()
    }

    pub fn insight_counts(&self) -> HashMap<&'static str, u64> {
        self.insights
            .read()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    /// Predicted click rate over everything served so far
    pub fn click_rate(&self) -> f64 {
        let served = self.predictions_served.load(Ordering::Relaxed);
        if served == 0 {
            return 0.0;
        }
        self.clicks_predicted.load(Ordering::Relaxed) as f64 / served as f64
    }

    /// Point-in-time copy for the stats endpoint
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            predictions_served: self.predictions_served.load(Ordering::Relaxed),
            clicks_predicted: self.clicks_predicted.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            unseen_category_hits: self.unseen_category_hits.load(Ordering::Relaxed),
            click_rate: self.click_rate(),
            latency: self.latency_stats(),
            probability_distribution: self.probability_distribution(),
            insights: self.insight_counts(),
            uptime_secs: self.start_time.elapsed().as_secs(),
        }
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let snapshot = self.snapshot();

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║              CTR PREDICTION SERVICE - SUMMARY                ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Predictions Served: {:>8}  │  Predicted Click Rate: {:>5.1}% ║",
            snapshot.predictions_served,
            snapshot.click_rate * 100.0
        );
        info!(
            "║ Failures:           {:>8}  │  Unseen Categories: {:>8} ║",
            snapshot.failures, snapshot.unseen_category_hits
        );
        info!(
            "║ Latency (μs): mean={:>5} p50={:>5} p95={:>5} p99={:>5}     ║",
            snapshot.latency.mean_us,
            snapshot.latency.p50_us,
            snapshot.latency.p95_us,
            snapshot.latency.p99_us
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Click Probability Distribution:                              ║");
        let total: u64 = snapshot.probability_distribution.iter().sum();
        for (i, &count) in snapshot.probability_distribution.iter().enumerate() {
            let pct = if total > 0 {
                (count as f64 / total as f64) * 100.0
            } else {
                0.0
            };
            let bar: String = "█".repeat(((pct / 2.0) as usize).min(20));
            info!(
                "║   {:.1}-{:.1}: {:>6} ({:>5.1}%) {}",
                i as f64 / 10.0,
                (i + 1) as f64 / 10.0,
                count,
                pct,
                bar
            );
        }
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

impl Default for PredictionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Handling time statistics
#[derive(Debug, Default, Clone, Serialize)]
pub struct LatencyStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub predictions_served: u64,
    pub clicks_predicted: u64,
    pub failures: u64,
    pub unseen_category_hits: u64,
    pub click_rate: f64,
    pub latency: LatencyStats,
    pub probability_distribution: [u64; 10],
    pub insights: HashMap<&'static str, u64>,
    pub uptime_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = PredictionMetrics::new();

        metrics.record_prediction(Duration::from_micros(100), 0, 0.3, Insight::Poor, false);
        metrics.record_prediction(Duration::from_micros(300), 1, 0.8, Insight::Excellent, true);
        metrics.record_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.predictions_served, 2);
        assert_eq!(snapshot.clicks_predicted, 1);
        assert_eq!(snapshot.failures, 1);
        assert_eq!(snapshot.unseen_category_hits, 1);
        assert_eq!(snapshot.click_rate, 0.5);
        assert_eq!(snapshot.insights.get("excellent"), Some(&1));
        assert_eq!(snapshot.latency.mean_us, 200);
        assert_eq!(snapshot.latency.max_us, 300);
    }

    #[test]
    fn test_probability_buckets() {
        let metrics = PredictionMetrics::new();

        metrics.record_prediction(Duration::ZERO, 0, 0.0, Insight::Poor, false);
        metrics.record_prediction(Duration::ZERO, 1, 1.0, Insight::Excellent, false);
        metrics.record_prediction(Duration::ZERO, 1, 0.55, Insight::Moderate, false);

        let buckets = metrics.probability_distribution();
        assert_eq!(buckets[0], 1);
        assert_eq!(buckets[5], 1);
        assert_eq!(buckets[9], 1);
    }

    #[test]
    fn test_empty_stats() {
        let metrics = PredictionMetrics::new();
        assert_eq!(metrics.latency_stats().count, 0);
        assert_eq!(metrics.click_rate(), 0.0);
    }
}
