//! Prometheus metric definitions for the sentiment service.
use std::sync::Arc;

use prometheus::{
    Counter, Histogram, Registry, register_counter_with_registry,
    register_histogram_with_registry,
};

/// Metric collector. One instance per process, owned by [`super::Telemetry`].
#[derive(Debug, Clone)]
pub struct Metrics {
    // Counters
    pub analyze_single_total: Counter,
    pub analyze_bulk_total: Counter,
    pub analyze_input_errors_total: Counter,
    pub reviews_fetched_total: Counter,
    pub reviews_accepted_total: Counter,
    pub classification_failures_total: Counter,

    // Histograms
    pub fetch_duration: Histogram,
}

impl Metrics {
    /// Registers the metric families against `registry`.
    ///
    /// # Errors
    /// Returns a [`prometheus::Error`] when a family is registered twice.
    pub fn new(registry: &Arc<Registry>) -> Result<Self, prometheus::Error> {
        Ok(Self {
            analyze_single_total: register_counter_with_registry!(
                "sentiment_analyze_single_total",
                "Total number of single-text analyze requests served",
                registry
            )?,
            analyze_bulk_total: register_counter_with_registry!(
                "sentiment_analyze_bulk_total",
                "Total number of bulk (URL) analyze requests served",
                registry
            )?,
            analyze_input_errors_total: register_counter_with_registry!(
                "sentiment_analyze_input_errors_total",
                "Total number of analyze requests rejected for invalid input",
                registry
            )?,
            reviews_fetched_total: register_counter_with_registry!(
                "sentiment_reviews_fetched_total",
                "Total number of raw review records fetched from the bookstore",
                registry
            )?,
            reviews_accepted_total: register_counter_with_registry!(
                "sentiment_reviews_accepted_total",
                "Total number of reviews accepted by the language filter",
                registry
            )?,
            classification_failures_total: register_counter_with_registry!(
                "sentiment_classification_failures_total",
                "Total number of failed inference calls",
                registry
            )?,
            fetch_duration: register_histogram_with_registry!(
                "sentiment_fetch_duration_seconds",
                "Review listing fetch duration in seconds",
                registry
            )?,
        })
    }
}
