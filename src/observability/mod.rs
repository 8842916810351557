pub mod metrics;
pub(crate) mod tracing;

use std::sync::Arc;

use anyhow::Result;
use prometheus::{Encoder, Registry, TextEncoder};

use self::metrics::Metrics;

/// Owns the process-wide telemetry: the tracing subscriber (installed once)
/// and the Prometheus metric registry.
#[derive(Debug, Clone)]
pub struct Telemetry {
    registry: Arc<Registry>,
    metrics: Arc<Metrics>,
}

impl Telemetry {
    /// Initializes tracing (OTLP export when `otel_endpoint` is set) and
    /// registers the service's metric families.
    ///
    /// # Errors
    /// Returns an error when subscriber installation or metric registration
    /// fails.
    pub fn new(otel_endpoint: Option<&str>) -> Result<Self> {
        tracing::init(otel_endpoint)?;
        let registry = Arc::new(Registry::new());
        let metrics = Arc::new(Metrics::new(&registry)?);
        Ok(Self { registry, metrics })
    }

    #[must_use]
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    #[must_use]
    pub fn metrics_arc(&self) -> Arc<Metrics> {
        Arc::clone(&self.metrics)
    }

    pub fn record_ready_probe(&self) {
        ::tracing::debug!("service ready probe");
    }

    pub fn record_live_probe(&self) {
        ::tracing::debug!("service live probe");
    }

    /// Renders the registered metric families in Prometheus text exposition
    /// format.
    #[must_use]
    pub fn render_prometheus(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).ok();
        String::from_utf8(buffer).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_registered_families() {
        let telemetry = Telemetry::new(None).expect("telemetry builds");
        telemetry.metrics().analyze_bulk_total.inc();

        let rendered = telemetry.render_prometheus();
        assert!(rendered.contains("sentiment_analyze_bulk_total"));
    }
}
