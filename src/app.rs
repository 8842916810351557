use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;

use crate::{
    api,
    classifier::{SentimentClassifier, bert::BanglaBertClassifier},
    clients::BookstoreClient,
    config::Config,
    observability::Telemetry,
    pipeline::SentimentAnalyzer,
};

#[derive(Clone)]
pub(crate) struct AppState {
    registry: Arc<ComponentRegistry>,
}

/// Shared, read-only component graph built once at startup: telemetry, the
/// loaded classifier, the review API client, and the analyzer wired over
/// them.
pub struct ComponentRegistry {
    config: Arc<Config>,
    telemetry: Telemetry,
    analyzer: SentimentAnalyzer,
}

impl AppState {
    pub(crate) fn new(registry: ComponentRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub(crate) fn telemetry(&self) -> &Telemetry {
        &self.registry.telemetry
    }

    pub(crate) fn analyzer(&self) -> &SentimentAnalyzer {
        &self.registry.analyzer
    }
}

impl ComponentRegistry {
    /// Loads the model from the configured directory and assembles the
    /// registry. Model loading runs on the blocking pool; it is the slow part
    /// of startup.
    ///
    /// # Errors
    /// Returns an error when telemetry initialization, model loading, or
    /// HTTP client construction fails.
    pub async fn build(config: Config) -> Result<Self> {
        let model_dir = config.model_dir().to_path_buf();
        let max_tokens = config.max_tokens().get();
        let classifier = tokio::task::spawn_blocking(move || {
            BanglaBertClassifier::load(&model_dir, max_tokens)
        })
        .await
        .context("model loading task panicked")?
        .context("failed to load the sentiment model")?;

        Self::with_classifier(config, Arc::new(classifier))
    }

    /// Assembles the registry around an already-constructed classifier.
    /// Production startup goes through [`ComponentRegistry::build`]; tests
    /// inject a double here.
    ///
    /// # Errors
    /// Returns an error when telemetry initialization or HTTP client
    /// construction fails.
    pub fn with_classifier(
        config: Config,
        classifier: Arc<dyn SentimentClassifier>,
    ) -> Result<Self> {
        let config = Arc::new(config);
        let telemetry = Telemetry::new(config.otel_exporter_endpoint())?;
        let bookstore = BookstoreClient::new(
            config.bookstore_base_url(),
            config.fetch_page_size(),
            config.fetch_timeout(),
        )
        .context("failed to build bookstore client")?;
        let analyzer = SentimentAnalyzer::new(
            classifier,
            bookstore,
            config.max_reviews().get(),
            telemetry.metrics_arc(),
        );

        Ok(Self {
            config,
            telemetry,
            analyzer,
        })
    }

    #[must_use]
    pub fn config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }
}

#[must_use]
pub fn build_router(registry: ComponentRegistry) -> Router {
    let state = AppState::new(registry);
    api::router(state)
}
