pub(crate) mod analyze;
pub(crate) mod health;
pub(crate) mod index;
pub(crate) mod metrics;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::app::AppState;

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index::page))
        .route("/v1/analyze", post(analyze::analyze))
        .route("/v1/healthz", get(health::live))
        .route("/v1/readyz", get(health::ready))
        .route("/metrics", get(metrics::exporter))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
