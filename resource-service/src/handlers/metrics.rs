use crate::services::get_metrics;
use axum::{http::header, response::IntoResponse};

/// Prometheus scrape endpoint: HTTP metrics plus the provider registry.
pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        get_metrics(),
    )
}
