use crate::startup::AppState;
use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use service_core::error::AppError;

/// `GET /fetch_resources`
///
/// Relays the provider's JSON on success. Failures produce
/// `{"error": "..."}` with a status chosen by the configured policy.
#[tracing::instrument(skip(state))]
pub async fn fetch_resources(State(state): State<AppState>) -> Response {
    match state.fetcher.fetch().await {
        Ok(bundle) => (StatusCode::OK, Json(bundle)).into_response(),
        Err(e) => e.into_response_with(state.config.resources.error_status),
    }
}

/// JSON 404 for any path without a route.
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(anyhow::anyhow!("No route for {}", uri.path()))
}
