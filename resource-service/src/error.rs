use crate::config::ErrorStatusPolicy;
use crate::models::SchemaError;
use crate::services::providers::ProviderError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use service_core::error::AppError;
use thiserror::Error;

/// Why `/fetch_resources` could not produce a bundle.
///
/// The `Display` text is exactly what goes into the `error` field.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Error fetching resources: {0}")]
    ProviderInvocation(#[from] ProviderError),

    #[error("Empty response from Gemini API")]
    EmptyResponse,

    #[error("Invalid JSON format returned from Gemini")]
    MalformedPayload(#[source] serde_json::Error),

    #[error("Resource schema mismatch: {0}")]
    SchemaMismatch(#[from] SchemaError),
}

impl FetchError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            FetchError::ProviderInvocation(ProviderError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::BAD_GATEWAY,
        }
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::ProviderInvocation(_) => "provider_error",
            FetchError::EmptyResponse => "empty_response",
            FetchError::MalformedPayload(_) => "malformed_payload",
            FetchError::SchemaMismatch(_) => "schema_mismatch",
        }
    }

    /// Render under the configured status policy; the body is the same either way.
    pub fn into_response_with(self, policy: ErrorStatusPolicy) -> Response {
        match policy {
            ErrorStatusPolicy::Mapped => AppError::from(self).into_response(),
            ErrorStatusPolicy::Legacy => {
                (StatusCode::OK, Json(json!({ "error": self.to_string() }))).into_response()
            }
        }
    }
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        if err.status_code() == StatusCode::GATEWAY_TIMEOUT {
            AppError::GatewayTimeout(err.to_string())
        } else {
            AppError::BadGateway(err.to_string())
        }
    }
}
