//! Application startup and lifecycle management.

use crate::config::{CorsConfig, ProviderConfig, ProviderKind, ResourceConfig};
use crate::handlers::{
    fetch_resources, health_check, metrics_endpoint, not_found, readiness_check,
};
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::providers::mock::MockTextProvider;
use crate::services::providers::TextProvider;
use crate::services::ResourceFetcher;
use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, Method, Request},
    middleware::from_fn,
    routing::get,
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    security_headers::security_headers_middleware,
    tracing::{http_request_span, request_id_middleware, REQUEST_ID_HEADER},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state. Cloned per request, so everything is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ResourceConfig>,
    pub fetcher: ResourceFetcher,
}

impl AppState {
    pub fn new(config: ResourceConfig, provider: Arc<dyn TextProvider>) -> Self {
        let fetcher =
            ResourceFetcher::new(provider, &config.provider, config.resources.validate_schema);
        Self {
            config: Arc::new(config),
            fetcher,
        }
    }
}

/// Instantiate the provider selected in configuration.
pub fn build_provider(config: &ProviderConfig) -> Result<Arc<dyn TextProvider>, AppError> {
    let provider: Arc<dyn TextProvider> = match config.kind {
        ProviderKind::Gemini => {
            let provider = GeminiTextProvider::new(GeminiConfig {
                api_key: config.api_key.clone(),
                model: config.model.clone(),
                base_url: config.base_url.clone(),
                timeout: config.timeout(),
            })
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?;
            Arc::new(provider)
        }
        ProviderKind::Mock => {
            tracing::warn!("Using mock provider; responses are canned sample data");
            Arc::new(MockTextProvider::sample())
        }
    };

    tracing::info!(
        provider = provider.name(),
        model = %provider.model(),
        "Initialized text provider"
    );

    Ok(provider)
}

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors);

    let router = Router::new()
        .route("/fetch_resources", get(fetch_resources))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_endpoint))
        .fallback(not_found)
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| http_request_span(request)),
        )
        // request id must be set before the trace span reads it
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware));

    let router = match cors {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router.with_state(state)
}

fn cors_layer(config: &CorsConfig) -> Option<CorsLayer> {
    if !config.enabled {
        return None;
    }

    let origin = if config.allows_any_origin() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(config.allowed_origins.iter().filter_map(|o| {
            o.parse::<HeaderValue>()
                .map_err(|e| tracing::error!("Invalid CORS origin '{}': {}. Skipping.", o, e))
                .ok()
        }))
    };

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Some(
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, request_id.clone()])
            .expose_headers([request_id]),
    )
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the provider named in `config`.
    pub async fn build(config: ResourceConfig) -> Result<Self, AppError> {
        let provider = build_provider(&config.provider)?;
        Self::build_with_provider(config, provider).await
    }

    /// Build the application around an already constructed provider.
    pub async fn build_with_provider(
        config: ResourceConfig,
        provider: Arc<dyn TextProvider>,
    ) -> Result<Self, AppError> {
        // port 0 = random port for testing
        let addr = config.common.socket_addr();
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            port,
            cors = config.cors.enabled,
            error_status = ?config.resources.error_status,
            validate_schema = config.resources.validate_schema,
            "Resource service listening"
        );

        let router = build_router(AppState::new(config, provider));

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until Ctrl+C or SIGTERM.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                e
            })
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
