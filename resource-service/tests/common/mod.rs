#![allow(dead_code)]

use resource_service::config::{
    CorsConfig, ErrorStatusPolicy, ObservabilityConfig, ProviderConfig, ProviderKind,
    ResourceConfig, ResourcesConfig,
};
use resource_service::services::providers::TextProvider;
use resource_service::startup::Application;
use secrecy::Secret;
use service_core::config::Config as CoreConfig;
use std::sync::Arc;

pub fn test_config() -> ResourceConfig {
    ResourceConfig {
        // Use random port for testing (port 0)
        common: CoreConfig {
            host: [127, 0, 0, 1].into(),
            port: 0,
        },
        provider: ProviderConfig {
            kind: ProviderKind::Mock,
            api_key: Secret::new("test-api-key".to_string()),
            model: "mock-model".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 5,
            max_retries: 0,
            retry_backoff_ms: 10,
            json_mode: false,
        },
        resources: ResourcesConfig {
            error_status: ErrorStatusPolicy::Mapped,
            validate_schema: false,
        },
        cors: CorsConfig {
            enabled: true,
            allowed_origins: vec!["*".to_string()],
        },
        observability: ObservabilityConfig {
            log_level: "debug".to_string(),
            otlp_endpoint: None,
        },
    }
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn(provider: Arc<dyn TextProvider>) -> Self {
        Self::spawn_with(test_config(), provider).await
    }

    pub async fn spawn_with(config: ResourceConfig, provider: Arc<dyn TextProvider>) -> Self {
        let app = Application::build_with_provider(config, provider)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
        }

        TestApp {
            address,
            port,
            client,
        }
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn fetch_resources(&self) -> (reqwest::StatusCode, serde_json::Value) {
        let response = self.get("/fetch_resources").await;
        let status = response.status();
        let body = response.json().await.expect("Failed to parse JSON");
        (status, body)
    }
}
