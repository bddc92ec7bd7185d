//! The `/fetch_resources` pipeline: prompt the provider, unwrap its answer
//! and parse it as JSON.

use crate::config::ProviderConfig;
use crate::error::FetchError;
use crate::models::ResourceBundle;
use crate::services::metrics;
use crate::services::prompt::EDUCATION_RESOURCES_PROMPT;
use crate::services::providers::{GenerationParams, ProviderError, ProviderResponse, TextProvider};
use backoff::future::retry_notify;
use backoff::ExponentialBackoffBuilder;
use serde_json::Value;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Fetches education resource bundles from a [`TextProvider`].
///
/// Holds no per-request state; one instance is shared by all requests.
#[derive(Clone)]
pub struct ResourceFetcher {
    provider: Arc<dyn TextProvider>,
    params: GenerationParams,
    timeout: Duration,
    max_retries: u32,
    retry_backoff: Duration,
    validate_schema: bool,
}

impl ResourceFetcher {
    pub fn new(provider: Arc<dyn TextProvider>, config: &ProviderConfig, validate_schema: bool) -> Self {
        let params = GenerationParams {
            response_mime_type: config
                .json_mode
                .then(|| "application/json".to_string()),
        };

        Self {
            provider,
            params,
            timeout: config.timeout(),
            max_retries: config.max_retries,
            retry_backoff: config.retry_backoff(),
            validate_schema,
        }
    }

    pub fn provider(&self) -> &Arc<dyn TextProvider> {
        &self.provider
    }

    /// Run one fetch and return the JSON to hand back to the caller.
    pub async fn fetch(&self) -> Result<Value, FetchError> {
        let start = Instant::now();
        let result = self.fetch_inner().await;

        match &result {
            Ok(_) => {
                metrics::record_fetch("success");
                tracing::info!(
                    provider = self.provider.name(),
                    model = %self.provider.model(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Fetched education resources"
                );
            }
            Err(e) => {
                metrics::record_fetch(e.kind());
                tracing::warn!(
                    provider = self.provider.name(),
                    model = %self.provider.model(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    error = %e,
                    "Failed to fetch education resources"
                );
            }
        }

        result
    }

    async fn fetch_inner(&self) -> Result<Value, FetchError> {
        let response = self.invoke().await?;
        let value = parse_provider_text(response.text.as_deref())?;

        if !self.validate_schema {
            return Ok(value);
        }

        let bundle = ResourceBundle::from_value(value)?;
        let incomplete = bundle.incomplete_entries();
        if incomplete > 0 {
            tracing::debug!(incomplete, "Some resource entries lack expected fields");
        }

        serde_json::to_value(bundle).map_err(FetchError::MalformedPayload)
    }

    /// Call the provider, retrying once on transient failures if configured.
    async fn invoke(&self) -> Result<ProviderResponse, ProviderError> {
        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(self.retry_backoff)
            .with_max_elapsed_time(None)
            .build();

        let attempts = AtomicU32::new(0);
        let attempts = &attempts;
        let max_retries = self.max_retries;

        retry_notify(
            policy,
            move || async move {
                let attempt = attempts.fetch_add(1, Ordering::SeqCst);
                match self.attempt().await {
                    Ok(response) => Ok(response),
                    Err(e) if e.is_transient() && attempt < max_retries => {
                        Err(backoff::Error::transient(e))
                    }
                    Err(e) => Err(backoff::Error::permanent(e)),
                }
            },
            |e: ProviderError, wait: Duration| {
                tracing::warn!(
                    attempt = attempts.load(Ordering::SeqCst),
                    error = %e,
                    retry_in_ms = wait.as_millis() as u64,
                    "Provider call failed, retrying"
                );
            },
        )
        .await
    }

    /// One provider call bounded by the configured timeout.
    async fn attempt(&self) -> Result<ProviderResponse, ProviderError> {
        let provider = self.provider.name();
        let model = self.provider.model();
        let start = Instant::now();

        let result = match tokio::time::timeout(
            self.timeout,
            self.provider.generate(EDUCATION_RESOURCES_PROMPT, &self.params),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(self.timeout)),
        };

        metrics::record_provider_call(provider, model, start.elapsed().as_secs_f64());
        match &result {
            Ok(response) => {
                metrics::record_tokens(model, response.input_tokens, response.output_tokens);
                tracing::debug!(
                    input_tokens = response.input_tokens,
                    output_tokens = response.output_tokens,
                    finish_reason = ?response.finish_reason,
                    "Provider call completed"
                );
            }
            Err(e) => metrics::record_provider_error(provider, e.kind()),
        }

        result
    }
}

/// Remove a surrounding markdown code fence (```` ``` ```` or ```` ```json ````)
/// if present.
pub fn strip_markdown_fence(text: &str) -> &str {
    let mut body = text.trim();

    if let Some(rest) = body.strip_prefix("```") {
        let rest = rest.trim_start_matches([' ', '\t']);
        body = match rest.get(..4) {
            Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
            _ => rest,
        };
    }

    if let Some(rest) = body.strip_suffix("```") {
        body = rest;
    }

    body.trim()
}

/// Turn provider text into JSON, classifying empty and unparsable answers.
///
/// Only missing or zero-length text counts as empty; whitespace is text that
/// fails to parse.
pub fn parse_provider_text(text: Option<&str>) -> Result<Value, FetchError> {
    let text = match text {
        Some(t) if !t.is_empty() => t,
        _ => return Err(FetchError::EmptyResponse),
    };

    serde_json::from_str(strip_markdown_fence(text)).map_err(FetchError::MalformedPayload)
}
