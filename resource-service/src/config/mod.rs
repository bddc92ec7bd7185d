use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use validator::Validate;

/// Gemini REST API base URL.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model the mobile client was originally built against.
pub const DEFAULT_MODEL: &str = "gemini-1.5-pro-latest";

#[derive(Debug, Clone)]
pub struct ResourceConfig {
    pub common: core_config::Config,
    pub provider: ProviderConfig,
    pub resources: ResourcesConfig,
    pub cors: CorsConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Validate)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    /// Empty when the mock provider is selected.
    pub api_key: Secret<String>,
    #[validate(length(min = 1, message = "model identifier cannot be empty"))]
    pub model: String,
    #[validate(length(min = 1, message = "base URL cannot be empty"))]
    pub base_url: String,
    /// Upper bound for a single provider attempt.
    #[validate(range(min = 1, max = 600, message = "timeout must be between 1 and 600 seconds"))]
    pub timeout_secs: u64,
    /// At most one retry is ever made.
    #[validate(range(max = 1, message = "at most one retry is allowed"))]
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    /// Ask the provider for `application/json` output.
    pub json_mode: bool,
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    Mock,
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "mock" => Ok(ProviderKind::Mock),
            other => Err(format!("unknown provider '{}' (expected gemini or mock)", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResourcesConfig {
    pub error_status: ErrorStatusPolicy,
    pub validate_schema: bool,
}

/// How fetch failures are reported on the wire. The body is
/// `{"error": "..."}` either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStatusPolicy {
    /// 502 / 504 depending on the failure.
    Mapped,
    /// Always 200, as older mobile clients expect.
    Legacy,
}

impl FromStr for ErrorStatusPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mapped" => Ok(ErrorStatusPolicy::Mapped),
            "legacy" => Ok(ErrorStatusPolicy::Legacy),
            other => Err(format!(
                "unknown error status policy '{}' (expected mapped or legacy)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub enabled: bool,
    /// `["*"]` means any origin.
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

impl ResourceConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        Self::from_lookup(common_config, |key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars {
            lookup,
            is_prod: false,
        };
        let is_prod = vars.get("ENVIRONMENT", Some("dev"))? == "prod";
        let vars = Vars { is_prod, ..vars };

        let kind: ProviderKind = vars.parse("GENAI_PROVIDER", Some("gemini"))?;
        let api_key = match kind {
            ProviderKind::Gemini => vars.get("GOOGLE_API_KEY", None)?,
            ProviderKind::Mock => (vars.lookup)("GOOGLE_API_KEY").unwrap_or_default(),
        };

        let provider = ProviderConfig {
            kind,
            api_key: Secret::new(api_key),
            model: vars.get("GENAI_MODEL", Some(DEFAULT_MODEL))?,
            base_url: vars
                .get("GENAI_BASE_URL", Some(DEFAULT_GEMINI_BASE_URL))?
                .trim_end_matches('/')
                .to_string(),
            timeout_secs: vars.parse("GENAI_TIMEOUT_SECS", Some("30"))?,
            max_retries: vars.parse("GENAI_MAX_RETRIES", Some("0"))?,
            retry_backoff_ms: vars.parse("GENAI_RETRY_BACKOFF_MS", Some("500"))?,
            json_mode: vars.parse("GENAI_JSON_MODE", Some("false"))?,
        };
        provider.validate()?;

        let resources = ResourcesConfig {
            error_status: vars.parse("RESOURCES_ERROR_STATUS", Some("mapped"))?,
            validate_schema: vars.parse("RESOURCES_VALIDATE_SCHEMA", Some("false"))?,
        };

        let cors = CorsConfig {
            enabled: vars.parse("CORS_ENABLED", Some("true"))?,
            allowed_origins: vars
                .get("CORS_ALLOWED_ORIGINS", Some("*"))?
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect(),
        };

        let observability = ObservabilityConfig {
            log_level: vars.get("LOG_LEVEL", Some("info"))?,
            otlp_endpoint: (vars.lookup)("OTLP_ENDPOINT").filter(|e| !e.is_empty()),
        };

        Ok(ResourceConfig {
            common,
            provider,
            resources,
            cors,
            observability,
        })
    }
}

struct Vars<F> {
    lookup: F,
    is_prod: bool,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// In production every variable must be set explicitly, defaults or not.
    fn get(&self, key: &str, default: Option<&str>) -> Result<String, AppError> {
        match (self.lookup)(key) {
            Some(val) => Ok(val),
            None => {
                if self.is_prod {
                    Err(AppError::ConfigError(anyhow::anyhow!(
                        "{} is required in production but not set",
                        key
                    )))
                } else if let Some(def) = default {
                    Ok(def.to_string())
                } else {
                    Err(AppError::ConfigError(anyhow::anyhow!(
                        "{} is required but not set",
                        key
                    )))
                }
            }
        }
    }

    fn parse<T>(&self, key: &str, default: Option<&str>) -> Result<T, AppError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.get(key, default)?;
        raw.trim().parse().map_err(|e: T::Err| {
            AppError::ConfigError(anyhow::anyhow!("{} has invalid value '{}': {}", key, raw, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ResourceConfig, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ResourceConfig::from_lookup(core_config::Config::default(), |key| {
            vars.get(key).cloned()
        })
    }

    #[test]
    fn defaults_apply_outside_production() {
        let config = load(&[("GOOGLE_API_KEY", "key-123")]).unwrap();

        assert_eq!(config.provider.kind, ProviderKind::Gemini);
        assert_eq!(config.provider.api_key.expose_secret(), "key-123");
        assert_eq!(config.provider.model, DEFAULT_MODEL);
        assert_eq!(config.provider.base_url, DEFAULT_GEMINI_BASE_URL);
        assert_eq!(config.provider.timeout(), Duration::from_secs(30));
        assert_eq!(config.provider.max_retries, 0);
        assert_eq!(config.resources.error_status, ErrorStatusPolicy::Mapped);
        assert!(!config.resources.validate_schema);
        assert!(config.cors.enabled);
        assert!(config.cors.allows_any_origin());
        assert!(config.observability.otlp_endpoint.is_none());
    }

    #[test]
    fn gemini_requires_api_key() {
        let err = load(&[]).unwrap_err();
        assert!(err.to_string().contains("GOOGLE_API_KEY is required"));
    }

    #[test]
    fn mock_provider_needs_no_api_key() {
        let config = load(&[("GENAI_PROVIDER", "mock")]).unwrap();
        assert_eq!(config.provider.kind, ProviderKind::Mock);
        assert!(config.provider.api_key.expose_secret().is_empty());
    }

    #[test]
    fn production_requires_every_variable() {
        let err = load(&[("ENVIRONMENT", "prod"), ("GOOGLE_API_KEY", "k")]).unwrap_err();
        assert!(err.to_string().contains("required in production"));
    }

    #[test]
    fn more_than_one_retry_is_rejected() {
        let err = load(&[("GOOGLE_API_KEY", "k"), ("GENAI_MAX_RETRIES", "3")]).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = load(&[("GOOGLE_API_KEY", "k"), ("GENAI_TIMEOUT_SECS", "0")]).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn unparsable_values_name_the_variable() {
        let err = load(&[("GOOGLE_API_KEY", "k"), ("GENAI_JSON_MODE", "maybe")]).unwrap_err();
        assert!(err.to_string().contains("GENAI_JSON_MODE"));
    }

    #[test]
    fn legacy_status_and_origin_list() {
        let config = load(&[
            ("GOOGLE_API_KEY", "k"),
            ("RESOURCES_ERROR_STATUS", "Legacy"),
            ("CORS_ALLOWED_ORIGINS", "https://app.example.com, https://admin.example.com"),
            ("GENAI_BASE_URL", "http://localhost:9999/v1beta/"),
        ])
        .unwrap();

        assert_eq!(config.resources.error_status, ErrorStatusPolicy::Legacy);
        assert_eq!(
            config.cors.allowed_origins,
            vec!["https://app.example.com", "https://admin.example.com"]
        );
        assert!(!config.cors.allows_any_origin());
        assert_eq!(config.provider.base_url, "http://localhost:9999/v1beta");
    }
}
