//! Axum middleware shared by the workspace's HTTP services.
pub mod metrics;
pub mod security_headers;
pub mod tracing;
