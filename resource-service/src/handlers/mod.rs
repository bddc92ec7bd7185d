//! HTTP handlers for the resource service.

pub mod health;
pub mod metrics;
pub mod resources;

pub use health::{health_check, readiness_check};
pub use metrics::metrics_endpoint;
pub use resources::{fetch_resources, not_found};
