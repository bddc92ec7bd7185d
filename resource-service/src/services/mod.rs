pub mod fetcher;
pub mod metrics;
pub mod prompt;
pub mod providers;

pub use fetcher::ResourceFetcher;
pub use metrics::{get_metrics, init_metrics};
