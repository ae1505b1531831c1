//! Logging setup and domain tags
//!
//! Events carry a `tag` field so log consumers can filter by subsystem
//! without inventing custom severity levels.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Process lifecycle
pub const GOONIO: &str = "goonio";
/// HTTP API handlers
pub const API: &str = "api";
/// Provider scraping
pub const SCRAPER: &str = "scraper";
/// Playback relay
pub const STREAM: &str = "stream";

/// Default filter directive for a given log level
pub fn default_filter(level: &str) -> String {
    format!("goonio_server={level},tower_http={level}")
}

/// Initialize the global JSON subscriber. `RUST_LOG` wins over `LOG_LEVEL`.
pub fn init(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(level).into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}
