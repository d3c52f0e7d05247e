//! proxyharvest - proxy connection-profile harvester.
//!
//! Polls a fixed list of public message feeds for proxy/VPN endpoint URIs
//! and reduces the harvest to a deduplicated, freshness-filtered, ranked
//! output list.

use proxyharvest::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let default_filter = if cli::is_verbose() {
        "proxyharvest=debug"
    } else {
        "proxyharvest=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Run CLI
    cli::run().await
}
