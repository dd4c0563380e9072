//! Asset relay
//!
//! Serves stored assets (contracts, images, ticket attachments) and relays
//! misses to sibling services.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │                 ASSET RELAY                  │
//!   GET /files/<path>     │  ┌──────┐   ┌──────────┐   ┌──────────────┐  │
//!   ──────────────────────┼─▶│ http │──▶│ resolver │──▶│ local layouts│  │
//!                         │  └──────┘   └────┬─────┘   └──────────────┘  │
//!                         │                  │ miss                      │
//!                         │                  ▼                           │
//!                         │           ┌────────────┐    X-Proxy-From     │
//!                         │           │ peer relay │─────────────────────┼──▶ file store
//!                         │           └────────────┘  (5s per peer)      │──▶ legacy peers
//!                         │                                              │
//!                         │  config · observability · lifecycle · net    │
//!                         └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use asset_relay::config::load_config;
use asset_relay::lifecycle::startup;
use asset_relay::observability::logging;
use clap::Parser;

#[derive(Parser)]
#[command(name = "asset-relay")]
#[command(about = "Serve stored assets and relay misses to sibling services", long_about = None)]
struct Cli {
    /// Optional TOML configuration file; environment variables override it.
    #[arg(short, long, env = "ASSET_RELAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is normal in containers.
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    logging::init_logging(&config.observability);
    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "Loaded .env");
    }
    tracing::info!("asset-relay v{} starting", env!("CARGO_PKG_VERSION"));

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
