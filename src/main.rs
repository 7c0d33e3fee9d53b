//! Lead Stream - Main entry point
//!
//! Serves the streaming lead search API over HTTP.

use anyhow::Result;
use lead_stream::server::{run_server, AppState};
use lead_stream::Config;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first so LOG_LEVEL can seed the filter
    let config = Config::from_env();

    let fallback = config
        .as_ref()
        .map(|cfg| cfg.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match config {
        Ok(cfg) => {
            info!("Configuration loaded successfully");
            cfg
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    info!(
        "Starting lead stream server with search API URL: {}",
        config.serpapi_url
    );
    info!(
        "Result cap: {}, page size: {}, progress every {} leads",
        config.max_results, config.page_size, config.progress_interval
    );

    let state = AppState::from_config(config);
    run_server(state).await?;

    info!("Lead stream server shutdown complete");
    Ok(())
}
