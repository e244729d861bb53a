mod bot;
mod config;
mod payload;
mod replies;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::bot::AppState;
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,miniapp_bot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let web_app_url = match config.validate() {
        Ok(url) => url,
        Err(e) => {
            error!("Refusing to start: {}", e);
            for line in e.guidance() {
                eprintln!("{line}");
            }
            return Err(e.into());
        }
    };

    info!("Configuration loaded successfully");

    let state = Arc::new(AppState::new(config, web_app_url));

    bot::run(state).await?;

    Ok(())
}
