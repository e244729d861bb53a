use anyhow::{Context, Result};
use reqwest::Url;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Token value shipped in `config.example.toml`.
pub const PLACEHOLDER_TOKEN: &str = "YOUR_BOT_TOKEN_HERE";
/// Mini App URL value shipped in `config.example.toml`.
pub const PLACEHOLDER_URL: &str = "https://your-app.vercel.app";

const TOKEN_ENV: &str = "MINIAPP_BOT_TOKEN";
const URL_ENV: &str = "MINIAPP_WEB_APP_URL";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub web_app: WebAppConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    #[serde(default = "default_bot_token")]
    pub bot_token: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebAppConfig {
    /// Public HTTPS address of the Mini App.
    #[serde(default = "default_web_app_url")]
    pub url: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: default_bot_token(),
        }
    }
}

impl Default for WebAppConfig {
    fn default() -> Self {
        Self {
            url: default_web_app_url(),
        }
    }
}

fn default_bot_token() -> String {
    PLACEHOLDER_TOKEN.to_string()
}

fn default_web_app_url() -> String {
    PLACEHOLDER_URL.to_string()
}

/// Reasons the bot refuses to start.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("bot token is empty")]
    MissingToken,
    #[error("bot token is still the placeholder value")]
    PlaceholderToken,
    #[error("web app url is still the placeholder value")]
    PlaceholderUrl,
    #[error("web app url '{url}' is invalid: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("web app url '{url}' must use https")]
    InsecureUrl { url: String },
}

impl ConfigError {
    /// Steps printed to the operator before exiting.
    pub fn guidance(&self) -> Vec<&'static str> {
        match self {
            ConfigError::MissingToken | ConfigError::PlaceholderToken => vec![
                "1. Search for @BotFather in Telegram",
                "2. Create a new bot and copy its token",
                "3. Put the token into [telegram] bot_token in config.toml (or set MINIAPP_BOT_TOKEN)",
            ],
            ConfigError::PlaceholderUrl => vec![
                "1. Deploy the Mini App to an HTTPS host",
                "2. Put its address into [web_app] url in config.toml (or set MINIAPP_WEB_APP_URL)",
            ],
            ConfigError::InvalidUrl { .. } | ConfigError::InsecureUrl { .. } => vec![
                "Telegram only opens Mini Apps served over HTTPS, e.g. https://example.com/app",
            ],
        }
    }
}

impl Config {
    /// Load the TOML file at `path` and apply environment overrides.
    ///
    /// A missing file is not an error: placeholders are used so that
    /// [`Config::validate`] can tell the operator what to fill in.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            warn!(
                "Config file {} not found, relying on environment variables",
                path.display()
            );
            Config::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(TOKEN_ENV).filter(|v| !v.trim().is_empty()) {
            info!("Bot token taken from {}", TOKEN_ENV);
            self.telegram.bot_token = token.trim().to_string();
        }
        if let Some(url) = lookup(URL_ENV).filter(|v| !v.trim().is_empty()) {
            info!("Web app url taken from {}", URL_ENV);
            self.web_app.url = url.trim().to_string();
        }
    }

    /// Check both required values and return the parsed Mini App URL.
    pub fn validate(&self) -> Result<Url, ConfigError> {
        let token = self.telegram.bot_token.trim();
        if token.is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if token == PLACEHOLDER_TOKEN {
            return Err(ConfigError::PlaceholderToken);
        }

        let raw = self.web_app.url.trim();
        if raw.trim_end_matches('/') == PLACEHOLDER_URL {
            return Err(ConfigError::PlaceholderUrl);
        }
        let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;
        if url.scheme() != "https" {
            return Err(ConfigError::InsecureUrl {
                url: raw.to_string(),
            });
        }

        Ok(url)
    }
}
