//! Mini App bot setup wizard.
//!
//! Asks for the bot token and the Mini App URL in the terminal and writes
//! `config.toml` to the project root. Blank answers keep the placeholders,
//! which the bot refuses to start with.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

// Must match PLACEHOLDER_TOKEN / PLACEHOLDER_URL in src/config.rs, which
// rejects these values at startup.
const PLACEHOLDER_TOKEN: &str = "YOUR_BOT_TOKEN_HERE";
const PLACEHOLDER_URL: &str = "https://your-app.vercel.app";

const HEADER: &str = "# Generated by the setup wizard.\n\
                      # Environment overrides: MINIAPP_BOT_TOKEN, MINIAPP_WEB_APP_URL\n\n";

#[derive(Serialize)]
struct SetupConfig<'a> {
    telegram: TelegramSection<'a>,
    web_app: WebAppSection<'a>,
}

#[derive(Serialize)]
struct TelegramSection<'a> {
    bot_token: &'a str,
}

#[derive(Serialize)]
struct WebAppSection<'a> {
    url: &'a str,
}

/// Produces a valid config.toml string. Extracted so it can be unit-tested.
fn format_config(bot_token: &str, web_app_url: &str) -> Result<String> {
    let config = SetupConfig {
        telegram: TelegramSection {
            bot_token: or_default(bot_token, PLACEHOLDER_TOKEN),
        },
        web_app: WebAppSection {
            url: or_default(web_app_url, PLACEHOLDER_URL),
        },
    };
    let body = toml::to_string(&config).context("Failed to render config.toml")?;
    Ok(format!("{HEADER}{body}"))
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    let value = value.trim();
    if value.is_empty() {
        default
    } else {
        value
    }
}

fn read_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut buf = String::new();
    io::stdin().read_line(&mut buf)?;
    Ok(buf.trim().to_owned())
}

fn main() -> Result<()> {
    // Resolve project root: prefer MINIAPP_BOT_ROOT env, fall back to cwd.
    let project_root =
        PathBuf::from(std::env::var("MINIAPP_BOT_ROOT").unwrap_or_else(|_| ".".to_string()));

    println!("=== Mini App Bot Setup ===\n");

    let bot_token = read_line("Telegram bot token (from @BotFather): ")?;
    let web_app_url = read_line("Mini App URL (https://...): ")?;

    if !web_app_url.is_empty() && !web_app_url.starts_with("https://") {
        println!("!  Telegram only opens Mini Apps over HTTPS; the bot will refuse this URL.");
    }

    let config = format_config(&bot_token, &web_app_url)?;
    let config_path = project_root.join("config.toml");
    std::fs::write(&config_path, &config)
        .with_context(|| format!("Could not write {}", config_path.display()))?;

    println!("\n✓  config.toml saved to {}", config_path.display());
    println!("   Run the bot with:  cargo run");
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
