use anyhow::{bail, Context, Result};

use crate::extraction::KeyRing;
use crate::llm_client::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Optional; enables the shared key-rotation index.
    pub redis_url: Option<String>,
    pub vision_api_keys: KeyRing,
    pub vision_model: String,
    pub vision_base_url: String,
    /// Sent as `HTTP-Referer` to the vision gateway.
    pub site_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let vision_api_keys = match optional_env("VISION_API_KEYS") {
            Some(keys) => KeyRing::parse(&keys),
            None => KeyRing::parse(&require_env("VISION_API_KEY")?),
        };
        if vision_api_keys.is_empty() {
            bail!("VISION_API_KEYS or VISION_API_KEY must contain at least one key");
        }

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: optional_env("REDIS_URL"),
            vision_api_keys,
            vision_model: optional_env("VISION_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            vision_base_url: optional_env("VISION_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            site_url: optional_env("SITE_URL"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank values both read as `None`.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
