use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// A missing `OPENAI_API_KEY` is a fatal startup condition.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    /// Model used for question generation. Override with `MODEL_QGEN`.
    pub qgen_model: String,
    /// Model used for answer critique. Override with `MODEL_CRIT`.
    pub critique_model: String,
    pub port: u16,
    pub rust_log: String,
}

const DEFAULT_MODEL: &str = "gpt-4o-mini";

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            qgen_model: std::env::var("MODEL_QGEN").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            critique_model: std::env::var("MODEL_CRIT")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
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
