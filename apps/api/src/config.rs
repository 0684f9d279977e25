use std::str::FromStr;

use anyhow::{Context, Result};

const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_GEMINI_TIMEOUT_SECS: u64 = 120;
/// Retries stay off unless explicitly enabled: one user action, one model call.
const DEFAULT_GEMINI_MAX_RETRIES: u32 = 0;
const MAX_GEMINI_RETRIES: u32 = 5;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_api_base: String,
    pub gemini_timeout_secs: u64,
    pub gemini_max_retries: u32,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_api_base: std::env::var("GEMINI_API_BASE")
                .unwrap_or_else(|_| DEFAULT_GEMINI_API_BASE.to_string()),
            gemini_timeout_secs: parse_var(
                "GEMINI_TIMEOUT_SECS",
                std::env::var("GEMINI_TIMEOUT_SECS").ok(),
                DEFAULT_GEMINI_TIMEOUT_SECS,
            )?,
            gemini_max_retries: parse_var(
                "GEMINI_MAX_RETRIES",
                std::env::var("GEMINI_MAX_RETRIES").ok(),
                DEFAULT_GEMINI_MAX_RETRIES,
            )?
            .min(MAX_GEMINI_RETRIES),
            port: parse_var("PORT", std::env::var("PORT").ok(), 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    let value = std::env::var(key)
        .with_context(|| format!("Required environment variable '{key}' is not set"))?;
    if value.trim().is_empty() {
        anyhow::bail!("Required environment variable '{key}' is empty");
    }
    Ok(value)
}

/// Parses an optional raw value, falling back to `default` when unset.
fn parse_var<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
    }
}
