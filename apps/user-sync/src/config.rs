use anyhow::{Context, Result};

/// Default window, in seconds, within which a webhook timestamp is accepted.
pub const DEFAULT_WEBHOOK_TOLERANCE_SECS: i64 = 300;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Svix signing secret from the Clerk dashboard (`whsec_...`).
    pub clerk_webhook_secret: String,
    pub webhook_tolerance_secs: i64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            clerk_webhook_secret: require_env("CLERK_WEBHOOK_SECRET")?,
            webhook_tolerance_secs: match std::env::var("WEBHOOK_TOLERANCE_SECS") {
                Ok(raw) => raw
                    .parse::<i64>()
                    .context("WEBHOOK_TOLERANCE_SECS must be a whole number of seconds")?,
                Err(_) => DEFAULT_WEBHOOK_TOLERANCE_SECS,
            },
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
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
