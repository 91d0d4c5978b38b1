use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// The LLM key is required at startup; notification credentials are optional
/// and their channels report "not configured" when missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub sendgrid_api_key: Option<String>,
    pub from_email: String,
    pub whatsapp_access_token: Option<String>,
    pub whatsapp_phone_number_id: Option<String>,
    pub catalog_path: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            sendgrid_api_key: optional_env("SENDGRID_API_KEY"),
            from_email: std::env::var("FROM_EMAIL")
                .unwrap_or_else(|_| "recommendations@justbookify.com".to_string()),
            whatsapp_access_token: optional_env("WHATSAPP_ACCESS_TOKEN"),
            whatsapp_phone_number_id: optional_env("WHATSAPP_PHONE_NUMBER_ID"),
            catalog_path: optional_env("CATALOG_PATH"),
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

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
