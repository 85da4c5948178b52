use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use idea_pipeline_cli::translate::DEFAULT_ENDPOINT;

pub const DEFAULT_SCHEDULE: &str = "0 0 9 * * *";

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub target_url: String,
    pub translate_api_url: String,
    pub translate_api_key: Option<String>,
    pub source_lang: String,
    pub target_lang: String,
    pub render_timeout: Duration,
    pub translate_interval: Duration,
    pub notion_api_key: String,
    pub notion_database_id: String,
    pub cron_schedule: String,
    pub run_on_startup: bool,
    pub port: u16,
    pub client_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());
        let millis = |key: &str, default: &str| -> Result<Duration> {
            let ms: u64 = or(key, default)
                .parse()
                .with_context(|| format!("{key} must be a number of milliseconds"))?;
            Ok(Duration::from_millis(ms))
        };

        Ok(Self {
            target_url: get("TARGET_URL").context("TARGET_URL must be set")?,
            translate_api_url: or("TRANSLATE_API_URL", DEFAULT_ENDPOINT),
            translate_api_key: get("TRANSLATE_API_KEY").filter(|k| !k.is_empty()),
            source_lang: or("SOURCE_LANG", "en"),
            target_lang: or("TARGET_LANG", "ko"),
            render_timeout: millis("RENDER_TIMEOUT_MS", "60000")?,
            translate_interval: millis("TRANSLATE_INTERVAL_MS", "500")?,
            notion_api_key: get("NOTION_API_KEY").context("NOTION_API_KEY must be set")?,
            notion_database_id: get("NOTION_DATABASE_ID")
                .context("NOTION_DATABASE_ID must be set")?,
            cron_schedule: or("CRON_SCHEDULE", DEFAULT_SCHEDULE),
            run_on_startup: matches!(
                or("RUN_ON_STARTUP", "false").to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            ),
            port: or("PORT", "3000")
                .parse()
                .context("PORT must be a valid number")?,
            client_url: get("CLIENT_URL").filter(|u| !u.is_empty()),
        })
    }
}
