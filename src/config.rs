use crate::import::ImportSettings;
use anyhow::{Context, Result};
use std::time::Duration;

/// Service configuration, read once from the environment at startup.
///
/// Required: `CMS_BASE_URL`, `IMPORT_SECRET`. Everything else has a
/// default suitable for production pacing.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the trigger endpoint binds to.
    pub bind: String,
    /// Base URL of the CMS backend.
    pub cms_base_url: String,
    /// Shared secret for the trigger endpoint, compared by exact equality.
    pub import_secret: String,
    /// Base URL of the source listing site.
    pub source_base_url: String,
    /// Default page cap when the trigger omits maxPages.
    pub default_max_pages: u32,
    /// Seconds between listing-page fetches.
    pub page_delay_secs: u64,
    /// Milliseconds between CMS writes.
    pub record_delay_ms: u64,
    /// Seconds between brands in a multi-brand run.
    pub brand_pause_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bind: env_or("BIND_ADDR", "0.0.0.0:3001"),
            cms_base_url: std::env::var("CMS_BASE_URL")
                .context("CMS_BASE_URL must be set")?,
            import_secret: std::env::var("IMPORT_SECRET")
                .context("IMPORT_SECRET must be set")?,
            source_base_url: env_or("SOURCE_BASE_URL", "https://www.gebrauchtwagen24.de"),
            default_max_pages: parse_or("DEFAULT_MAX_PAGES", 10)?,
            page_delay_secs: parse_or("PAGE_DELAY_SECS", 2)?,
            record_delay_ms: parse_or("RECORD_DELAY_MS", 300)?,
            brand_pause_secs: parse_or("BRAND_PAUSE_SECS", 5)?,
        })
    }

    /// Import pacing derived from this configuration.
    pub fn import_settings(&self, max_pages: Option<u32>) -> ImportSettings {
        ImportSettings {
            max_pages: max_pages.unwrap_or(self.default_max_pages).max(1),
            page_delay: Duration::from_secs(self.page_delay_secs),
            record_delay: Duration::from_millis(self.record_delay_ms),
            brand_pause: Duration::from_secs(self.brand_pause_secs),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse().with_context(|| format!("{} must be a number", key)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            bind: "127.0.0.1:0".into(),
            cms_base_url: "http://cms.local".into(),
            import_secret: "secret".into(),
            source_base_url: "http://source.local".into(),
            default_max_pages: 10,
            page_delay_secs: 2,
            record_delay_ms: 300,
            brand_pause_secs: 5,
        }
    }

    #[test]
    fn trigger_max_pages_overrides_default() {
        let config = test_config();
        assert_eq!(config.import_settings(Some(3)).max_pages, 3);
        assert_eq!(config.import_settings(None).max_pages, 10);
    }

    #[test]
    fn max_pages_floor_is_one() {
        assert_eq!(test_config().import_settings(Some(0)).max_pages, 1);
    }
}
