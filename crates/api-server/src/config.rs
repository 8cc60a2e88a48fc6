use analysis_orchestrator::OrchestratorConfig;
use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use yahoo_client::YahooConfig;

/// Server settings read from the environment (after `.env` is loaded).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    // Upstream cache
    pub cache_ttl_secs: i64,
    pub cache_max_entries: usize,

    // Upstream requests
    pub news_limit: usize,
    pub http_timeout_secs: u64,
    pub news_timeout_secs: u64,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source; missing variables take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let config = Self {
            host: var("HOST", "0.0.0.0"),
            port: parse(&var("PORT", "8000"), "PORT")?,
            cache_ttl_secs: parse(&var("CACHE_TTL_SECS", "900"), "CACHE_TTL_SECS")?,
            cache_max_entries: parse(&var("CACHE_MAX_ENTRIES", "100"), "CACHE_MAX_ENTRIES")?,
            news_limit: parse(&var("NEWS_LIMIT", "5"), "NEWS_LIMIT")?,
            http_timeout_secs: parse(&var("HTTP_TIMEOUT_SECS", "10"), "HTTP_TIMEOUT_SECS")?,
            news_timeout_secs: parse(&var("NEWS_TIMEOUT_SECS", "5"), "NEWS_TIMEOUT_SECS")?,
        };

        if config.cache_ttl_secs < 0 {
            anyhow::bail!("CACHE_TTL_SECS must not be negative");
        }

        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            cache_ttl: chrono::Duration::seconds(self.cache_ttl_secs),
            cache_max_entries: self.cache_max_entries,
            news_limit: self.news_limit,
        }
    }

    pub fn yahoo_config(&self) -> YahooConfig {
        YahooConfig {
            timeout: Duration::from_secs(self.http_timeout_secs),
            news_timeout: Duration::from_secs(self.news_timeout_secs),
        }
    }
}

fn parse<T>(raw: &str, name: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse()
        .with_context(|| format!("invalid value for {}: {:?}", name, raw))
}
