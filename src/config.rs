use std::env;
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::http::{HttpClientConfig, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS};
use crate::{coingecko, coinmetrics};

/// Reads trimmed, non-empty values from some key/value source.
struct Source<F: Fn(&str) -> Option<String>>(F);

impl<F: Fn(&str) -> Option<String>> Source<F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn string(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn u64(&self, key: &str, default: u64) -> Result<u64> {
        match self.get(key) {
            None => Ok(default),
            Some(v) => v
                .parse::<u64>()
                .map_err(|e| anyhow!("{key} invalid int: {e}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // Endpoints
    pub coingecko_base_url: String,
    pub coinmetrics_base_url: String,

    // HTTP
    pub http_timeout_secs: u64,
    pub http_connect_timeout_secs: u64,
    pub http_user_agent: Option<String>,
}

impl Settings {
    /// Loads settings from the process environment.
    pub fn load() -> Result<Self> {
        Self::load_from(|key| env::var(key).ok())
    }

    /// Loads settings from `lookup`, falling back to defaults for unset keys.
    pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let src = Source(lookup);
        let s = Self {
            coingecko_base_url: src.string("COINGECKO_BASE_URL", coingecko::BASE_URL),
            coinmetrics_base_url: src.string("COINMETRICS_BASE_URL", coinmetrics::BASE_URL),
            http_timeout_secs: src.u64("HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            http_connect_timeout_secs: src.u64("HTTP_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
            http_user_agent: src.get("HTTP_USER_AGENT"),
        };

        s.validate()?;
        Ok(s)
    }

    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("COINGECKO_BASE_URL", &self.coingecko_base_url),
            ("COINMETRICS_BASE_URL", &self.coinmetrics_base_url),
        ] {
            Url::parse(value).map_err(|e| anyhow!("{key} invalid url {value}: {e}"))?;
        }
        if self.http_timeout_secs < 1 {
            return Err(anyhow!(
                "HTTP_TIMEOUT_SECS must be >= 1 (got {})",
                self.http_timeout_secs
            ));
        }
        if self.http_connect_timeout_secs < 1 {
            return Err(anyhow!(
                "HTTP_CONNECT_TIMEOUT_SECS must be >= 1 (got {})",
                self.http_connect_timeout_secs
            ));
        }
        Ok(())
    }

    /// HTTP configuration shared by both clients.
    pub fn http_config(&self) -> HttpClientConfig {
        let config = HttpClientConfig::default()
            .with_timeout(Duration::from_secs(self.http_timeout_secs))
            .with_connect_timeout(Duration::from_secs(self.http_connect_timeout_secs));
        match &self.http_user_agent {
            Some(agent) => config.with_user_agent(agent.clone()),
            None => config,
        }
    }
}
