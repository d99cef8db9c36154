//! Service configuration.
//!
//! Values come from the process environment; `main` loads a `.env` file first
//! when one is present.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_SEARCH_URL: &str = "https://coursetreesearch-service-sandbox.dev.tophat.com";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const SEARCH_URL_VAR: &str = "COURSE_SEARCH_URL";
const BIND_ADDR_VAR: &str = "BIND_ADDR";
const TIMEOUT_VAR: &str = "COURSE_SEARCH_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base endpoint of the course search service, without a trailing slash.
    pub search_url: String,
    pub bind_addr: SocketAddr,
    /// Timeout applied to each upstream search request.
    pub request_timeout: Duration,
}

impl AppConfig {
    /// Read configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults for unset keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let search_url = lookup(SEARCH_URL_VAR)
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_SEARCH_URL.to_string());
        if !(search_url.starts_with("http://") || search_url.starts_with("https://")) {
            anyhow::bail!("{} must be an http(s) URL, got {:?}", SEARCH_URL_VAR, search_url);
        }
        let search_url = search_url.trim_end_matches('/').to_string();

        let bind_addr = lookup(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_addr
            .trim()
            .parse()
            .with_context(|| format!("Invalid {}: {:?}", BIND_ADDR_VAR, bind_addr))?;

        let timeout_secs = match lookup(TIMEOUT_VAR) {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid {}: {:?}", TIMEOUT_VAR, raw))?;
                if secs == 0 {
                    anyhow::bail!("{} must be greater than zero", TIMEOUT_VAR);
                }
                secs
            }
            None => DEFAULT_TIMEOUT_SECS,
        };

        let config = Self {
            search_url,
            bind_addr,
            request_timeout: Duration::from_secs(timeout_secs),
        };
        info!(
            "Config: search_url={} bind_addr={} timeout={}s",
            config.search_url, config.bind_addr, timeout_secs
        );
        Ok(config)
    }
}
