use anyhow::{Context, Result};
use tracing::warn;

/// Bright Data style proxy credentials, taken from the environment.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub username: String,
    pub password: String,
    pub host: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Missing proxy configuration is logged but not fatal; fetches then go
    /// out directly.
    pub proxy: Option<ProxyConfig>,
    /// Base URL of the job-tracking service that receives the final report.
    pub service_url: String,
    /// Per-page timing diagnostics.
    pub enable_timing: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let proxy = match (
            std::env::var("BRIGHT_DATA_USERNAME"),
            std::env::var("BRIGHT_DATA_PASSWORD"),
            std::env::var("BRIGHT_DATA_HOST"),
        ) {
            (Ok(username), Ok(password), Ok(host)) => Some(ProxyConfig { username, password, host }),
            _ => {
                warn!("missing proxy configuration, fetching without proxy");
                None
            }
        };

        let service_url = std::env::var("SERVICE_URL")
            .context("SERVICE_URL environment variable must be set")?;

        let enable_timing = std::env::var("ENABLE_TIMING")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self { proxy, service_url, enable_timing })
    }
}
