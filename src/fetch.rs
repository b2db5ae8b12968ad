use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::warn;

use crate::config::Config;

const PROXY_PORT: u16 = 22225;
const MAX_RETRIES: u32 = 3;
const BASE_BACKOFF_MS: u64 = 2000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/124.0.0.0 Safari/537.36";

/// Build the HTTP client for one job. A fresh random proxy session id keeps
/// the job's page fetches on the same exit while separating jobs from each
/// other.
pub fn build_client(cfg: &Config) -> Result<Client> {
    let mut builder = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT);

    if let Some(proxy) = &cfg.proxy {
        let session_id = fastrand::u32(..1_000_000);
        let session_user = format!("{}-session-{}", proxy.username, session_id);
        let proxy_url = format!("http://{}:{}", proxy.host, PROXY_PORT);
        builder = builder.proxy(
            reqwest::Proxy::all(&proxy_url)
                .with_context(|| format!("invalid proxy url {}", proxy_url))?
                .basic_auth(&session_user, &proxy.password),
        );
    }

    builder.build().context("failed to build http client")
}

/// Fetch one page body, retrying with exponential backoff on rate limits and
/// upstream errors.
pub async fn fetch_page(client: &Client, url: &str) -> Result<String> {
    for attempt in 0..=MAX_RETRIES {
        let response = client.get(url).send().await;

        let should_retry = match &response {
            Ok(r) if r.status().as_u16() == 429 || r.status().is_server_error() => true,
            Ok(_) => false,
            Err(e) => e.is_timeout() || e.is_connect(),
        };

        if !should_retry || attempt == MAX_RETRIES {
            let response = response.with_context(|| format!("request failed for {}", url))?;
            let response = response
                .error_for_status()
                .with_context(|| format!("error status for {}", url))?;
            return response
                .text()
                .await
                .with_context(|| format!("failed to read body of {}", url));
        }

        let backoff = Duration::from_millis(BASE_BACKOFF_MS * 2u64.pow(attempt));
        warn!(
            "retrying {} (attempt {}/{}), backing off {:.1}s",
            url,
            attempt + 1,
            MAX_RETRIES,
            backoff.as_secs_f64()
        );
        tokio::time::sleep(backoff).await;
    }

    unreachable!("retry loop always returns on the final attempt")
}
