use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::model::JobReport;

const UPDATE_PATH: &str = "/api/v1/scrapy/update";

/// Submit the finished job to the tracking service. Called exactly once per
/// job; the acknowledgment only gates shutdown, not correctness.
pub async fn submit<T: Serialize>(cfg: &Config, report: &JobReport<T>) -> Result<()> {
    let endpoint = format!("{}{}", cfg.service_url.trim_end_matches('/'), UPDATE_PATH);

    let response = reqwest::Client::new()
        .post(&endpoint)
        .json(report)
        .send()
        .await
        .with_context(|| format!("failed to reach reporting service at {}", endpoint))?;

    response
        .error_for_status()
        .context("reporting service rejected the job update")?;

    info!("job {} submitted to {}", report.job_id, endpoint);
    Ok(())
}
