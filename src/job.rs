use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Utc};
use scraper::Html;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::Config;
use crate::fetch;
use crate::model::{JobReport, JobStatus, Product, QaPair, Review};
use crate::parser::extract;
use crate::report;
use crate::timing::ScopedTimer;

/// Fetches required before a product job can complete: the main page, the
/// Q&A page, and the critical/positive review pages.
pub const PRODUCT_FETCHES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Main,
    Questions,
    CriticalReviews,
    PositiveReviews,
}

impl PageKind {
    fn label(self) -> &'static str {
        match self {
            PageKind::Main => "main_page",
            PageKind::Questions => "questions_page",
            PageKind::CriticalReviews => "critical_reviews_page",
            PageKind::PositiveReviews => "positive_reviews_page",
        }
    }
}

/// Per-job coordinator state. One instance per job, constructed before any
/// fetch is issued and discarded after the report is submitted. Each page
/// handler writes a disjoint slice of this state; the completed counter is
/// the only value every handler touches.
pub struct ProductJob {
    job_id: String,
    url: String,
    product_id: String,
    domain: String,
    started_at: DateTime<Utc>,
    status: JobStatus,
    product: Option<Product>,
    critical_reviews: Vec<Review>,
    positive_reviews: Vec<Review>,
    default_reviews: Vec<Review>,
    qa: Vec<QaPair>,
    completed: usize,
    timing: bool,
}

impl ProductJob {
    /// Fails on configuration errors (missing url/job id, url without an
    /// ASIN or host); no fetch is issued in that case.
    pub fn new(url: &str, job_id: &str, timing: bool) -> Result<Self> {
        if url.is_empty() || job_id.is_empty() {
            bail!("url and job id are required");
        }
        let product_id = extract::asin_from_url(url)
            .ok_or_else(|| anyhow!("no /dp/<ASIN> segment in url '{}'", url))?;
        let domain = url
            .split('/')
            .nth(2)
            .filter(|d| !d.is_empty())
            .ok_or_else(|| anyhow!("no host in url '{}'", url))?
            .to_string();

        Ok(Self {
            job_id: job_id.to_string(),
            url: url.to_string(),
            product_id,
            domain,
            started_at: Utc::now(),
            status: JobStatus::Pending,
            product: None,
            critical_reviews: Vec::new(),
            positive_reviews: Vec::new(),
            default_reviews: Vec::new(),
            qa: Vec::new(),
            completed: 0,
            timing,
        })
    }

    /// The four page URLs, derived deterministically from the seed URL.
    pub fn page_urls(&self) -> Vec<(PageKind, String)> {
        vec![
            (
                PageKind::Questions,
                format!("https://{}/ask/questions/asin/{}", self.domain, self.product_id),
            ),
            (PageKind::Main, self.url.clone()),
            (
                PageKind::CriticalReviews,
                format!(
                    "https://{}/product-reviews/{}/?filterByStar=critical&reviewerType=avp_only_reviews",
                    self.domain, self.product_id
                ),
            ),
            (
                PageKind::PositiveReviews,
                format!(
                    "https://{}/product-reviews/{}/?filterByStar=positive&reviewerType=avp_only_reviews",
                    self.domain, self.product_id
                ),
            ),
        ]
    }

    /// Run the extractors for one completed fetch and count it. One fetch is
    /// issued per kind, so each slice of the record is written once.
    pub fn handle_page(&mut self, kind: PageKind, doc: &Html) {
        let _timer = ScopedTimer::new(kind.label(), self.timing);
        match kind {
            PageKind::Main => {
                self.product = Some(extract::product_record(
                    doc,
                    &self.product_id,
                    &self.job_id,
                    &self.domain,
                ));
                let mut on_page = Vec::new();
                extract::reviews::collect(doc, &mut on_page);
                self.default_reviews = on_page;
            }
            PageKind::Questions => self.qa = extract::qa::extract(doc),
            PageKind::CriticalReviews => {
                let mut acc = Vec::new();
                extract::reviews::collect(doc, &mut acc);
                self.critical_reviews = acc;
            }
            PageKind::PositiveReviews => {
                let mut acc = Vec::new();
                extract::reviews::collect(doc, &mut acc);
                self.positive_reviews = acc;
            }
        }
        self.completed += 1;
    }

    /// The completion transition, evaluated after every increment. Fires only
    /// when the counter reaches the required count while still pending, so a
    /// report is produced at most once per job.
    pub fn finish(&mut self) -> Option<JobReport<Product>> {
        if self.completed != PRODUCT_FETCHES || self.status != JobStatus::Pending {
            return None;
        }
        // Take the product before committing the terminal transition, so a
        // missing record can never leave the job marked completed without a
        // report behind it.
        let mut product = self.product.take()?;
        self.status = JobStatus::Completed;
        product.reviews = extract::reviews::merge(
            std::mem::take(&mut self.critical_reviews),
            std::mem::take(&mut self.positive_reviews),
            std::mem::take(&mut self.default_reviews),
        );
        product.qa = std::mem::take(&mut self.qa);

        Some(JobReport {
            job_id: self.job_id.clone(),
            status: self.status,
            start_time: self.started_at,
            end_time: Utc::now(),
            result: product,
            url: self.url.clone(),
            error: serde_json::Map::new(),
        })
    }

    pub fn completed(&self) -> usize {
        self.completed
    }
}

/// Run one product job end to end: issue the four fetches concurrently,
/// process completions strictly sequentially, and submit exactly one report
/// once all four have arrived.
pub async fn run_product_job(cfg: &Config, url: &str, job_id: &str) -> Result<()> {
    let mut job = ProductJob::new(url, job_id, cfg.enable_timing)?;
    let client = fetch::build_client(cfg)?;
    let (tx, mut rx) = mpsc::channel::<(PageKind, String)>(PRODUCT_FETCHES);

    for (kind, page_url) in job.page_urls() {
        let client = client.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            match fetch::fetch_page(&client, &page_url).await {
                Ok(body) => {
                    let _ = tx.send((kind, body)).await;
                }
                // A failed fetch sends nothing: the counter never reaches the
                // required count and no report is emitted for this job.
                Err(e) => warn!("{} fetch failed for {}: {}", kind.label(), page_url, e),
            }
        });
    }

    // Drop our copy of tx so rx closes when all spawned tasks finish
    drop(tx);

    // The receive loop is the single writer: handlers run one at a time, so
    // the shared record, the side buffers and the increment-and-compare on
    // the counter need no further synchronization.
    while let Some((kind, body)) = rx.recv().await {
        let doc = Html::parse_document(&body);
        job.handle_page(kind, &doc);
        if let Some(report) = job.finish() {
            report::submit(cfg, &report).await?;
            info!("job {} reported", job_id);
            return Ok(());
        }
    }

    warn!(
        "job {} incomplete ({}/{} fetches); no report emitted",
        job_id,
        job.completed(),
        PRODUCT_FETCHES
    );
    Ok(())
}

/// Run one search-listing job: a single fetch, a single extraction pass, one
/// report. No coordination state.
pub async fn run_search_job(cfg: &Config, url: &str, job_id: &str) -> Result<()> {
    if url.is_empty() || job_id.is_empty() {
        bail!("url and job id are required");
    }
    let started_at = Utc::now();
    let client = fetch::build_client(cfg)?;
    let body = fetch::fetch_page(&client, url).await?;
    let doc = Html::parse_document(&body);

    let products = {
        let _timer = ScopedTimer::new("search_page", cfg.enable_timing);
        extract::listing::extract(&doc)
    };
    info!("job {}: {} listing products", job_id, products.len());

    let report = JobReport {
        job_id: job_id.to_string(),
        status: JobStatus::Completed,
        start_time: started_at,
        end_time: Utc::now(),
        result: products,
        url: url.to_string(),
        error: serde_json::Map::new(),
    };
    report::submit(cfg, &report).await?;
    info!("job {} reported", job_id);
    Ok(())
}

// ── Tests ──
