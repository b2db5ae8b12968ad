mod config;
mod fetch;
mod job;
mod model;
mod parser;
mod report;
mod timing;

use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser)]
#[command(name = "amazon_scraper", about = "Amazon product/search scraper with job reporting")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape one product page (plus its reviews and Q&A pages) and report the job
    Product {
        /// Product page URL containing a /dp/<ASIN> segment
        #[arg(long)]
        url: String,
        /// Job id assigned by the tracking service
        #[arg(long)]
        job_id: String,
    },
    /// Scrape one search-results page and report the job
    Search {
        /// Search results URL
        #[arg(long)]
        url: String,
        /// Job id assigned by the tracking service
        #[arg(long)]
        job_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let cfg = config::Config::from_env()?;

    let result = match cli.command {
        Commands::Product { url, job_id } => job::run_product_job(&cfg, &url, &job_id).await,
        Commands::Search { url, job_id } => job::run_search_job(&cfg, &url, &job_id).await,
    };

    info!("done in {:.1}s", t0.elapsed().as_secs_f64());
    result
}
