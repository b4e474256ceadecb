//! Crawler module: traversal engines and their fetch primitives
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with bounded retry and rate-limit delay
//! - Parsed-page access and structural selection
//! - The category tree walker and the paginated product walker
//! - Product field extraction and duplicate suppression

mod catalog;
mod dedup;
mod extract;
mod fetcher;
mod page;
mod products;

pub use catalog::{CategoryRecord, CategoryWalker, CATEGORY_HEADERS};
pub use dedup::DedupFilter;
pub use extract::{FieldExtractor, ProductRecord, PRODUCT_HEADERS};
pub use fetcher::{build_http_client, fetch_text, fetch_with_retry, FetchFailure};
pub use page::{Page, PageFetcher};
pub use products::ProductWalker;

use crate::config::{Config, RestartConfig};
use crate::output::CsvSink;
use crate::Result;
use std::future::Future;
use std::path::Path;
use std::time::Duration;

/// Walks the category tree and writes one CSV row per category
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(())` - Walk completed and output flushed
/// * `Err(CrawlError)` - The walk failed; the restart policy decides what
///   happens next
pub async fn run_catalog_walk(config: &Config) -> Result<()> {
    let mut walker = CategoryWalker::new(config)?;
    let mut sink = CsvSink::create(
        Path::new(&config.output.directory),
        "catalog_out_",
        &CATEGORY_HEADERS,
    )?;

    let mut written = 0usize;
    while let Some(record) = walker.next_record().await? {
        sink.write(&record)?;
        written += 1;
    }
    sink.finish()?;

    tracing::info!("catalog walk complete: {} records -> {}", written, sink.path().display());
    Ok(())
}

/// Walks the paginated product listings and writes one CSV row per product
pub async fn run_products_walk(config: &Config) -> Result<()> {
    let mut walker = ProductWalker::new(config, DedupFilter::new())?;
    let mut sink = CsvSink::create(
        Path::new(&config.output.directory),
        "products_out_",
        &PRODUCT_HEADERS,
    )?;

    let mut written = 0usize;
    while let Some(record) = walker.next_record().await? {
        sink.write(&record)?;
        written += 1;
    }
    sink.finish()?;

    tracing::info!(
        "product walk complete: {} records ({} distinct SKUs seen) -> {}",
        written,
        walker.seen_products(),
        sink.path().display()
    );
    Ok(())
}

/// Runs a whole walk-and-write operation under the restart policy
///
/// The operation is restarted from scratch on any error, up to
/// `restart-count` additional attempts with `interval-m` minutes between
/// them. A count of zero means the operation runs exactly once and its
/// error propagates immediately; there is no mid-crawl checkpoint.
pub async fn run_with_restarts<F, Fut>(restart: &RestartConfig, mut operation: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let mut retries_left = restart.restart_count;

    loop {
        match operation().await {
            Ok(()) => return Ok(()),
            Err(error) if retries_left > 0 => {
                retries_left -= 1;
                tracing::error!(
                    "walk failed, restarting in {} minute(s) ({} restarts left): {}",
                    restart.interval_m,
                    retries_left,
                    error
                );
                tokio::time::sleep(Duration::from_secs(restart.interval_m * 60)).await;
            }
            Err(error) => return Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CrawlError;
    use std::cell::Cell;

    fn failing() -> Result<()> {
        Err(CrawlError::MissingStructure {
            url: "u".to_string(),
            what: "w".to_string(),
        })
    }

    fn restart(count: u32) -> RestartConfig {
        RestartConfig {
            restart_count: count,
            interval_m: 0,
        }
    }

    #[tokio::test]
    async fn test_zero_restarts_runs_exactly_once() {
        let runs = Cell::new(0u32);
        let result = run_with_restarts(&restart(0), || {
            runs.set(runs.get() + 1);
            async { failing() }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(runs.get(), 1);
    }

    #[tokio::test]
    async fn test_restarts_until_budget_spent() {
        let runs = Cell::new(0u32);
        let result = run_with_restarts(&restart(2), || {
            runs.set(runs.get() + 1);
            async { failing() }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(runs.get(), 3);
    }

    #[tokio::test]
    async fn test_success_stops_restarting() {
        let runs = Cell::new(0u32);
        let result = run_with_restarts(&restart(5), || {
            runs.set(runs.get() + 1);
            let n = runs.get();
            async move {
                if n < 2 {
                    failing()
                } else {
                    Ok(())
                }
            }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(runs.get(), 2);
    }
}
