//! HTTP fetcher
//!
//! This module issues the single GET behind every page visit:
//! - Building the HTTP client with the configured user agent and headers
//! - An artificial delay before the request (rate limiting)
//! - Bounded retry on transient connectivity failures
//! - Degrading every other failure to an absent body after logging it

use crate::config::RequestConfig;
use crate::CrawlError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::future::Future;
use std::time::Duration;

/// Classification of a single failed fetch attempt
#[derive(Debug)]
pub enum FetchFailure {
    /// Connection-level failure worth another attempt
    Transient(String),
    /// Anything else; retrying will not help
    Fatal(String),
}

/// Builds the HTTP client used for every request of a run
///
/// # Arguments
///
/// * `config` - User agent and extra header configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(CrawlError)` - A header was malformed or the client failed to build
pub fn build_http_client(config: &RequestConfig) -> Result<Client, CrawlError> {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            CrawlError::InvalidHeader {
                name: name.clone(),
                message: e.to_string(),
            }
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| CrawlError::InvalidHeader {
            name: name.to_string(),
            message: e.to_string(),
        })?;
        headers.insert(name, value);
    }

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
        .map_err(CrawlError::Client)
}

/// Runs `attempt` up to `max_retries` times, stopping early on success or a
/// fatal failure
///
/// `max_retries` is the total attempt budget: with a budget of 3 and two
/// transient failures the third attempt still runs. A fatal failure consumes
/// the whole budget. Exhaustion and fatal failures both degrade to `None`
/// after a log entry; callers must treat `None` as "skip this unit of work".
pub async fn fetch_with_retry<F, Fut>(max_retries: u32, mut attempt: F) -> Option<String>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, FetchFailure>>,
{
    let mut attempts = max_retries;

    while attempts > 0 {
        match attempt().await {
            Ok(body) => return Some(body),
            Err(FetchFailure::Transient(message)) => {
                attempts -= 1;
                tracing::debug!(
                    "transient fetch failure ({} attempts left): {}",
                    attempts,
                    message
                );
            }
            Err(FetchFailure::Fatal(message)) => {
                tracing::error!("fetch failed: {}", message);
                return None;
            }
        }
    }

    tracing::warn!("fetch attempts exhausted after {} tries", max_retries);
    None
}

/// Fetches a URL and returns its body text, or `None` on failure
///
/// Sleeps `delay` once before the first attempt; retries only transient
/// connectivity failures. The body is returned regardless of HTTP status:
/// the site serves usable markup on some error pages, and pages whose
/// structure does not match are skipped later anyway.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `delay` - Artificial delay applied before the request
/// * `max_retries` - Total attempt budget
pub async fn fetch_text(
    client: &Client,
    url: &str,
    delay: Duration,
    max_retries: u32,
) -> Option<String> {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    fetch_with_retry(max_retries, || async move {
        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, &e))?;

        response
            .text()
            .await
            .map_err(|e| FetchFailure::Fatal(format!("failed to read body of {}: {}", url, e)))
    })
    .await
}

/// Maps a reqwest error onto the retry classification
fn classify_error(url: &str, error: &reqwest::Error) -> FetchFailure {
    if error.is_connect() || error.is_timeout() {
        FetchFailure::Transient(format!("{}: {}", url, error))
    } else {
        FetchFailure::Fatal(format!("{}: {}", url, error))
    }
}
