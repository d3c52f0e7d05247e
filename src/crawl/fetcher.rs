//! Retriable, paginated fetch of a single source.
//!
//! Pagination follows the cursor token embedded in each page body (the
//! attribute marking the oldest loaded item). Walks are bounded by a fixed
//! page budget per run, never an unbounded history crawl.

use async_trait::async_trait;
use rand::Rng;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Settings;

/// Cursor attribute marking the oldest loaded message on a page.
const CURSOR_PATTERN: &str = r#"data-before="(\d+)""#;

/// Transport seam between the fetcher and the HTTP client, so the crawl
/// engine is testable without a network.
#[async_trait]
pub trait PageFetch: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError>;
}

/// A single page request failure. Timeouts, connection errors and HTTP
/// error statuses are all retried identically.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP status {0}")]
    Status(u16),
}

/// What one source's crawl produced.
#[derive(Debug, Default)]
pub struct FetchResult {
    /// Fetched page bodies, oldest-first walk order.
    pub pages: Vec<String>,
    /// The first page could not be fetched after exhausting retries.
    pub fetch_failed: bool,
    /// No cursor token on the last page; the history is drained.
    pub no_more_pages: bool,
    /// Pages that failed after their full retry budget.
    pub error_count: u32,
}

/// Performs the paginated fetch for one source. Pure with respect to shared
/// state: everything it learns is in the returned [`FetchResult`].
#[derive(Debug, Clone)]
pub struct SourceFetcher {
    base_url: String,
    max_pages: usize,
    retry_attempts: u32,
    cursor_re: Regex,
}

impl SourceFetcher {
    pub fn new(settings: &Settings) -> Self {
        Self {
            base_url: settings.feed_base_url.trim_end_matches('/').to_string(),
            max_pages: settings.max_pages_per_source.max(1),
            retry_attempts: settings.retry_attempts.max(1),
            cursor_re: Regex::new(CURSOR_PATTERN).expect("static regex"),
        }
    }

    /// Fetch up to `max_pages` pages for `source_id`, following the cursor.
    pub async fn fetch(&self, client: &dyn PageFetch, source_id: &str) -> FetchResult {
        let mut result = FetchResult::default();
        let mut url = format!("{}/{}", self.base_url, source_id);

        for _ in 0..self.max_pages {
            let body = match self
                .fetch_with_retry(client, &url, source_id, &mut result.error_count)
                .await
            {
                Some(body) => body,
                None => break,
            };

            let cursor = self
                .cursor_re
                .captures(&body)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string());
            result.pages.push(body);

            match cursor {
                Some(cursor) => {
                    url = format!("{}/{}?before={}", self.base_url, source_id, cursor);
                }
                None => {
                    debug!("No more pages for {}", source_id);
                    result.no_more_pages = true;
                    break;
                }
            }
        }

        if result.pages.is_empty() {
            warn!("Could not fetch any pages for {}", source_id);
            result.fetch_failed = true;
        }
        result
    }

    /// Request one page with exponential backoff. Failed attempts count
    /// toward `errors` for the circuit breaker.
    async fn fetch_with_retry(
        &self,
        client: &dyn PageFetch,
        url: &str,
        source_id: &str,
        errors: &mut u32,
    ) -> Option<String> {
        for attempt in 0..self.retry_attempts {
            match client.fetch_page(url).await {
                Ok(body) => return Some(body),
                Err(e) => {
                    *errors += 1;
                    if attempt + 1 < self.retry_attempts {
                        let delay = backoff_delay(attempt);
                        warn!(
                            "Fetch error for {} (attempt {}/{}): {}. Retrying in {:.2}s",
                            source_id,
                            attempt + 1,
                            self.retry_attempts,
                            e,
                            delay.as_secs_f64()
                        );
                        tokio::time::sleep(delay).await;
                    } else {
                        warn!(
                            "Giving up on {} after {} attempts: {}",
                            source_id, self.retry_attempts, e
                        );
                    }
                }
            }
        }
        None
    }
}

/// `2^attempt` seconds plus uniform jitter in [0, 1).
fn backoff_delay(attempt: u32) -> std::time::Duration {
    let jitter: f64 = rand::thread_rng().gen_range(0.0..1.0);
    std::time::Duration::from_secs_f64(f64::from(2u32.saturating_pow(attempt)) + jitter)
}
