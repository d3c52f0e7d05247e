//! Crawl engine: bounded-concurrency, retriable, paginated fetch of each
//! configured source.

mod client;
mod fetcher;
mod scheduler;

pub use client::HttpClient;
pub use fetcher::{FetchError, FetchResult, PageFetch, SourceFetcher};
pub use scheduler::{CrawlRun, CrawlScheduler};
