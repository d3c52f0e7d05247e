//! Bounded-concurrency fan-out over all active sources.
//!
//! One task per source; a semaphore caps how many fetch concurrently.
//! Tasks return their own [`SourceReport`] and never touch shared
//! collections; the single aggregator here merges everything after all
//! tasks complete.

use std::sync::Arc;

use chrono::Utc;
use indicatif::ProgressBar;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use super::fetcher::{PageFetch, SourceFetcher};
use crate::config::Settings;
use crate::extract::ProfileExtractor;
use crate::health::HealthTracker;
use crate::models::{CrawlOutcome, SourceReport};

/// Merged result of one crawl pass.
#[derive(Debug)]
pub struct CrawlRun {
    /// One report per attempted source, completion order.
    pub reports: Vec<SourceReport>,
    /// Sources skipped because their circuit was open.
    pub skipped: Vec<String>,
}

pub struct CrawlScheduler {
    fetcher: SourceFetcher,
    extractor: Arc<ProfileExtractor>,
    concurrency: usize,
}

impl CrawlScheduler {
    pub fn new(settings: &Settings) -> Self {
        Self {
            fetcher: SourceFetcher::new(settings),
            extractor: Arc::new(ProfileExtractor::new(settings.score_weights.clone())),
            concurrency: settings.max_concurrency.max(1),
        }
    }

    /// Crawl every active source and merge the per-task results.
    ///
    /// Sources whose circuit is open at the start of the run are skipped
    /// without a single fetch attempt. Returns once every task finished;
    /// a run never produces partial results early.
    pub async fn run(
        &self,
        client: Arc<dyn PageFetch>,
        sources: &[String],
        tracker: &HealthTracker,
        progress: Option<ProgressBar>,
    ) -> CrawlRun {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let now = Utc::now();
        let mut skipped = Vec::new();
        let mut handles = Vec::new();

        for source in sources {
            if tracker.is_circuit_open(source, now) {
                info!("Skipping '{}' until its circuit cooldown elapses", source);
                skipped.push(source.clone());
                if let Some(pb) = &progress {
                    pb.inc(1);
                }
                continue;
            }

            let semaphore = semaphore.clone();
            let client = client.clone();
            let fetcher = self.fetcher.clone();
            let extractor = self.extractor.clone();
            let source = source.clone();
            let progress = progress.clone();

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore closed");

                let fetched = fetcher.fetch(client.as_ref(), &source).await;
                let candidates = extractor.extract(&fetched.pages, &source);
                let outcome = CrawlOutcome {
                    fetch_failed: fetched.fetch_failed,
                    no_more_pages: fetched.no_more_pages,
                    found_profiles: !candidates.is_empty(),
                    error_count: fetched.error_count,
                };

                if let Some(pb) = &progress {
                    pb.inc(1);
                }
                SourceReport {
                    source_id: source,
                    candidates,
                    outcome,
                }
            }));
        }

        let mut reports = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(report) => reports.push(report),
                Err(e) => warn!("Source task panicked: {}", e),
            }
        }

        CrawlRun { reports, skipped }
    }
}
