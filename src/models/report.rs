//! Per-source crawl results handed back to the aggregator.

use super::RawCandidate;

/// Signals fed into the health state machine after a source's crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlOutcome {
    /// The first page could not be fetched after exhausting retries.
    pub fetch_failed: bool,
    /// No pagination cursor was found; the source's history is drained.
    pub no_more_pages: bool,
    /// At least one candidate was extracted this run.
    pub found_profiles: bool,
    /// Pages that failed after exhausting their retry budget.
    pub error_count: u32,
}

/// Everything one source task produces. Tasks never touch shared state;
/// the scheduler merges these after all tasks complete.
#[derive(Debug, Clone)]
pub struct SourceReport {
    pub source_id: String,
    pub candidates: Vec<RawCandidate>,
    pub outcome: CrawlOutcome,
}
