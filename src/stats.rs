//! End-of-run statistics summary.

use std::time::Instant;

use console::style;

/// Counters collected across one harvest run.
#[derive(Debug)]
pub struct RunStats {
    started: Instant,
    pub initial_sources: usize,
    pub skipped_sources: usize,
    pub sources_with_profiles: usize,
    pub raw_candidates: usize,
    pub unique_profiles: usize,
    pub written: usize,
    pub removed_sources: usize,
}

impl RunStats {
    pub fn new(initial_sources: usize) -> Self {
        Self {
            started: Instant::now(),
            initial_sources,
            skipped_sources: 0,
            sources_with_profiles: 0,
            raw_candidates: 0,
            unique_profiles: 0,
            written: 0,
            removed_sources: 0,
        }
    }

    /// Print the summary table to stdout.
    pub fn print(&self) {
        let elapsed = self.started.elapsed();
        println!();
        println!("{}", style("Harvest summary").bold());
        println!(
            "  {:<32} {}.{:03}s",
            "Elapsed:",
            elapsed.as_secs(),
            elapsed.subsec_millis()
        );
        println!("  {:<32} {}", "Sources:", self.initial_sources);
        println!(
            "  {:<32} {}",
            "Skipped (circuit open):", self.skipped_sources
        );
        println!(
            "  {:<32} {}",
            "Sources with profiles:", self.sources_with_profiles
        );
        println!("  {:<32} {}", "Raw candidates:", self.raw_candidates);
        println!("  {:<32} {}", "Unique fresh profiles:", self.unique_profiles);
        println!("  {:<32} {}", "Profiles written:", self.written);
        println!("  {:<32} {}", "Sources removed:", self.removed_sources);
    }
}
