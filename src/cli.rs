//! CLI commands implementation.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

use crate::config::{load_settings, Settings};
use crate::crawl::{CrawlScheduler, HttpClient};
use crate::enrich::{apply_enrichers, Enricher};
use crate::health::{HealthConfig, HealthDecision, HealthTracker};
use crate::output::{FileSink, OutputSink};
use crate::pipeline::{dedup_and_filter, rank, ProfileNormalizer};
use crate::stats::RunStats;
use crate::store;

#[derive(Parser)]
#[command(name = "proxyharvest")]
#[command(about = "Harvests proxy connection profiles from public message feeds")]
#[command(version)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full harvest: crawl, filter, rank, write output
    Harvest {
        /// Source list file (overrides config)
        #[arg(long)]
        sources: Option<PathBuf>,
        /// Output file (overrides config)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Cap the number of profiles written (overrides config)
        #[arg(short, long)]
        limit: Option<usize>,
        /// Maximum sources fetched concurrently (overrides config)
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Manage harvest sources
    Sources {
        #[command(subcommand)]
        command: SourceCommands,
    },
}

#[derive(Subcommand)]
enum SourceCommands {
    /// List active sources with their health counters
    List,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref());

    match cli.command {
        Commands::Harvest {
            sources,
            output,
            limit,
            concurrency,
        } => {
            if let Some(path) = sources {
                settings.sources_file = path;
            }
            if let Some(path) = output {
                settings.output_file = path;
            }
            if let Some(limit) = limit {
                settings.max_output = limit;
                settings.min_output = settings.min_output.min(limit);
            }
            if let Some(concurrency) = concurrency {
                settings.max_concurrency = concurrency;
            }
            harvest(settings).await
        }
        Commands::Sources {
            command: SourceCommands::List,
        } => list_sources(&settings),
    }
}

/// Full harvest run: crawl all active sources, reduce the raw harvest to a
/// ranked output list, and persist updated source/health state.
async fn harvest(settings: Settings) -> anyhow::Result<()> {
    // Without a source list there is nothing to do; this is the only
    // fatal load in the run.
    let sources = store::load_sources(&settings.sources_file)
        .context("cannot run without a source list")?;
    let history = store::load_history(&settings.history_file);
    let mut tracker = HealthTracker::new(HealthConfig::from(&settings), history);
    let mut stats = RunStats::new(sources.len());

    println!(
        "{} Crawling {} sources ({} concurrent)",
        style("→").cyan(),
        sources.len(),
        settings.max_concurrency
    );
    let pb = ProgressBar::new(sources.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let client = Arc::new(HttpClient::new(&settings)?);
    let scheduler = CrawlScheduler::new(&settings);
    let run = scheduler
        .run(client, &sources, &tracker, Some(pb.clone()))
        .await;
    pb.finish_and_clear();
    stats.skipped_sources = run.skipped.len();

    // Fold per-task reports into the health machine and one candidate list.
    let now = Utc::now();
    let mut removed: Vec<String> = Vec::new();
    let mut candidates = Vec::new();
    for report in run.reports {
        if report.outcome.found_profiles {
            stats.sources_with_profiles += 1;
        }
        if tracker.apply(&report.source_id, &report.outcome, now) == HealthDecision::Remove {
            removed.push(report.source_id);
        }
        candidates.extend(report.candidates);
    }
    stats.raw_candidates = candidates.len();

    let normalizer = ProfileNormalizer::new(&settings.cleaning_rules);
    let normalized: Vec<_> = candidates
        .iter()
        .filter_map(|c| normalizer.normalize(c))
        .collect();
    let (fresh, filter_stats) = dedup_and_filter(normalized, settings.freshness_days, now);
    stats.unique_profiles = fresh.len();
    info!(
        "Filter pass dropped {} duplicate endpoints, {} duplicate strings, {} truncated, {} stale",
        filter_stats.duplicate_endpoints,
        filter_stats.duplicate_strings,
        filter_stats.truncated,
        filter_stats.stale
    );

    let ranked = rank(fresh, settings.min_output, settings.max_output);

    // Seam for GeoIP / latency decoration; nothing is wired in by default.
    let enrichers: Vec<Box<dyn Enricher>> = Vec::new();
    let enriched = apply_enrichers(&enrichers, ranked).await;

    let lines: Vec<String> = enriched.iter().map(|p| p.uri.clone()).collect();
    stats.written = lines.len();
    FileSink::new(&settings.output_file).write_lines(&lines)?;

    // A failed state save is reported but never fails the run; the next
    // run re-derives from defaults.
    stats.removed_sources = removed.len();
    if !removed.is_empty() {
        let remaining: Vec<String> = sources
            .iter()
            .filter(|s| !removed.contains(s))
            .cloned()
            .collect();
        match store::save_sources(&settings.sources_file, &remaining) {
            Ok(()) => info!(
                "Pruned {} sources from the active list",
                removed.len()
            ),
            Err(e) => error!("Could not persist source list: {e:#}"),
        }
    }
    if let Err(e) = store::save_history(&settings.history_file, &tracker.into_history()) {
        error!("Could not persist health history: {e:#}");
    }

    stats.print();
    println!("{} Harvest complete", style("✓").green());
    Ok(())
}

/// Print the active source list with persisted health counters.
fn list_sources(settings: &Settings) -> anyhow::Result<()> {
    let sources = store::load_sources(&settings.sources_file)?;
    let history = store::load_history(&settings.history_file);

    println!("{} active sources", sources.len());
    for source in &sources {
        let health = history.get(source).cloned().unwrap_or_default();
        let circuit = match health.circuit_open_until {
            Some(until) if Utc::now() < until => format!("circuit open until {until}"),
            _ => String::new(),
        };
        println!(
            "  {:<28} failed checks {:>2}  drained runs {:>2}  {}",
            source, health.consecutive_failures, health.consecutive_no_more_pages, circuit
        );
    }
    Ok(())
}
