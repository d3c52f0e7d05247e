//! Configuration management for proxyharvest.
//!
//! Settings load from a TOML file; every field has a default so a missing
//! or partial file never blocks a run. There is no ambient global state --
//! the loaded value is passed into each component at construction.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::scoring::ScoreWeights;

/// Default config file path, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "proxyharvest.toml";

/// Immutable run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL each feed handle is appended to.
    pub feed_base_url: String,
    /// Identifying header sent with every request.
    pub user_agent: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Sources are untrusted but not security-sensitive; certificate
    /// verification can be disabled for feeds behind broken TLS.
    pub accept_invalid_certs: bool,
    /// Maximum number of sources fetched simultaneously.
    pub max_concurrency: usize,
    /// Pagination budget per source per run.
    pub max_pages_per_source: usize,
    /// Attempt budget per page before the page counts as failed.
    pub retry_attempts: u32,
    /// Consecutive profile-less runs before a source is removed.
    pub max_failed_checks: u32,
    /// Consecutive drained-history runs before a source is removed.
    pub max_no_more_pages: u32,
    /// Exhausted-retry page failures in one run that open the circuit.
    pub circuit_breaker_threshold: u32,
    /// How long an open circuit suppresses fetches, in hours.
    pub circuit_cooldown_hours: i64,
    /// Maximum age of a timestamped profile eligible for output.
    pub freshness_days: i64,
    /// Output size bounds, clamped against the filtered pool.
    pub min_output: usize,
    pub max_output: usize,
    /// Score weights for profile ranking.
    pub score_weights: ScoreWeights,
    /// Case-insensitive regexes stripped from raw profile text.
    pub cleaning_rules: Vec<String>,
    /// Persisted source list (JSON array of feed handles).
    pub sources_file: PathBuf,
    /// Persisted per-source health history (JSON map).
    pub history_file: PathBuf,
    /// Output file, one profile per line.
    pub output_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            feed_base_url: "https://t.me/s".to_string(),
            user_agent: format!("proxyharvest/{}", env!("CARGO_PKG_VERSION")),
            request_timeout_secs: 30,
            accept_invalid_certs: true,
            max_concurrency: 100,
            max_pages_per_source: 2,
            retry_attempts: 3,
            max_failed_checks: 4,
            max_no_more_pages: 4,
            circuit_breaker_threshold: 3,
            circuit_cooldown_hours: 12,
            freshness_days: 4,
            min_output: 100,
            max_output: 20000,
            score_weights: ScoreWeights::default(),
            cleaning_rules: Vec::new(),
            sources_file: PathBuf::from("sources.json"),
            history_file: PathBuf::from("history.json"),
            output_file: PathBuf::from("profiles.txt"),
        }
    }
}

/// Load settings from `path`, or from the default location when `None`.
///
/// A missing or unreadable file falls back to defaults with a warning;
/// config loading is never fatal to a run.
pub fn load_settings(path: Option<&Path>) -> Settings {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let content = match fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) => {
            warn!(
                "Config file {} not readable ({}), using defaults",
                path.display(),
                e
            );
            return Settings::default();
        }
    };

    match toml::from_str(&content) {
        Ok(settings) => settings,
        Err(e) => {
            warn!(
                "Config file {} failed to parse ({}), using defaults",
                path.display(),
                e
            );
            Settings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_fills_defaults() {
        let settings: Settings =
            toml::from_str("max_concurrency = 8\nfreshness_days = 2").unwrap();
        assert_eq!(settings.max_concurrency, 8);
        assert_eq!(settings.freshness_days, 2);
        assert_eq!(settings.max_failed_checks, 4);
        assert_eq!(settings.feed_base_url, "https://t.me/s");
    }

    #[test]
    fn nested_weights_parse() {
        let settings: Settings =
            toml::from_str("[score_weights]\nsecurity = 5").unwrap();
        assert_eq!(settings.score_weights.security, 5);
        assert_eq!(settings.score_weights.sni, 2);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let settings = load_settings(Some(Path::new("/nonexistent/ph.toml")));
        assert_eq!(settings.max_output, 20000);
    }
}
