//! Persisted per-source health state machine.
//!
//! Each source carries two independent decay counters: consecutive runs
//! without any profiles ("source is broken") and consecutive runs whose
//! history was fully drained ("source is old/inactive"). Either crossing
//! its threshold removes the source permanently. Repeated exception-level
//! failures within a single run open a circuit that suppresses fetches
//! until a cooldown elapses.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::Settings;
use crate::models::CrawlOutcome;

/// Persisted health record for one source. Missing fields default when
/// loading history written by older versions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceHealth {
    pub consecutive_failures: u32,
    pub consecutive_no_more_pages: u32,
    pub circuit_open_until: Option<DateTime<Utc>>,
}

/// Verdict after folding one run's outcome into a source's record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthDecision {
    Keep,
    /// Terminal: the source is pruned from the active list and history.
    Remove,
}

/// Thresholds driving the state machine, taken from [`Settings`].
#[derive(Debug, Clone, Copy)]
pub struct HealthConfig {
    pub max_failed_checks: u32,
    pub max_no_more_pages: u32,
    pub circuit_breaker_threshold: u32,
    pub circuit_cooldown: Duration,
}

impl From<&Settings> for HealthConfig {
    fn from(s: &Settings) -> Self {
        Self {
            max_failed_checks: s.max_failed_checks,
            max_no_more_pages: s.max_no_more_pages,
            circuit_breaker_threshold: s.circuit_breaker_threshold,
            circuit_cooldown: Duration::hours(s.circuit_cooldown_hours),
        }
    }
}

/// Owns all health records for the duration of a run.
#[derive(Debug)]
pub struct HealthTracker {
    config: HealthConfig,
    records: HashMap<String, SourceHealth>,
}

impl HealthTracker {
    /// Build a tracker over history loaded at run start.
    pub fn new(config: HealthConfig, history: HashMap<String, SourceHealth>) -> Self {
        Self {
            config,
            records: history,
        }
    }

    /// Whether a source's circuit is open at `now`. Open sources are
    /// skipped entirely for the run; once the cooldown has elapsed the
    /// source is eligible again.
    pub fn is_circuit_open(&self, source_id: &str, now: DateTime<Utc>) -> bool {
        self.records
            .get(source_id)
            .and_then(|h| h.circuit_open_until)
            .map(|until| now < until)
            .unwrap_or(false)
    }

    /// Current record for a source, defaulted when unseen.
    pub fn health(&self, source_id: &str) -> SourceHealth {
        self.records.get(source_id).cloned().unwrap_or_default()
    }

    /// Fold one run's outcome into the source's record.
    pub fn apply(
        &mut self,
        source_id: &str,
        outcome: &CrawlOutcome,
        now: DateTime<Utc>,
    ) -> HealthDecision {
        let record = self.records.entry(source_id.to_string()).or_default();
        let mut decision = HealthDecision::Keep;

        if outcome.found_profiles {
            record.consecutive_failures = 0;
            record.consecutive_no_more_pages = 0;
            record.circuit_open_until = None;
        } else {
            record.consecutive_failures += 1;
            if record.consecutive_failures >= self.config.max_failed_checks {
                info!(
                    "Source '{}' removed after {} consecutive runs without profiles",
                    source_id, record.consecutive_failures
                );
                decision = HealthDecision::Remove;
            }
        }

        // Counted independently of the outcome above: a productive run that
        // also drained the source's history still registers the drain.
        if outcome.no_more_pages {
            record.consecutive_no_more_pages += 1;
            if record.consecutive_no_more_pages >= self.config.max_no_more_pages {
                info!(
                    "Source '{}' removed after {} consecutive drained-history runs",
                    source_id, record.consecutive_no_more_pages
                );
                decision = HealthDecision::Remove;
            }
        }

        if outcome.error_count >= self.config.circuit_breaker_threshold {
            let until = now + self.config.circuit_cooldown;
            record.circuit_open_until = Some(until);
            info!(
                "Source '{}' circuit opened until {} ({} hard failures this run)",
                source_id, until, outcome.error_count
            );
        }

        if decision == HealthDecision::Remove {
            self.records.remove(source_id);
        }
        decision
    }

    /// Externalize all records for persistence at run end.
    pub fn into_history(self) -> HashMap<String, SourceHealth> {
        self.records
    }
}
