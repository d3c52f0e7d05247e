//! Deduplication, truncation filtering and the freshness window.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::models::{NormalizedProfile, Protocol};

/// Display strings at or below this length cannot be a real profile.
const MIN_PROFILE_LEN: usize = 13;

/// What the filter pass dropped, for the run summary.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FilterStats {
    pub duplicate_endpoints: usize,
    pub duplicate_strings: usize,
    pub truncated: usize,
    pub stale: usize,
}

/// Remove duplicates and structurally suspect candidates, then apply the
/// freshness window.
///
/// Endpoint dedup is deterministic: on a `(host, port, protocol)` collision
/// the higher-scored candidate wins; equal scores keep the first seen.
/// Candidates without a timestamp cannot be judged for freshness and are
/// kept.
pub fn dedup_and_filter(
    profiles: Vec<NormalizedProfile>,
    freshness_days: i64,
    now: DateTime<Utc>,
) -> (Vec<NormalizedProfile>, FilterStats) {
    let mut stats = FilterStats::default();

    // Pass 1: endpoint dedup, highest score wins, first-seen position kept.
    let mut kept: Vec<NormalizedProfile> = Vec::with_capacity(profiles.len());
    let mut by_endpoint: HashMap<(String, u16, Protocol), usize> = HashMap::new();
    for profile in profiles {
        let key = (profile.host.clone(), profile.port, profile.protocol);
        match by_endpoint.get(&key) {
            Some(&idx) => {
                stats.duplicate_endpoints += 1;
                if profile.score > kept[idx].score {
                    kept[idx] = profile;
                }
            }
            None => {
                by_endpoint.insert(key, kept.len());
                kept.push(profile);
            }
        }
    }

    // Pass 2: exact string duplicates and truncated/suspiciously short text.
    let mut seen_uris: HashSet<String> = HashSet::new();
    let mut filtered = Vec::with_capacity(kept.len());
    for profile in kept {
        if profile.uri.len() <= MIN_PROFILE_LEN
            || (profile.uri.contains('\u{2026}') && !profile.uri.contains('#'))
        {
            stats.truncated += 1;
            continue;
        }
        if !seen_uris.insert(profile.uri.clone()) {
            stats.duplicate_strings += 1;
            continue;
        }
        filtered.push(profile);
    }

    // Pass 3: freshness window.
    let max_age = Duration::days(freshness_days);
    let mut fresh = Vec::with_capacity(filtered.len());
    for profile in filtered {
        match profile.timestamp {
            Some(ts) if now.signed_duration_since(ts) > max_age => {
                debug!(
                    "Dropping stale profile from {} ({})",
                    ts,
                    profile.display_name
                );
                stats.stale += 1;
            }
            _ => fresh.push(profile),
        }
    }

    (fresh, stats)
}
