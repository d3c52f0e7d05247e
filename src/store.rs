//! JSON persistence for the source list and health history.
//!
//! Writes are atomic: serialize into a temp file in the target directory,
//! keep a `.bak` of the previous contents, then rename over the original.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, warn};

use crate::health::SourceHealth;

/// Minimum length of a usable feed handle.
const MIN_SOURCE_LEN: usize = 5;

/// Load the operator-supplied source list.
///
/// Fatal when the file cannot be read or parsed: a run cannot proceed
/// without a source list. Handles are deduplicated preserving order and
/// too-short entries are dropped.
pub fn load_sources(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading source list from {}", path.display()))?;
    let raw: Vec<String> = serde_json::from_str(&content)
        .with_context(|| format!("parsing source list {}", path.display()))?;

    let mut seen = HashSet::new();
    let sources: Vec<String> = raw
        .into_iter()
        .filter(|s| s.len() >= MIN_SOURCE_LEN)
        .filter(|s| seen.insert(s.clone()))
        .collect();
    debug!("Loaded {} sources from {}", sources.len(), path.display());
    Ok(sources)
}

/// Persist the (possibly pruned) source list.
pub fn save_sources(path: &Path, sources: &[String]) -> Result<()> {
    write_json_atomic(path, &sources)
}

/// Load per-source health history.
///
/// A missing or corrupt history file is recovered by starting from an
/// empty state; consecutive-failure semantics simply restart.
pub fn load_history(path: &Path) -> HashMap<String, SourceHealth> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!(
                "History file {} not readable ({}), starting empty",
                path.display(),
                e
            );
            return HashMap::new();
        }
    };
    match serde_json::from_str(&content) {
        Ok(history) => history,
        Err(e) => {
            warn!(
                "History file {} failed to parse ({}), starting empty",
                path.display(),
                e
            );
            HashMap::new()
        }
    }
}

/// Persist health history at run end.
pub fn save_history(path: &Path, history: &HashMap<String, SourceHealth>) -> Result<()> {
    write_json_atomic(path, history)
}

/// Atomically replace `path` with the JSON serialization of `value`.
fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if path.exists() {
        let backup = path.with_extension("bak");
        if let Err(e) = fs::copy(path, &backup) {
            warn!("Could not back up {}: {}", path.display(), e);
        }
    }

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let tmp = match dir {
        Some(dir) => tempfile::NamedTempFile::new_in(dir),
        None => tempfile::NamedTempFile::new_in("."),
    }
    .with_context(|| format!("creating temp file next to {}", path.display()))?;

    serde_json::to_writer_pretty(&tmp, value)
        .with_context(|| format!("serializing {}", path.display()))?;
    tmp.persist(path)
        .with_context(|| format!("replacing {}", path.display()))?;
    debug!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_roundtrip_with_filtering() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sources.json");
        fs::write(
            &path,
            r#"["channel_one", "abc", "channel_two", "channel_one"]"#,
        )
        .unwrap();

        let sources = load_sources(&path).unwrap();
        assert_eq!(sources, vec!["channel_one", "channel_two"]);

        save_sources(&path, &sources).unwrap();
        assert_eq!(load_sources(&path).unwrap(), sources);
        assert!(path.with_extension("bak").exists());
    }

    #[test]
    fn missing_source_list_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_sources(&dir.path().join("nope.json")).is_err());
    }

    #[test]
    fn corrupt_history_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{not json").unwrap();
        assert!(load_history(&path).is_empty());
    }

    #[test]
    fn history_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        let mut history = HashMap::new();
        history.insert(
            "chan_abc".to_string(),
            SourceHealth {
                consecutive_failures: 2,
                consecutive_no_more_pages: 1,
                circuit_open_until: None,
            },
        );
        save_history(&path, &history).unwrap();
        assert_eq!(load_history(&path), history);
    }
}
