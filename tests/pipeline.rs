//! End-to-end pipeline behavior: normalize -> dedup/filter -> rank.

use chrono::{Duration, Utc};
use proxyharvest::models::RawCandidate;
use proxyharvest::pipeline::{dedup_and_filter, rank, ProfileNormalizer};
use proxyharvest::scoring::{score_profile, ScoreWeights};

fn raw(source: &str, uri: &str, days_ago: Option<i64>) -> RawCandidate {
    RawCandidate {
        source_id: source.to_string(),
        uri: uri.to_string(),
        timestamp: days_ago.map(|d| Utc::now() - Duration::days(d)),
        score: score_profile(uri, &ScoreWeights::default()),
    }
}

#[test]
fn duplicate_endpoint_across_sources_yields_one_entry_with_higher_score() {
    // Source "a" publishes a richer variant of the same endpoint that
    // source "b" publishes twice.
    let candidates = vec![
        raw("chan_a", "vless://u@1.2.3.4:443?security=tls&sni=x", Some(0)),
        raw("chan_b", "vless://u@1.2.3.4:443?security=tls", Some(0)),
        raw("chan_b", "vless://u@1.2.3.4:443?security=tls", Some(0)),
    ];
    assert_eq!(candidates[0].score, 5);
    assert_eq!(candidates[1].score, 3);

    let normalizer = ProfileNormalizer::new(&[]);
    let normalized: Vec<_> = candidates
        .iter()
        .filter_map(|c| normalizer.normalize(c))
        .collect();
    let (kept, stats) = dedup_and_filter(normalized, 4, Utc::now());

    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].score, 5);
    assert_eq!(stats.duplicate_endpoints, 2);
}

#[test]
fn stale_profiles_drop_but_undated_survive() {
    let candidates = vec![
        raw("chan_a", "trojan://pw@1.2.3.4:443?security=tls", Some(10)),
        raw("chan_a", "trojan://pw@5.6.7.8:443?security=tls", None),
    ];
    let normalizer = ProfileNormalizer::new(&[]);
    let normalized: Vec<_> = candidates
        .iter()
        .filter_map(|c| normalizer.normalize(c))
        .collect();
    let (kept, stats) = dedup_and_filter(normalized, 4, Utc::now());

    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].host, "5.6.7.8");
    assert_eq!(stats.stale, 1);
}

#[test]
fn output_honors_dedup_invariant_ordering_and_bounds() {
    let mut candidates = Vec::new();
    for i in 0u8..20 {
        // Ten unique endpoints, each appearing twice.
        let host = format!("10.0.0.{}", i % 10);
        let uri = if i < 10 {
            format!("ss://YWJj@{host}:8388")
        } else {
            format!("ss://YWJj@{host}:8388?plugin=x")
        };
        candidates.push(raw("chan_a", &uri, Some(1)));
    }

    let normalizer = ProfileNormalizer::new(&[]);
    let normalized: Vec<_> = candidates
        .iter()
        .filter_map(|c| normalizer.normalize(c))
        .collect();
    let (kept, _) = dedup_and_filter(normalized, 4, Utc::now());
    let ranked = rank(kept, 0, 6);

    assert_eq!(ranked.len(), 6);
    let endpoints: std::collections::HashSet<_> = ranked
        .iter()
        .map(|p| (p.host.clone(), p.port, p.protocol))
        .collect();
    assert_eq!(endpoints.len(), 6, "dedup invariant violated");
    for pair in ranked.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[test]
fn rejects_never_reach_output() {
    let candidates = vec![
        raw("chan_a", "vmess://u@1.2.3.4:443", Some(0)),
        raw("chan_a", "vless://u@nohost", Some(0)),
        raw("chan_a", "hy2://pw@1.2.3.4:443", Some(0)),
    ];
    let normalizer = ProfileNormalizer::new(&[]);
    let normalized: Vec<_> = candidates
        .iter()
        .filter_map(|c| normalizer.normalize(c))
        .collect();
    assert_eq!(normalized.len(), 1);
    assert_eq!(normalized[0].host, "1.2.3.4");
}
