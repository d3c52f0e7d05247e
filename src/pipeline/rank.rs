//! Final ordering and output bounds.

use crate::models::NormalizedProfile;

/// Stable sort by score descending, then clamp the list to the configured
/// output bounds: never fewer than `min_output` when more are available,
/// never more than `max_output`.
pub fn rank(
    mut profiles: Vec<NormalizedProfile>,
    min_output: usize,
    max_output: usize,
) -> Vec<NormalizedProfile> {
    profiles.sort_by(|a, b| b.score.cmp(&a.score));
    let keep = profiles.len().min(max_output).max(min_output);
    profiles.truncate(keep);
    profiles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Protocol;

    fn profile(n: u16, score: i64) -> NormalizedProfile {
        NormalizedProfile {
            uri: format!("ss://u@1.2.3.{n}:{n}#x"),
            protocol: Protocol::Ss,
            host: format!("1.2.3.{n}"),
            port: n,
            score,
            timestamp: None,
            display_name: "x".to_string(),
        }
    }

    #[test]
    fn sorts_by_score_descending_stably() {
        let ranked = rank(
            vec![profile(1, 2), profile(2, 9), profile(3, 2), profile(4, 5)],
            0,
            100,
        );
        let scores: Vec<i64> = ranked.iter().map(|p| p.score).collect();
        assert_eq!(scores, vec![9, 5, 2, 2]);
        // Equal scores preserve input order.
        assert_eq!(ranked[2].port, 1);
        assert_eq!(ranked[3].port, 3);
    }

    #[test]
    fn clamps_to_max_output() {
        let profiles: Vec<_> = (1..=10).map(|n| profile(n, i64::from(n))).collect();
        assert_eq!(rank(profiles, 2, 3).len(), 3);
    }

    #[test]
    fn min_output_never_exceeds_pool() {
        let profiles: Vec<_> = (1..=4).map(|n| profile(n, 1)).collect();
        // min_output larger than the pool: emit everything there is.
        assert_eq!(rank(profiles, 100, 20000).len(), 4);
    }

    #[test]
    fn pool_between_bounds_passes_through() {
        let profiles: Vec<_> = (1..=50).map(|n| profile(n, 1)).collect();
        assert_eq!(rank(profiles, 10, 100).len(), 50);
    }
}
