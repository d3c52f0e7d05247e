//! Post-ranking enrichment plugins.
//!
//! Enrichers run after deduplication, freshness filtering and ranking have
//! all settled; they may decorate a profile (GeoIP country tag, measured
//! latency in the display name) but never revisit those decisions.

use async_trait::async_trait;

use crate::models::NormalizedProfile;

/// A pluggable post-processing step applied to each output profile.
#[async_trait]
pub trait Enricher: Send + Sync {
    async fn enrich(&self, profile: NormalizedProfile) -> NormalizedProfile;
    fn name(&self) -> &'static str;
}

/// Run every enricher over every profile, in order.
pub async fn apply_enrichers(
    enrichers: &[Box<dyn Enricher>],
    profiles: Vec<NormalizedProfile>,
) -> Vec<NormalizedProfile> {
    if enrichers.is_empty() {
        return profiles;
    }
    let mut out = Vec::with_capacity(profiles.len());
    for mut profile in profiles {
        for enricher in enrichers {
            profile = enricher.enrich(profile).await;
        }
        out.push(profile);
    }
    out
}
