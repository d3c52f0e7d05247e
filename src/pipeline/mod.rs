//! Normalization, deduplication, filtering and ranking of raw candidates.

mod filter;
mod normalize;
mod rank;

pub use filter::{dedup_and_filter, FilterStats};
pub use normalize::ProfileNormalizer;
pub use rank::rank;
