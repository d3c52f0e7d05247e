//! Data models for proxyharvest.

mod profile;
mod report;

pub use profile::{NormalizedProfile, Protocol, RawCandidate};
pub use report::{CrawlOutcome, SourceReport};
