//! Core library for proxyharvest.
//!
//! The crawl engine (`crawl`, `health`) fetches each configured feed with
//! bounded concurrency and maintains a persisted per-source health state
//! machine. The pipeline (`extract`, `pipeline`) turns raw page text into
//! scored, deduplicated, freshness-filtered profiles ready for output.

pub mod cli;
pub mod config;
pub mod crawl;
pub mod enrich;
pub mod extract;
pub mod health;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod scoring;
pub mod stats;
pub mod store;
