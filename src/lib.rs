//! shelfscrape - crawls an online book catalog into per-category CSV datasets
//! and aggregates price statistics over them.
//!
//! This library provides:
//! - Category discovery and paginated crawling over a shared HTTP client
//! - Product page extraction and cover image download
//! - Append-only CSV datasets, one per category
//! - Per-category aggregation and report/chart exports

pub mod config;
pub mod core;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod scraper;
pub mod storage;
pub mod utils;

#[cfg(test)]
mod test_support;

// Re-export main types for convenience
pub use crate::config::AppConfig;
pub use crate::core::ShelfScrape;
pub use crate::error::{ScrapeError, ScrapeResult};
pub use crate::models::{CategoryStats, CategoryStatsMap, Price, ProductRecord, Rating};
