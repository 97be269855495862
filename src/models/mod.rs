// src/models/mod.rs

//! Domain models for the ingestion pipeline.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod document;
pub mod item;
pub mod listing;
mod summary;
mod target;

// Re-export all public types
pub use config::{
    Config, DatabaseConfig, LoggingConfig, MAX_RETRY_ATTEMPTS, ScraperConfig, StorageBackend,
    StorageConfig,
};
pub use document::{
    Document, DocumentInsertResult, EMPTY_BODY_PLACEHOLDER, KindCount, RepositoryStats,
    SearchHit, SubredditCount, duplicate_rate_estimate,
};
pub use item::{RawObject, ScrapedItem, SourceKind, SourcePlatform, UpsertResult, raw_object_key};
pub use listing::{Listing, ListingChild, RawNode};
pub use summary::{ScrapeStats, ScrapeSummary};
pub use target::ScrapeTarget;
