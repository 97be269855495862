//! Service layer for the ingestion pipeline.
//!
//! This module contains the upstream-facing logic:
//! - Resilient JSON fetching (`ResilientFetcher`)
//! - Listing and thread endpoints (`RedditClient`)
//! - Comment tree flattening (`collect_comments`)

mod comments;
pub mod fetcher;
pub mod reddit;

pub use comments::collect_comments;
pub use fetcher::{FetchError, ResilientFetcher};
pub use reddit::{MAX_PAGE_SIZE, RedditClient};
