//! Pipeline entry points for ingestion operations.
//!
//! - `run_scrape`: Ingest a subreddit into the object store and repository
//! - `run_search`, `run_stats`: Read back what was ingested
//! - `Backends::init`: Bootstrap schema and bucket

mod backends;
pub mod query;
pub mod scrape;

pub use backends::Backends;
pub use query::{SearchReport, run_search, run_stats};
pub use scrape::{Scraper, run_scrape};
