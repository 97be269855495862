// src/lib.rs

//! reddit-ingest library
//!
//! Paginates subreddit listings, walks comment trees, stores raw payloads in
//! an object store and derives deduplicated documents in Postgres.

pub mod error;
#[cfg(feature = "lambda")]
pub mod lambda;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
