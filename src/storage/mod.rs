//! Storage abstractions for raw payloads and canonical documents.
//!
//! Two seams, each with a production and a local backend:
//! - [`ObjectStore`]: raw JSON blobs, keyed by partitioned object key
//!   (`S3ObjectStore`, `LocalObjectStore`)
//! - [`DocumentRepository`]: scraped items and deduplicated documents
//!   (`PostgresRepository`, `InMemoryRepository`)
//!
//! ## Object Layout
//!
//! ```text
//! {bucket}/
//! └── reddit/
//!     └── {subreddit}/
//!         └── YYYY-MM-DD/
//!             ├── submission_{id}.json
//!             └── comment_{id}.json
//! ```

pub mod local;
pub mod memory;
pub mod postgres;
#[cfg(feature = "s3")]
pub mod s3;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::models::{
    Document, DocumentInsertResult, RepositoryStats, ScrapedItem, SearchHit, StorageBackend,
    StorageConfig, UpsertResult,
};

// Re-export for convenience
pub use local::LocalObjectStore;
pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;
#[cfg(feature = "s3")]
pub use s3::S3ObjectStore;

/// Durable key/value blob storage with overwrite semantics.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Make sure the target bucket (or root) exists.
    async fn ensure_bucket(&self) -> Result<()>;

    /// Write `value` as JSON under `key`, replacing any previous object.
    async fn put_json(&self, key: &str, value: &Value) -> Result<()>;
}

/// Idempotent persistence of scraped items and canonical documents.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Create tables, constraints and indexes if missing.
    async fn ensure_schema(&self) -> Result<()>;

    /// Insert or refresh an item by `source_item_key`.
    async fn upsert_scraped_item(&self, item: &ScrapedItem) -> Result<UpsertResult>;

    /// Insert a document; any unique conflict is a silent no-op.
    async fn insert_document(&self, document: &Document) -> Result<DocumentInsertResult>;

    /// Keyword search over documents, best match first.
    async fn search_by_keyword(&self, query: &str, limit: i64) -> Result<Vec<SearchHit>>;

    /// Aggregate counts across both tables.
    async fn stats(&self) -> Result<RepositoryStats>;
}

/// Open the object store selected by `storage.backend`.
pub async fn open_object_store(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>> {
    match config.backend {
        StorageBackend::Local => Ok(Arc::new(LocalObjectStore::from_config(config))),
        #[cfg(feature = "s3")]
        StorageBackend::S3 => Ok(Arc::new(S3ObjectStore::from_config(config).await?)),
        #[cfg(not(feature = "s3"))]
        StorageBackend::S3 => Err(crate::error::AppError::config(
            "storage.backend = \"s3\" requires the `s3` feature",
        )),
    }
}
