//! Canonical document layer and its read models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::item::{SourceKind, SourcePlatform};

/// Literal body used when a submission carries no text at all.
pub const EMPTY_BODY_PLACEHOLDER: &str = "[empty]";

/// A deduplicated, search-ready document derived from one scraped item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub source_item_key: String,
    pub scraped_item_id: Uuid,
    pub title: String,
    pub body: String,
    pub source_url: String,
    pub source_platform: SourcePlatform,
    pub source_kind: SourceKind,
    pub subreddit: String,
    /// Dedup key; unique across all documents
    pub content_hash: String,
    pub tags: Vec<String>,
}

/// Outcome of a document insert.
///
/// `inserted == false` with `id == None` means the content was already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentInsertResult {
    pub id: Option<Uuid>,
    pub inserted: bool,
}

impl DocumentInsertResult {
    pub fn inserted(id: Uuid) -> Self {
        Self {
            id: Some(id),
            inserted: true,
        }
    }

    pub fn duplicate() -> Self {
        Self {
            id: None,
            inserted: false,
        }
    }
}

/// A keyword search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub id: Uuid,
    pub source_item_key: String,
    pub title: String,
    pub source_url: String,
    pub subreddit: String,
    pub rank: f64,
    pub snippet: String,
}

/// Aggregate counts across the document store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryStats {
    pub total_documents: i64,
    pub total_scraped_items: i64,
    pub documents_by_kind: Vec<KindCount>,
    pub top_subreddits: Vec<SubredditCount>,
    pub recent_documents_24h: i64,
    pub recent_scraped_items_24h: i64,
    /// `1 - documents / scraped_items`, see [`duplicate_rate_estimate`]
    pub duplicate_rate_estimate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindCount {
    pub kind: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubredditCount {
    pub subreddit: String,
    pub count: i64,
}

/// Share of scraped items that did not yield their own document, rounded to
/// four decimals.
///
/// Items refreshed in place are counted once, so this is an aggregate
/// estimate rather than a per-run duplicate rate.
pub fn duplicate_rate_estimate(total_documents: i64, total_scraped_items: i64) -> f64 {
    if total_scraped_items <= 0 {
        return 0.0;
    }
    let rate = 1.0 - total_documents as f64 / total_scraped_items as f64;
    (rate * 10_000.0).round() / 10_000.0
}
