//! Raw-layer scraped item and its object-store envelope.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Upstream platform an item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourcePlatform {
    Reddit,
}

impl SourcePlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourcePlatform::Reddit => "reddit",
        }
    }
}

impl fmt::Display for SourcePlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of ingested unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Submission,
    Comment,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Submission => "submission",
            SourceKind::Comment => "comment",
        }
    }

    /// Upstream "thing" prefix (`t3` for links, `t1` for comments).
    pub fn type_prefix(&self) -> &'static str {
        match self {
            SourceKind::Submission => "t3",
            SourceKind::Comment => "t1",
        }
    }

    /// Globally unique item key, e.g. `reddit:t3_abc123`.
    pub fn item_key(&self, id: &str) -> String {
        format!("{}:{}_{}", SourcePlatform::Reddit, self.type_prefix(), id)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw-layer record keyed by `source_item_key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedItem {
    pub source_item_key: String,
    pub source_url: String,
    pub source_platform: SourcePlatform,
    pub source_kind: SourceKind,
    pub subreddit: String,
    /// Pointer into the object store
    pub raw_object_key: String,
    pub author: Option<String>,
    pub title: Option<String>,
    pub score: Option<i64>,
    pub num_comments: Option<i64>,
    /// Item key of the parent (comments only)
    pub parent_item_key: Option<String>,
    pub posted_at: Option<DateTime<Utc>>,
    pub metadata: Map<String, Value>,
    pub scraped_at: DateTime<Utc>,
}

/// Outcome of an item upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertResult {
    pub id: Uuid,
    /// `true` only when the row was created by this call
    pub inserted: bool,
}

/// Partitioned object key: `reddit/<subreddit>/<yyyy-mm-dd>/<kind>_<id>.json`.
///
/// The date partition comes from `posted_at` (UTC), or `now` when unknown.
pub fn raw_object_key(
    subreddit: &str,
    kind: SourceKind,
    id: &str,
    posted_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> String {
    let date = posted_at.unwrap_or(now).format("%Y-%m-%d");
    format!("{}/{subreddit}/{date}/{kind}_{id}.json", SourcePlatform::Reddit)
}

/// Envelope written verbatim to the object store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawObject<'a> {
    pub kind: SourceKind,
    pub source: SourcePlatform,
    pub subreddit: &'a str,
    /// Parent submission id (comments only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_id: Option<&'a str>,
    pub payload: &'a Map<String, Value>,
    pub scraped_at: DateTime<Utc>,
}
