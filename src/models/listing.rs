//! Loosely typed upstream listing payloads.
//!
//! Listings are read field by field from `serde_json::Value`. Missing or
//! mistyped fields become `None` instead of failing the whole page, so that
//! upstream schema drift degrades gracefully.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::utils::epoch_seconds_to_datetime;

/// Kind tag of a submission (link) node.
pub const SUBMISSION_KIND: &str = "t3";

/// Kind tag of a comment node.
pub const COMMENT_KIND: &str = "t1";

/// One page of `{data: {after, children: [...]}}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Listing {
    /// Continuation cursor; `None` when absent, null or empty
    pub after: Option<String>,
    pub children: Vec<ListingChild>,
}

impl Listing {
    pub fn from_value(value: &Value) -> Self {
        let data = value.get("data");
        let after = data
            .and_then(|d| d.get("after"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let children = data
            .and_then(|d| d.get("children"))
            .and_then(Value::as_array)
            .map(|items| items.iter().map(ListingChild::from_value).collect())
            .unwrap_or_default();

        Self { after, children }
    }

    /// Comment listing out of a thread response (`[submission, comments]`).
    ///
    /// Returns an empty listing when the response has any other shape.
    pub fn from_thread_response(value: &Value) -> Self {
        match value.as_array() {
            Some(parts) if parts.len() >= 2 => Self::from_value(&parts[1]),
            _ => Self::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// A `{kind, data}` entry of a listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingChild {
    pub kind: String,
    pub data: RawNode,
}

impl ListingChild {
    pub fn from_value(value: &Value) -> Self {
        let kind = value
            .get("kind")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let data = value
            .get("data")
            .and_then(Value::as_object)
            .cloned()
            .map(RawNode)
            .unwrap_or_default();

        Self { kind, data }
    }

    pub fn is_submission(&self) -> bool {
        self.kind == SUBMISSION_KIND
    }

    pub fn is_comment(&self) -> bool {
        self.kind == COMMENT_KIND
    }
}

/// The `data` object of a node, kept verbatim for raw storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawNode(pub Map<String, Value>);

impl RawNode {
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// String field, trimmed; `None` when absent or blank.
    pub fn non_empty_str(&self, key: &str) -> Option<&str> {
        self.str_field(key).map(str::trim).filter(|s| !s.is_empty())
    }

    /// Integer field; floats are truncated.
    pub fn int_field(&self, key: &str) -> Option<i64> {
        let value = self.0.get(key)?;
        value
            .as_i64()
            .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
    }

    pub fn bool_field(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    /// Epoch-seconds field as UTC.
    pub fn timestamp_field(&self, key: &str) -> Option<DateTime<Utc>> {
        self.0
            .get(key)
            .and_then(Value::as_f64)
            .and_then(epoch_seconds_to_datetime)
    }

    pub fn id(&self) -> Option<&str> {
        self.non_empty_str("id")
    }

    pub fn permalink(&self) -> Option<&str> {
        self.non_empty_str("permalink")
    }

    pub fn posted_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp_field("created_utc")
    }

    /// Nested reply listing; `None` for leaves (absent, `""`, or non-object).
    pub fn replies(&self) -> Option<Listing> {
        self.0
            .get("replies")
            .filter(|v| v.is_object())
            .map(Listing::from_value)
    }
}
