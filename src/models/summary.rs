//! Per-run statistics and the run summary returned to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::target::ScrapeTarget;

/// Counters mutated while a run is in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeStats {
    pub scanned_submissions: usize,
    pub scanned_comments: usize,
    pub inserted_items: usize,
    pub updated_items: usize,
    pub inserted_documents: usize,
    pub duplicate_documents: usize,
    pub errors: usize,
}

impl ScrapeStats {
    pub fn record_item(&mut self, inserted: bool) {
        if inserted {
            self.inserted_items += 1;
        } else {
            self.updated_items += 1;
        }
    }

    pub fn record_document(&mut self, inserted: bool) {
        if inserted {
            self.inserted_documents += 1;
        } else {
            self.duplicate_documents += 1;
        }
    }
}

/// Immutable result of one scrape run, serialized as a flat JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeSummary {
    pub subreddit: String,
    pub requested: usize,
    pub include_comments: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: i64,
    #[serde(flatten)]
    pub stats: ScrapeStats,
}

impl ScrapeSummary {
    pub fn new(
        target: &ScrapeTarget,
        stats: ScrapeStats,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        Self {
            subreddit: target.subreddit.clone(),
            requested: target.limit,
            include_comments: target.include_comments,
            started_at,
            finished_at,
            duration_ms: (finished_at - started_at).num_milliseconds(),
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    #[test]
    fn record_helpers_split_counters() {
        let mut stats = ScrapeStats::default();
        stats.record_item(true);
        stats.record_item(false);
        stats.record_item(false);
        stats.record_document(true);
        stats.record_document(false);

        assert_eq!(stats.inserted_items, 1);
        assert_eq!(stats.updated_items, 2);
        assert_eq!(stats.inserted_documents, 1);
        assert_eq!(stats.duplicate_documents, 1);
    }

    #[test]
    fn summary_serializes_flat() {
        let started = Utc.with_ymd_and_hms(2025, 5, 1, 8, 0, 0).unwrap();
        let finished = started + Duration::milliseconds(1_500);
        let stats = ScrapeStats {
            scanned_submissions: 3,
            errors: 1,
            ..ScrapeStats::default()
        };
        let target = ScrapeTarget::new("test", 3).with_comments(false);

        let summary = ScrapeSummary::new(&target, stats, started, finished);
        assert_eq!(summary.duration_ms, 1_500);

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["subreddit"], "test");
        assert_eq!(value["requested"], 3);
        assert_eq!(value["includeComments"], false);
        assert_eq!(value["scannedSubmissions"], 3);
        assert_eq!(value["errors"], 1);
        assert_eq!(value["startedAt"], "2025-05-01T08:00:00Z");
        assert_eq!(value["finishedAt"], "2025-05-01T08:00:01.500Z");
        assert!(value.get("stats").is_none());
    }
}
