//! In-memory [`DocumentRepository`] for tests and dry runs.
//!
//! Enforces the same unique keys as the Postgres schema: one item per
//! `source_item_key`, and documents unique by both `source_item_key` and
//! `content_hash`. Keyword search is naive term counting.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Document, DocumentInsertResult, KindCount, RepositoryStats, ScrapedItem, SearchHit,
    SubredditCount, UpsertResult, duplicate_rate_estimate,
};
use crate::storage::DocumentRepository;

const SNIPPET_CHARS: usize = 160;
const TOP_SUBREDDITS: usize = 10;

struct StoredItem {
    id: Uuid,
    item: ScrapedItem,
}

struct StoredDocument {
    id: Uuid,
    document: Document,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct State {
    items: HashMap<String, StoredItem>,
    documents: Vec<StoredDocument>,
    document_keys: HashSet<String>,
    content_hashes: HashSet<String>,
}

/// Process-local repository; contents vanish with the value.
#[derive(Default)]
pub struct InMemoryRepository {
    state: Mutex<State>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of an item, if present.
    pub async fn item(&self, source_item_key: &str) -> Option<ScrapedItem> {
        let state = self.state.lock().await;
        state.items.get(source_item_key).map(|s| s.item.clone())
    }

    /// Document stored for an item, if any.
    pub async fn document(&self, source_item_key: &str) -> Option<Document> {
        let state = self.state.lock().await;
        state
            .documents
            .iter()
            .find(|d| d.document.source_item_key == source_item_key)
            .map(|d| d.document.clone())
    }

    pub async fn item_count(&self) -> usize {
        self.state.lock().await.items.len()
    }

    pub async fn document_count(&self) -> usize {
        self.state.lock().await.documents.len()
    }
}

fn query_terms(query: &str) -> Vec<String> {
    query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn snippet(body: &str) -> String {
    let mut chars = body.chars();
    let head: String = chars.by_ref().take(SNIPPET_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

#[async_trait]
impl DocumentRepository for InMemoryRepository {
    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    async fn upsert_scraped_item(&self, item: &ScrapedItem) -> Result<UpsertResult> {
        let mut state = self.state.lock().await;
        match state.items.get_mut(&item.source_item_key) {
            Some(stored) => {
                stored.item = item.clone();
                Ok(UpsertResult {
                    id: stored.id,
                    inserted: false,
                })
            }
            None => {
                let id = Uuid::new_v4();
                state.items.insert(
                    item.source_item_key.clone(),
                    StoredItem {
                        id,
                        item: item.clone(),
                    },
                );
                Ok(UpsertResult { id, inserted: true })
            }
        }
    }

    async fn insert_document(&self, document: &Document) -> Result<DocumentInsertResult> {
        let mut state = self.state.lock().await;
        if state.document_keys.contains(&document.source_item_key)
            || state.content_hashes.contains(&document.content_hash)
        {
            return Ok(DocumentInsertResult::duplicate());
        }

        let id = Uuid::new_v4();
        state.document_keys.insert(document.source_item_key.clone());
        state.content_hashes.insert(document.content_hash.clone());
        state.documents.push(StoredDocument {
            id,
            document: document.clone(),
            created_at: Utc::now(),
        });
        Ok(DocumentInsertResult::inserted(id))
    }

    async fn search_by_keyword(&self, query: &str, limit: i64) -> Result<Vec<SearchHit>> {
        let terms = query_terms(query);
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let state = self.state.lock().await;
        let mut scored: Vec<(usize, &StoredDocument)> = state
            .documents
            .iter()
            .filter_map(|stored| {
                let doc = &stored.document;
                let haystack =
                    format!("{} {} {}", doc.title, doc.body, doc.tags.join(" ")).to_lowercase();
                let score: usize = terms.iter().map(|t| haystack.matches(t.as_str()).count()).sum();
                (score > 0).then_some((score, stored))
            })
            .collect();

        scored.sort_by(|(a_score, a), (b_score, b)| {
            b_score
                .cmp(a_score)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        let limit = usize::try_from(limit.max(1)).unwrap_or(usize::MAX);
        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(score, stored)| SearchHit {
                id: stored.id,
                source_item_key: stored.document.source_item_key.clone(),
                title: stored.document.title.clone(),
                source_url: stored.document.source_url.clone(),
                subreddit: stored.document.subreddit.clone(),
                rank: score as f64,
                snippet: snippet(&stored.document.body),
            })
            .collect())
    }

    async fn stats(&self) -> Result<RepositoryStats> {
        let state = self.state.lock().await;
        let since = Utc::now() - Duration::hours(24);

        let mut by_kind: HashMap<&str, i64> = HashMap::new();
        let mut by_subreddit: HashMap<&str, i64> = HashMap::new();
        for stored in &state.documents {
            *by_kind.entry(stored.document.source_kind.as_str()).or_default() += 1;
            *by_subreddit.entry(stored.document.subreddit.as_str()).or_default() += 1;
        }

        let mut documents_by_kind: Vec<KindCount> = by_kind
            .into_iter()
            .map(|(kind, count)| KindCount {
                kind: kind.to_string(),
                count,
            })
            .collect();
        documents_by_kind.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.kind.cmp(&b.kind)));

        let mut top_subreddits: Vec<SubredditCount> = by_subreddit
            .into_iter()
            .map(|(subreddit, count)| SubredditCount {
                subreddit: subreddit.to_string(),
                count,
            })
            .collect();
        top_subreddits.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.subreddit.cmp(&b.subreddit))
        });
        top_subreddits.truncate(TOP_SUBREDDITS);

        let total_documents = state.documents.len() as i64;
        let total_scraped_items = state.items.len() as i64;

        Ok(RepositoryStats {
            total_documents,
            total_scraped_items,
            documents_by_kind,
            top_subreddits,
            recent_documents_24h: state
                .documents
                .iter()
                .filter(|d| d.created_at >= since)
                .count() as i64,
            recent_scraped_items_24h: state
                .items
                .values()
                .filter(|s| s.item.scraped_at >= since)
                .count() as i64,
            duplicate_rate_estimate: duplicate_rate_estimate(total_documents, total_scraped_items),
        })
    }
}
