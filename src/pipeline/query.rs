// src/pipeline/query.rs

//! Read-side commands over the document repository.

use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::{RepositoryStats, SearchHit};
use crate::storage::DocumentRepository;

/// Search output as printed by the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub query: String,
    pub count: usize,
    pub hits: Vec<SearchHit>,
}

/// Keyword search with an upper bound on results.
pub async fn run_search(
    repository: &dyn DocumentRepository,
    query: &str,
    limit: i64,
) -> Result<SearchReport> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::validation("search query is empty"));
    }
    if limit <= 0 {
        return Err(AppError::validation("search limit must be > 0"));
    }

    let hits = repository.search_by_keyword(query, limit).await?;
    log::info!("Search {query:?}: {} hits", hits.len());

    Ok(SearchReport {
        query: query.to_string(),
        count: hits.len(),
        hits,
    })
}

/// Repository statistics, optionally without the per-subreddit breakdown.
pub async fn run_stats(
    repository: &dyn DocumentRepository,
    include_top_subreddits: bool,
) -> Result<RepositoryStats> {
    let mut stats = repository.stats().await?;
    if !include_top_subreddits {
        stats.top_subreddits.clear();
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::models::{Document, SourceKind, SourcePlatform};
    use crate::storage::InMemoryRepository;
    use crate::utils::content_hash;

    async fn seeded() -> InMemoryRepository {
        let repo = InMemoryRepository::new();
        let body = "they wanted payment in gift cards";
        repo.insert_document(&Document {
            source_item_key: "reddit:t3_a".to_string(),
            scraped_item_id: Uuid::new_v4(),
            title: "Phone scam".to_string(),
            body: body.to_string(),
            source_url: "https://www.reddit.com/r/scams/comments/a/".to_string(),
            source_platform: SourcePlatform::Reddit,
            source_kind: SourceKind::Submission,
            subreddit: "scams".to_string(),
            content_hash: content_hash("Phone scam", body),
            tags: Vec::new(),
        })
        .await
        .unwrap();
        repo
    }

    #[tokio::test]
    async fn search_report_counts_hits() {
        let repo = seeded().await;
        let report = run_search(&repo, "  gift ", 20).await.unwrap();

        assert_eq!(report.query, "gift");
        assert_eq!(report.count, 1);
        assert_eq!(report.hits[0].subreddit, "scams");
    }

    #[tokio::test]
    async fn search_rejects_blank_query_and_bad_limit() {
        let repo = seeded().await;
        assert!(run_search(&repo, "   ", 20).await.is_err());
        assert!(run_search(&repo, "gift", 0).await.is_err());
    }

    #[tokio::test]
    async fn stats_can_drop_subreddit_breakdown() {
        let repo = seeded().await;
        assert_eq!(run_stats(&repo, true).await.unwrap().top_subreddits.len(), 1);
        assert!(run_stats(&repo, false).await.unwrap().top_subreddits.is_empty());
    }
}
