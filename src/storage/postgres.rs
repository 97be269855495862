//! Postgres-backed document repository.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::Row;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    DatabaseConfig, Document, DocumentInsertResult, KindCount, RepositoryStats, ScrapedItem,
    SearchHit, SubredditCount, UpsertResult, duplicate_rate_estimate,
};
use crate::storage::DocumentRepository;

/// Idempotent DDL for both tables, their triggers and indexes.
pub const SCHEMA_SQL: &str = include_str!("schema.sql");

const TOP_SUBREDDITS: i64 = 10;

/// Repository over the `scraped_items` and `documents` tables.
#[derive(Debug, Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect eagerly, failing fast when the database is unreachable.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn count(&self, sql: &str) -> Result<i64> {
        let row = sqlx::query(sql).fetch_one(&self.pool).await?;
        Ok(row.try_get("count")?)
    }
}

#[async_trait]
impl DocumentRepository for PostgresRepository {
    async fn ensure_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn upsert_scraped_item(&self, item: &ScrapedItem) -> Result<UpsertResult> {
        let row = sqlx::query(
            r"
            INSERT INTO scraped_items (
                source_item_key, source_url, source_platform, source_kind, subreddit,
                raw_object_key, author, title, score, num_comments,
                parent_item_key, posted_at, metadata, scraped_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (source_item_key) DO UPDATE SET
                source_url = EXCLUDED.source_url,
                raw_object_key = EXCLUDED.raw_object_key,
                author = EXCLUDED.author,
                title = EXCLUDED.title,
                score = EXCLUDED.score,
                num_comments = EXCLUDED.num_comments,
                parent_item_key = EXCLUDED.parent_item_key,
                posted_at = EXCLUDED.posted_at,
                metadata = EXCLUDED.metadata,
                scraped_at = EXCLUDED.scraped_at
            RETURNING id, (xmax = 0) AS inserted
            ",
        )
        .bind(&item.source_item_key)
        .bind(&item.source_url)
        .bind(item.source_platform.as_str())
        .bind(item.source_kind.as_str())
        .bind(&item.subreddit)
        .bind(&item.raw_object_key)
        .bind(&item.author)
        .bind(&item.title)
        .bind(item.score)
        .bind(item.num_comments)
        .bind(&item.parent_item_key)
        .bind(item.posted_at)
        .bind(Json(&item.metadata))
        .bind(item.scraped_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(UpsertResult {
            id: row.try_get("id")?,
            inserted: row.try_get("inserted")?,
        })
    }

    async fn insert_document(&self, document: &Document) -> Result<DocumentInsertResult> {
        let row = sqlx::query(
            r"
            INSERT INTO documents (
                source_item_key, scraped_item_id, title, body, source_url,
                source_platform, source_kind, subreddit, content_hash, tags
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT DO NOTHING
            RETURNING id
            ",
        )
        .bind(&document.source_item_key)
        .bind(document.scraped_item_id)
        .bind(&document.title)
        .bind(&document.body)
        .bind(&document.source_url)
        .bind(document.source_platform.as_str())
        .bind(document.source_kind.as_str())
        .bind(&document.subreddit)
        .bind(&document.content_hash)
        .bind(&document.tags)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let id: Uuid = row.try_get("id")?;
                Ok(DocumentInsertResult::inserted(id))
            }
            None => Ok(DocumentInsertResult::duplicate()),
        }
    }

    async fn search_by_keyword(&self, query: &str, limit: i64) -> Result<Vec<SearchHit>> {
        let rows = sqlx::query(
            r"
            SELECT
                d.id,
                d.source_item_key,
                d.title,
                d.source_url,
                d.subreddit,
                ts_rank_cd(d.search_vector, websearch_to_tsquery('english', $1))::float8 AS rank,
                ts_headline(
                    'english',
                    d.body,
                    websearch_to_tsquery('english', $1),
                    'StartSel=<mark>, StopSel=</mark>, MaxFragments=2, MaxWords=20, MinWords=8'
                ) AS snippet
            FROM documents d
            WHERE d.search_vector @@ websearch_to_tsquery('english', $1)
            ORDER BY rank DESC, d.created_at DESC
            LIMIT $2
            ",
        )
        .bind(query)
        .bind(limit.max(1))
        .fetch_all(&self.pool)
        .await?;

        let mut hits = Vec::with_capacity(rows.len());
        for row in rows {
            hits.push(SearchHit {
                id: row.try_get("id")?,
                source_item_key: row.try_get("source_item_key")?,
                title: row.try_get("title")?,
                source_url: row.try_get("source_url")?,
                subreddit: row.try_get("subreddit")?,
                rank: row.try_get("rank")?,
                snippet: row.try_get("snippet")?,
            });
        }
        Ok(hits)
    }

    async fn stats(&self) -> Result<RepositoryStats> {
        let total_documents = self
            .count("SELECT COUNT(*)::bigint AS count FROM documents")
            .await?;
        let total_scraped_items = self
            .count("SELECT COUNT(*)::bigint AS count FROM scraped_items")
            .await?;
        let recent_documents_24h = self
            .count(
                "SELECT COUNT(*)::bigint AS count FROM documents \
                 WHERE created_at >= NOW() - INTERVAL '24 hours'",
            )
            .await?;
        let recent_scraped_items_24h = self
            .count(
                "SELECT COUNT(*)::bigint AS count FROM scraped_items \
                 WHERE scraped_at >= NOW() - INTERVAL '24 hours'",
            )
            .await?;

        let kind_rows = sqlx::query(
            r"
            SELECT source_kind, COUNT(*)::bigint AS count
            FROM documents
            GROUP BY source_kind
            ORDER BY count DESC, source_kind
            ",
        )
        .fetch_all(&self.pool)
        .await?;
        let mut documents_by_kind = Vec::with_capacity(kind_rows.len());
        for row in kind_rows {
            documents_by_kind.push(KindCount {
                kind: row.try_get("source_kind")?,
                count: row.try_get("count")?,
            });
        }

        let subreddit_rows = sqlx::query(
            r"
            SELECT subreddit, COUNT(*)::bigint AS count
            FROM documents
            GROUP BY subreddit
            ORDER BY count DESC, subreddit
            LIMIT $1
            ",
        )
        .bind(TOP_SUBREDDITS)
        .fetch_all(&self.pool)
        .await?;
        let mut top_subreddits = Vec::with_capacity(subreddit_rows.len());
        for row in subreddit_rows {
            top_subreddits.push(SubredditCount {
                subreddit: row.try_get("subreddit")?,
                count: row.try_get("count")?,
            });
        }

        Ok(RepositoryStats {
            total_documents,
            total_scraped_items,
            documents_by_kind,
            top_subreddits,
            recent_documents_24h,
            recent_scraped_items_24h,
            duplicate_rate_estimate: duplicate_rate_estimate(total_documents, total_scraped_items),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::Map;

    use super::*;
    use crate::models::{SourceKind, SourcePlatform};
    use crate::utils::content_hash;

    #[test]
    fn schema_declares_unique_keys() {
        assert!(SCHEMA_SQL.contains("source_item_key TEXT NOT NULL UNIQUE"));
        assert!(SCHEMA_SQL.contains("content_hash TEXT NOT NULL UNIQUE"));
        assert!(SCHEMA_SQL.contains("USING GIN(search_vector)"));
    }

    async fn test_repository() -> Option<PostgresRepository> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect(&url)
            .await
            .ok()?;
        let repo = PostgresRepository::new(pool);
        repo.ensure_schema().await.ok()?;
        Some(repo)
    }

    fn item(key: &str, score: i64) -> ScrapedItem {
        ScrapedItem {
            source_item_key: key.to_string(),
            source_url: "https://www.reddit.com/r/test/comments/x/".to_string(),
            source_platform: SourcePlatform::Reddit,
            source_kind: SourceKind::Submission,
            subreddit: "test".to_string(),
            raw_object_key: "reddit/test/2025-01-01/submission_x.json".to_string(),
            author: Some("someone".to_string()),
            title: Some("Gift card scam".to_string()),
            score: Some(score),
            num_comments: Some(0),
            parent_item_key: None,
            posted_at: Some(Utc::now()),
            metadata: Map::new(),
            scraped_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn upsert_then_update_existing_item() {
        let Some(repo) = test_repository().await else {
            return;
        };
        let key = format!("reddit:t3_{}", Uuid::new_v4().simple());

        let first = repo.upsert_scraped_item(&item(&key, 1)).await.unwrap();
        assert!(first.inserted);

        let second = repo.upsert_scraped_item(&item(&key, 42)).await.unwrap();
        assert!(!second.inserted);
        assert_eq!(first.id, second.id);

        let row = sqlx::query("SELECT score FROM scraped_items WHERE source_item_key = $1")
            .bind(&key)
            .fetch_one(repo.pool())
            .await
            .unwrap();
        let score: Option<i64> = row.get("score");
        assert_eq!(score, Some(42));
    }

    #[tokio::test]
    async fn duplicate_content_is_not_inserted_twice() {
        let Some(repo) = test_repository().await else {
            return;
        };
        let marker = Uuid::new_v4().simple().to_string();
        let body = format!("send me the gift card codes {marker}");
        let hash = content_hash("Gift card scam", &body);

        let mut ids = Vec::new();
        for n in 0..2 {
            let key = format!("reddit:t3_{marker}_{n}");
            let upserted = repo.upsert_scraped_item(&item(&key, 1)).await.unwrap();
            ids.push((key, upserted.id));
        }

        let doc = |key: &str, id: Uuid| Document {
            source_item_key: key.to_string(),
            scraped_item_id: id,
            title: "Gift card scam".to_string(),
            body: body.clone(),
            source_url: "https://www.reddit.com".to_string(),
            source_platform: SourcePlatform::Reddit,
            source_kind: SourceKind::Submission,
            subreddit: "test".to_string(),
            content_hash: hash.clone(),
            tags: Vec::new(),
        };

        let first = repo.insert_document(&doc(&ids[0].0, ids[0].1)).await.unwrap();
        assert!(first.inserted);
        assert!(first.id.is_some());

        let second = repo.insert_document(&doc(&ids[1].0, ids[1].1)).await.unwrap();
        assert_eq!(second, DocumentInsertResult::duplicate());

        let hits = repo.search_by_keyword(&marker, 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].source_item_key, ids[0].0);
    }
}
