// src/pipeline/scrape.rs

//! Subreddit scrape run: paginate, persist, walk comments, summarize.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value, json};

use crate::error::Result;
use crate::models::{
    Config, Document, EMPTY_BODY_PLACEHOLDER, RawNode, RawObject, ScrapeStats, ScrapeSummary,
    ScrapeTarget, ScrapedItem, SourceKind, SourcePlatform, raw_object_key,
};
use crate::pipeline::Backends;
use crate::services::{MAX_PAGE_SIZE, RedditClient, collect_comments};
use crate::storage::{DocumentRepository, ObjectStore};
use crate::utils::content_hash;

/// Public site root used for canonical item URLs.
pub const SITE_URL: &str = "https://www.reddit.com";

/// Comment bodies that mark a comment as gone.
const TOMBSTONE_BODIES: [&str; 2] = ["[deleted]", "[removed]"];

fn canonical_url(permalink: Option<&str>) -> String {
    match permalink {
        Some(path) => format!("{SITE_URL}{path}"),
        None => SITE_URL.to_string(),
    }
}

/// Text that becomes the canonical document for an item.
struct DocumentContent {
    title: String,
    body: String,
    content_hash: String,
}

/// Drives one scrape run against a repository and an object store.
pub struct Scraper {
    reddit: RedditClient,
    repository: Arc<dyn DocumentRepository>,
    store: Arc<dyn ObjectStore>,
}

impl Scraper {
    pub fn new(
        reddit: RedditClient,
        repository: Arc<dyn DocumentRepository>,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            reddit,
            repository,
            store,
        }
    }

    /// Scrape up to `target.limit` newest submissions.
    ///
    /// Per-submission failures are counted and logged; only a failing
    /// listing fetch aborts the run.
    pub async fn scrape(&self, target: &ScrapeTarget) -> Result<ScrapeSummary> {
        target.validate()?;

        let started_at = Utc::now();
        let mut stats = ScrapeStats::default();
        let mut after: Option<String> = None;

        'pages: while stats.scanned_submissions < target.limit {
            let remaining = target.limit - stats.scanned_submissions;
            let page = self
                .reddit
                .fetch_listing(
                    &target.subreddit,
                    remaining.min(MAX_PAGE_SIZE),
                    after.as_deref(),
                )
                .await?;

            if page.is_empty() {
                break;
            }
            log::debug!(
                "r/{}: page with {} children (after={:?})",
                target.subreddit,
                page.children.len(),
                after
            );

            for child in page.children.iter().filter(|c| c.is_submission()) {
                stats.scanned_submissions += 1;

                if let Err(e) = self.process_submission(target, &child.data, &mut stats).await {
                    stats.errors += 1;
                    log::error!(
                        "r/{}: submission {} failed: {}",
                        target.subreddit,
                        child.data.id().unwrap_or("<no id>"),
                        e
                    );
                }

                if stats.scanned_submissions >= target.limit {
                    break 'pages;
                }
            }

            match page.after {
                Some(cursor) => after = Some(cursor),
                None => break,
            }
        }

        Ok(ScrapeSummary::new(target, stats, started_at, Utc::now()))
    }

    async fn process_submission(
        &self,
        target: &ScrapeTarget,
        node: &RawNode,
        stats: &mut ScrapeStats,
    ) -> Result<()> {
        let Some(id) = node.id() else {
            log::debug!("r/{}: submission without id skipped", target.subreddit);
            return Ok(());
        };

        let subreddit = target.subreddit.as_str();
        let permalink = node.permalink();
        let source_url = canonical_url(permalink);
        let title = node.str_field("title").unwrap_or_default().trim();
        let text = [node.str_field("selftext"), node.str_field("url")]
            .into_iter()
            .flatten()
            .map(str::trim)
            .chain([title])
            .find(|text| !text.is_empty());
        let body = text.unwrap_or(EMPTY_BODY_PLACEHOLDER);
        let posted_at = node.posted_at();
        let scraped_at = Utc::now();

        let mut metadata = Map::new();
        metadata.insert("postId".into(), json!(id));
        metadata.insert("permalink".into(), json!(permalink.unwrap_or_default()));
        metadata.insert("isSelf".into(), json!(node.bool_field("is_self")));

        let item = ScrapedItem {
            source_item_key: SourceKind::Submission.item_key(id),
            source_url,
            source_platform: SourcePlatform::Reddit,
            source_kind: SourceKind::Submission,
            subreddit: subreddit.to_string(),
            raw_object_key: raw_object_key(
                subreddit,
                SourceKind::Submission,
                id,
                posted_at,
                scraped_at,
            ),
            author: node.str_field("author").map(str::to_string),
            title: Some(title.to_string()),
            score: node.int_field("score"),
            num_comments: node.int_field("num_comments"),
            parent_item_key: None,
            posted_at,
            metadata,
            scraped_at,
        };
        let raw = RawObject {
            kind: SourceKind::Submission,
            source: SourcePlatform::Reddit,
            subreddit,
            submission_id: None,
            payload: node.as_map(),
            scraped_at,
        };
        let content = DocumentContent {
            title: title.to_string(),
            body: body.to_string(),
            content_hash: content_hash(title, text.unwrap_or_default()),
        };
        self.persist(&item, serde_json::to_value(&raw)?, content, stats)
            .await?;

        if target.include_comments {
            if let Some(permalink) = permalink {
                self.process_comments(target, id, permalink, stats).await?;
            }
        }
        Ok(())
    }

    async fn process_comments(
        &self,
        target: &ScrapeTarget,
        submission_id: &str,
        submission_permalink: &str,
        stats: &mut ScrapeStats,
    ) -> Result<()> {
        let listing = self
            .reddit
            .fetch_thread_comments(submission_permalink)
            .await?;
        let comments = collect_comments(&listing.children, target.max_comments_per_post);
        log::debug!(
            "r/{}: {} comments collected for {}",
            target.subreddit,
            comments.len(),
            submission_id
        );

        for node in &comments {
            self.process_comment(target, submission_id, submission_permalink, node, stats)
                .await?;
        }
        Ok(())
    }

    async fn process_comment(
        &self,
        target: &ScrapeTarget,
        submission_id: &str,
        submission_permalink: &str,
        node: &RawNode,
        stats: &mut ScrapeStats,
    ) -> Result<()> {
        let Some(id) = node.id() else {
            return Ok(());
        };
        let body = node.str_field("body").unwrap_or_default().trim();
        if body.is_empty() || TOMBSTONE_BODIES.contains(&body) {
            return Ok(());
        }

        stats.scanned_comments += 1;

        let subreddit = target.subreddit.as_str();
        let permalink = node.permalink().unwrap_or(submission_permalink);
        let parent_id = node.non_empty_str("parent_id");
        let posted_at = node.posted_at();
        let scraped_at = Utc::now();
        let title = format!("Comment in r/{subreddit}");

        let mut metadata = Map::new();
        metadata.insert("commentId".into(), json!(id));
        metadata.insert("permalink".into(), json!(permalink));
        metadata.insert("parentId".into(), json!(parent_id));
        metadata.insert("linkId".into(), json!(node.non_empty_str("link_id")));

        let item = ScrapedItem {
            source_item_key: SourceKind::Comment.item_key(id),
            source_url: canonical_url(Some(permalink)),
            source_platform: SourcePlatform::Reddit,
            source_kind: SourceKind::Comment,
            subreddit: subreddit.to_string(),
            raw_object_key: raw_object_key(subreddit, SourceKind::Comment, id, posted_at, scraped_at),
            author: node.str_field("author").map(str::to_string),
            title: Some(title.clone()),
            score: node.int_field("score"),
            num_comments: None,
            parent_item_key: parent_id.map(|parent| format!("{}:{parent}", SourcePlatform::Reddit)),
            posted_at,
            metadata,
            scraped_at,
        };
        let raw = RawObject {
            kind: SourceKind::Comment,
            source: SourcePlatform::Reddit,
            subreddit,
            submission_id: Some(submission_id),
            payload: node.as_map(),
            scraped_at,
        };
        let content = DocumentContent {
            content_hash: content_hash(&format!("comment:{id}"), body),
            title,
            body: body.to_string(),
        };
        self.persist(&item, serde_json::to_value(&raw)?, content, stats)
            .await
    }

    /// Raw object write, item upsert, document insert; in that order.
    async fn persist(
        &self,
        item: &ScrapedItem,
        raw: Value,
        content: DocumentContent,
        stats: &mut ScrapeStats,
    ) -> Result<()> {
        self.store.put_json(&item.raw_object_key, &raw).await?;

        let upserted = self.repository.upsert_scraped_item(item).await?;
        stats.record_item(upserted.inserted);

        let document = Document {
            source_item_key: item.source_item_key.clone(),
            scraped_item_id: upserted.id,
            title: content.title,
            body: content.body,
            source_url: item.source_url.clone(),
            source_platform: item.source_platform,
            source_kind: item.source_kind,
            subreddit: item.subreddit.clone(),
            content_hash: content.content_hash,
            tags: Vec::new(),
        };
        let inserted = self.repository.insert_document(&document).await?;
        stats.record_document(inserted.inserted);
        Ok(())
    }
}

/// Run one scrape with backends already opened, logging the outcome.
pub async fn run_scrape(
    config: &Config,
    backends: &Backends,
    target: &ScrapeTarget,
) -> Result<ScrapeSummary> {
    log::info!(
        "Scraping r/{} (limit={}, comments={}, max_comments={})",
        target.subreddit,
        target.limit,
        target.include_comments,
        target.max_comments_per_post
    );

    backends.init().await?;
    let scraper = Scraper::new(
        RedditClient::from_config(&config.scraper)?,
        Arc::clone(&backends.repository),
        Arc::clone(&backends.store),
    );
    let summary = scraper.scrape(target).await?;

    log::info!(
        "r/{} done in {}ms: {} submissions, {} comments, {} new documents, {} duplicates, {} errors",
        summary.subreddit,
        summary.duration_ms,
        summary.stats.scanned_submissions,
        summary.stats.scanned_comments,
        summary.stats.inserted_documents,
        summary.stats.duplicate_documents,
        summary.stats.errors
    );
    if summary.stats.errors > 0 {
        log::warn!(
            "r/{}: {} submissions failed, see errors above",
            summary.subreddit,
            summary.stats.errors
        );
    }
    Ok(summary)
}
