// src/lambda/mod.rs

//! AWS Lambda handler for scrape runs.
//!
//! Each invocation:
//! 1. Builds configuration from environment variables
//! 2. Connects to Postgres and the raw bucket
//! 3. Scrapes one subreddit, optionally under a deadline
//! 4. Returns the run summary

use std::time::{Duration, Instant};

use lambda_runtime::{Error as LambdaError, LambdaEvent};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::error::{AppError, Result};
use crate::models::{Config, ScrapeSummary, ScrapeTarget};
use crate::pipeline::{Backends, run_scrape};

const DEFAULT_LIMIT: usize = 100;
const DEFAULT_MAX_COMMENTS: usize = 100;

/// Lambda invocation payload.
#[derive(Debug, Deserialize)]
pub struct ScrapeRequest {
    /// Subreddit name without the r/ prefix
    pub subreddit: String,

    /// Maximum submissions to scan (default 100)
    pub limit: Option<usize>,

    /// Walk comment threads (default true)
    pub include_comments: Option<bool>,

    /// Comment budget per submission (default 100)
    pub max_comments_per_post: Option<usize>,

    /// Abort the run after this many seconds
    pub timeout_secs: Option<u64>,
}

impl ScrapeRequest {
    /// Resolve defaults into a validated target.
    pub fn to_target(&self) -> Result<ScrapeTarget> {
        let target = ScrapeTarget::new(
            self.subreddit.trim(),
            self.limit.unwrap_or(DEFAULT_LIMIT),
        )
        .with_comments(self.include_comments.unwrap_or(true))
        .with_max_comments(self.max_comments_per_post.unwrap_or(DEFAULT_MAX_COMMENTS));
        target.validate()?;
        Ok(target)
    }
}

/// Lambda response payload.
#[derive(Debug, Default, Serialize)]
pub struct ScrapeResponse {
    /// Whether the run completed
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ScrapeSummary>,

    /// Error message if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}

/// Main Lambda handler function.
#[instrument(skip(event))]
pub async fn handler(
    event: LambdaEvent<ScrapeRequest>,
) -> std::result::Result<ScrapeResponse, LambdaError> {
    let start = Instant::now();
    let (request, _context) = event.into_parts();

    info!(
        "Starting scrape: subreddit={}, limit={:?}, timeout_secs={:?}",
        request.subreddit, request.limit, request.timeout_secs
    );

    match run_request(&request).await {
        Ok(summary) => {
            let execution_time_ms = start.elapsed().as_millis() as u64;
            info!(
                "Scrape completed: {} submissions, {} comments, {} errors in {}ms",
                summary.stats.scanned_submissions,
                summary.stats.scanned_comments,
                summary.stats.errors,
                execution_time_ms
            );
            Ok(ScrapeResponse {
                success: true,
                summary: Some(summary),
                error: None,
                execution_time_ms,
            })
        }
        Err(e) => {
            error!("Scrape failed: {}", e);
            Ok(ScrapeResponse {
                success: false,
                error: Some(e.to_string()),
                execution_time_ms: start.elapsed().as_millis() as u64,
                ..Default::default()
            })
        }
    }
}

async fn run_request(request: &ScrapeRequest) -> Result<ScrapeSummary> {
    let target = request.to_target()?;
    let config = load_lambda_config()?;
    let backends = Backends::connect(&config).await?;

    let run = run_scrape(&config, &backends, &target);
    match request.timeout_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), run)
            .await
            .map_err(|_| {
                AppError::scrape(
                    format!("r/{}", target.subreddit),
                    format!("timed out after {secs}s"),
                )
            })?,
        None => run.await,
    }
}

/// Configuration for the Lambda environment: defaults plus env overrides.
fn load_lambda_config() -> Result<Config> {
    let mut config = Config::default();
    config.apply_env();
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrape_request_defaults() {
        let json = r#"{"subreddit": "scams"}"#;
        let req: ScrapeRequest = serde_json::from_str(json).unwrap();
        let target = req.to_target().unwrap();

        assert_eq!(target.subreddit, "scams");
        assert_eq!(target.limit, 100);
        assert!(target.include_comments);
        assert_eq!(target.max_comments_per_post, 100);
        assert!(req.timeout_secs.is_none());
    }

    #[test]
    fn test_scrape_request_with_options() {
        let json = r#"{"subreddit": " test ", "limit": 5, "include_comments": false,
                       "max_comments_per_post": 10, "timeout_secs": 60}"#;
        let req: ScrapeRequest = serde_json::from_str(json).unwrap();
        let target = req.to_target().unwrap();

        assert_eq!(target.subreddit, "test");
        assert_eq!(target.limit, 5);
        assert!(!target.include_comments);
        assert_eq!(target.max_comments_per_post, 10);
        assert_eq!(req.timeout_secs, Some(60));
    }

    #[test]
    fn test_scrape_request_rejects_zero_limit() {
        let req: ScrapeRequest =
            serde_json::from_str(r#"{"subreddit": "scams", "limit": 0}"#).unwrap();
        assert!(req.to_target().is_err());
    }

    #[test]
    fn test_error_response_omits_summary() {
        let response = ScrapeResponse {
            error: Some("boom".to_string()),
            execution_time_ms: 12,
            ..Default::default()
        };
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "boom");
        assert!(value.get("summary").is_none());
    }
}
