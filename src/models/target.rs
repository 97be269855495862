//! Scrape run input.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// What a single scrape run should ingest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeTarget {
    /// Subreddit name without the `r/` prefix
    pub subreddit: String,

    /// Maximum number of submissions to scan
    pub limit: usize,

    /// Whether to fetch and walk each submission's comment tree
    pub include_comments: bool,

    /// Comment budget per submission
    pub max_comments_per_post: usize,
}

impl ScrapeTarget {
    pub fn new(subreddit: impl Into<String>, limit: usize) -> Self {
        Self {
            subreddit: subreddit.into(),
            limit,
            include_comments: true,
            max_comments_per_post: 100,
        }
    }

    #[must_use]
    pub fn with_comments(mut self, include: bool) -> Self {
        self.include_comments = include;
        self
    }

    #[must_use]
    pub fn with_max_comments(mut self, max_comments_per_post: usize) -> Self {
        self.max_comments_per_post = max_comments_per_post;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let name = self.subreddit.as_str();
        if name.is_empty() {
            return Err(AppError::validation("subreddit name is empty"));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(AppError::validation(format!(
                "subreddit name may only contain letters, digits and underscores: {name}"
            )));
        }
        if self.limit == 0 {
            return Err(AppError::validation("limit must be > 0"));
        }
        if self.max_comments_per_post == 0 {
            return Err(AppError::validation("max_comments_per_post must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_target_defaults() {
        let target = ScrapeTarget::new("scams", 25);
        assert!(target.include_comments);
        assert_eq!(target.max_comments_per_post, 100);
        assert!(target.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_limits() {
        assert!(ScrapeTarget::new("scams", 0).validate().is_err());
        assert!(
            ScrapeTarget::new("scams", 5)
                .with_max_comments(0)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn validate_rejects_prefixed_names() {
        assert!(ScrapeTarget::new("r/scams", 5).validate().is_err());
        assert!(ScrapeTarget::new("  ", 5).validate().is_err());
    }

    #[test]
    fn validate_rejects_path_and_query_characters() {
        for name in ["..", ".", "foo?x", "foo#x", "a b", "sc-ams"] {
            assert!(ScrapeTarget::new(name, 5).validate().is_err(), "{name}");
        }
        assert!(ScrapeTarget::new("Scams_2024", 5).validate().is_ok());
    }
}
