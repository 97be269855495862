// src/services/reddit.rs

//! Upstream endpoint client: listing pages and comment threads.

use url::Url;

use crate::error::Result;
use crate::models::{Listing, ScraperConfig};
use crate::services::fetcher::ResilientFetcher;

/// Largest page size the listing endpoint honors.
pub const MAX_PAGE_SIZE: usize = 100;

/// Comment thread query parameters.
const THREAD_LIMIT: &str = "500";
const THREAD_DEPTH: &str = "5";

/// Typed access to the listing and thread endpoints.
#[derive(Debug, Clone)]
pub struct RedditClient {
    fetcher: ResilientFetcher,
    base_url: String,
}

impl RedditClient {
    pub fn new(fetcher: ResilientFetcher, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { fetcher, base_url }
    }

    pub fn from_config(config: &ScraperConfig) -> Result<Self> {
        Ok(Self::new(
            ResilientFetcher::from_config(config)?,
            &config.api_base_url,
        ))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/r/<sub>/new.json?limit=<n>[&after=<cursor>]`
    pub fn listing_url(&self, subreddit: &str, limit: usize, after: Option<&str>) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/r/{subreddit}/new.json", self.base_url))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("limit", &limit.clamp(1, MAX_PAGE_SIZE).to_string());
            if let Some(cursor) = after {
                query.append_pair("after", cursor);
            }
        }
        Ok(url)
    }

    /// `{base}<permalink>.json?limit=500&depth=5`
    pub fn thread_url(&self, permalink: &str) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{permalink}.json", self.base_url))?;
        url.query_pairs_mut()
            .append_pair("limit", THREAD_LIMIT)
            .append_pair("depth", THREAD_DEPTH);
        Ok(url)
    }

    /// Fetch one page of newest submissions.
    pub async fn fetch_listing(
        &self,
        subreddit: &str,
        limit: usize,
        after: Option<&str>,
    ) -> Result<Listing> {
        let url = self.listing_url(subreddit, limit, after)?;
        log::debug!("Fetching listing {url}");
        let value = self.fetcher.fetch_json(url.as_str()).await?;
        Ok(Listing::from_value(&value))
    }

    /// Fetch the comment listing of a submission thread.
    pub async fn fetch_thread_comments(&self, permalink: &str) -> Result<Listing> {
        let url = self.thread_url(permalink)?;
        log::debug!("Fetching thread {url}");
        let value = self.fetcher.fetch_json(url.as_str()).await?;
        Ok(Listing::from_thread_response(&value))
    }
}
