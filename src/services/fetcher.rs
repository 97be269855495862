// src/services/fetcher.rs

//! Single logical JSON GET with classification, retry and throttling.

use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;

use crate::error::Result;
use crate::models::ScraperConfig;
use crate::utils::BackoffPolicy;
use crate::utils::http::{create_async_client, parse_retry_after};

/// Classified upstream failure.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP 429, optionally with a server-provided wait
    #[error("rate limited by {url}")]
    RateLimited {
        url: String,
        retry_after: Option<Duration>,
    },

    /// HTTP 5xx
    #[error("server error {status} from {url}")]
    Server { url: String, status: u16 },

    /// Connect, timeout or body read failure
    #[error("transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Any other non-success status
    #[error("request to {url} failed with status {status}")]
    Request { url: String, status: u16 },

    /// Success status with a body that is not JSON
    #[error("invalid JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Server { .. } | Self::Transport { .. }
        )
    }

    /// Upstream wait hint, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::RateLimited { url, .. }
            | Self::Server { url, .. }
            | Self::Transport { url, .. }
            | Self::Request { url, .. }
            | Self::Decode { url, .. } => url,
        }
    }
}

/// HTTP fetcher that retries transient failures and paces successful calls.
#[derive(Debug, Clone)]
pub struct ResilientFetcher {
    client: Client,
    max_attempts: u32,
    backoff: BackoffPolicy,
    request_delay: Duration,
}

impl ResilientFetcher {
    pub fn new(
        client: Client,
        max_attempts: u32,
        backoff: BackoffPolicy,
        request_delay: Duration,
    ) -> Self {
        Self {
            client,
            max_attempts: max_attempts.max(1),
            backoff,
            request_delay,
        }
    }

    /// Build a fetcher with its own client from scraper settings.
    pub fn from_config(config: &ScraperConfig) -> Result<Self> {
        Ok(Self::new(
            create_async_client(config)?,
            config.max_retry_attempts,
            config.backoff(),
            Duration::from_millis(config.request_delay_ms),
        ))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// GET `url` and decode the body as JSON.
    ///
    /// Retryable failures are retried until the attempt ceiling, after which
    /// the last error is returned. Fatal failures return immediately.
    pub async fn fetch_json(&self, url: &str) -> std::result::Result<Value, FetchError> {
        let mut attempt = 1;

        loop {
            match self.attempt(url).await {
                Ok(value) => {
                    if attempt > 1 {
                        log::info!("Fetched {url} after {attempt} attempts");
                    }
                    if !self.request_delay.is_zero() {
                        tokio::time::sleep(self.request_delay).await;
                    }
                    return Ok(value);
                }
                Err(err) if !err.is_retryable() => {
                    log::warn!("Not retrying {url}: {err}");
                    return Err(err);
                }
                Err(err) if attempt >= self.max_attempts => {
                    log::warn!(
                        "Giving up on {url} after {attempt}/{} attempts: {err}",
                        self.max_attempts
                    );
                    return Err(err);
                }
                Err(err) => {
                    let delay = self.backoff.delay_for(attempt, err.retry_after());
                    log::warn!(
                        "Attempt {attempt}/{} for {url} failed ({err}), retrying in {}ms",
                        self.max_attempts,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn attempt(&self, url: &str) -> std::result::Result<Value, FetchError> {
        let transport = |source: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after);
            return Err(FetchError::RateLimited {
                url: url.to_string(),
                retry_after,
            });
        }
        if status.is_server_error() {
            return Err(FetchError::Server {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Request {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }
}
