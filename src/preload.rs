//! Best-effort thumbnail warmup.
//!
//! [`ImagePreloader::preload`] always returns a [`PreloadOutcome`]: a load
//! error, a non-success status or the timeout all come back as
//! `loaded: false`. Nothing here can fail the acquisition flow that calls it.
//!
//! Requests share a semaphore (bounded concurrency) and a per-host
//! [`RateLimiter`], so a large batch does not hammer the image host.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use futures_util::future::join_all;
use reqwest::Client;
use tokio::sync::Semaphore;
use tracing::{debug, instrument, trace};

use crate::api::{ApiError, RateLimiter};
use crate::config::FeedConfig;
use crate::user_agent;

/// Result of one preload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct PreloadOutcome {
    /// The image URL.
    pub url: String,
    /// Whether the full body arrived before the timeout.
    pub loaded: bool,
}

#[derive(Debug, thiserror::Error)]
enum PreloadError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("preload slots closed")]
    SemaphoreClosed,
}

/// Bounded, rate-limited image fetcher with a per-image timeout.
///
/// Cheap to clone; clones share the connection pool, semaphore and limiter.
#[derive(Debug, Clone)]
pub struct ImagePreloader {
    client: Option<Client>,
    semaphore: Arc<Semaphore>,
    rate_limiter: Arc<RateLimiter>,
    timeout: Duration,
}

impl ImagePreloader {
    /// Creates a preloader from the feed settings.
    ///
    /// Returns a disabled preloader when `config.preload_enabled` is false.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if the HTTP client cannot be built.
    pub fn new(config: &FeedConfig) -> Result<Self, ApiError> {
        if !config.preload_enabled {
            return Ok(Self::disabled());
        }

        let client = Client::builder()
            .timeout(config.preload_timeout)
            .user_agent(user_agent::default_image_user_agent())
            .build()
            .map_err(|source| ApiError::ClientBuild { source })?;

        Ok(Self {
            client: Some(client),
            semaphore: Arc::new(Semaphore::new(config.preload_concurrency.max(1))),
            rate_limiter: Arc::new(RateLimiter::new(config.preload_host_delay)),
            timeout: config.preload_timeout,
        })
    }

    /// A preloader that reports every image as not loaded without any I/O.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            client: None,
            semaphore: Arc::new(Semaphore::new(1)),
            rate_limiter: Arc::new(RateLimiter::disabled()),
            timeout: Duration::ZERO,
        }
    }

    /// Whether this preloader performs requests at all.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// Fetches `url` and discards the body. Never fails.
    ///
    /// The timeout covers waiting for a slot as well as the transfer.
    #[instrument(skip(self), fields(timeout_ms = self.timeout.as_millis()))]
    pub async fn preload(&self, url: &str) -> PreloadOutcome {
        let Some(client) = &self.client else {
            return PreloadOutcome {
                url: url.to_string(),
                loaded: false,
            };
        };

        let loaded = match tokio::time::timeout(self.timeout, self.fetch(client, url)).await {
            Ok(Ok(bytes)) => {
                trace!(bytes, "image preloaded");
                true
            }
            Ok(Err(e)) => {
                debug!(error = %e, "image preload failed");
                false
            }
            Err(_) => {
                debug!("image preload timed out");
                false
            }
        };

        PreloadOutcome {
            url: url.to_string(),
            loaded,
        }
    }

    /// Preloads every URL concurrently (still bounded by the semaphore).
    pub async fn preload_many(&self, urls: &[String]) -> Vec<PreloadOutcome> {
        if urls.is_empty() {
            return Vec::new();
        }
        let outcomes = join_all(urls.iter().map(|url| self.preload(url))).await;
        let loaded = outcomes.iter().filter(|o| o.loaded).count();
        debug!(requested = urls.len(), loaded, "preload batch finished");
        outcomes
    }

    async fn fetch(&self, client: &Client, url: &str) -> Result<usize, PreloadError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| PreloadError::SemaphoreClosed)?;
        self.rate_limiter.acquire(url).await;

        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::http_status(url, status.as_u16()).into());
        }

        let mut body = response.bytes_stream();
        let mut bytes = 0usize;
        while let Some(chunk) = body.next().await {
            bytes += chunk.map_err(|e| ApiError::from_reqwest(url, e))?.len();
        }
        Ok(bytes)
    }
}
