//! MediaWiki `action=query` client with retry and backoff.
//!
//! [`MediaWikiClient`] is the only place the crate talks to the Wikipedia API.
//! Each request goes through the fetch-with-retry loop: transient failures
//! (timeouts, 5xx, connection errors) and 429s are retried with exponential
//! backoff up to the policy's attempt cap, a 429's `Retry-After` is honoured
//! and recorded in the shared [`RateLimiter`], and everything else fails fast.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::RETRY_AFTER;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};
use url::Url;

use crate::language::Language;
use crate::user_agent;

use super::error::ApiError;
use super::rate_limiter::{RateLimiter, parse_retry_after};
use super::retry::{FailureType, RetryDecision, RetryPolicy, classify_error};
use super::types::{CategoryMember, PageRecord, QueryBody, QueryResponse};
use super::WikiApi;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const READ_TIMEOUT_SECS: u64 = 30;

/// Default `pithumbsize` requested for lead images.
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 800;

/// Page properties requested for both detail and fallback queries.
const PAGE_PROPS: &str = "extracts|pageimages|info|categories";

/// Client for one Wikipedia edition's `api.php`.
///
/// Cheap to clone; the underlying connection pool and rate limiter are shared.
#[derive(Debug, Clone)]
pub struct MediaWikiClient {
    client: Client,
    language: Language,
    endpoint: Url,
    retry_policy: RetryPolicy,
    rate_limiter: Arc<RateLimiter>,
    thumbnail_size: u32,
}

impl MediaWikiClient {
    /// Creates a client for `language` with the default retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if the language endpoint does not
    /// parse, or [`ApiError::ClientBuild`] if the HTTP client cannot be built.
    pub fn new(language: Language) -> Result<Self, ApiError> {
        Self::with_retry_policy(language, RetryPolicy::default())
    }

    /// Creates a client with an explicit retry policy.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    #[instrument(skip_all, fields(language = %language.id, api = %language.api))]
    pub fn with_retry_policy(
        language: Language,
        retry_policy: RetryPolicy,
    ) -> Result<Self, ApiError> {
        let endpoint =
            Url::parse(&language.api).map_err(|_| ApiError::invalid_url(&language.api))?;
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .user_agent(user_agent::default_api_user_agent())
            .gzip(true)
            .build()
            .map_err(|source| ApiError::ClientBuild { source })?;

        debug!(max_attempts = retry_policy.max_attempts(), "created MediaWiki client");

        Ok(Self {
            client,
            language,
            endpoint,
            retry_policy,
            // Zero spacing: only server-mandated Retry-After pauses apply.
            rate_limiter: Arc::new(RateLimiter::new(Duration::ZERO)),
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
        })
    }

    /// Overrides the requested thumbnail width.
    #[must_use]
    pub fn with_thumbnail_size(mut self, thumbnail_size: u32) -> Self {
        self.thumbnail_size = thumbnail_size;
        self
    }

    fn build_url(&self, params: &[(&str, String)]) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("action", "query")
                .append_pair("format", "json")
                .append_pair("formatversion", "2");
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }
        url
    }

    fn page_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("prop", PAGE_PROPS.to_string()),
            ("exintro", "1".to_string()),
            ("explaintext", "1".to_string()),
            ("exlimit", "max".to_string()),
            ("piprop", "thumbnail".to_string()),
            ("pithumbsize", self.thumbnail_size.to_string()),
            ("inprop", "url|varianttitles".to_string()),
            ("cllimit", "max".to_string()),
            ("clshow", "!hidden".to_string()),
        ];
        if let Some(variant) = self.language.variant() {
            params.push(("variant", variant.to_string()));
        }
        params
    }

    /// Runs a query and returns the decoded `query` object.
    async fn query(&self, params: &[(&str, String)]) -> Result<QueryBody, ApiError> {
        let url = self.build_url(params);
        let response: QueryResponse = self.get_json(&url).await?;
        if let Some(error) = response.error {
            return Err(ApiError::upstream(url.as_str(), error.code, error.info));
        }
        Ok(response.query.unwrap_or_default())
    }

    /// GETs `url` with retry and decodes the body as JSON.
    ///
    /// Decode failures are not retried.
    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, ApiError> {
        let body = self.get_with_retry(url).await?;
        serde_json::from_str(&body).map_err(|source| ApiError::decode(url.as_str(), source))
    }

    /// Fetch-with-retry loop.
    #[instrument(skip(self), fields(url = %url))]
    async fn get_with_retry(&self, url: &Url) -> Result<String, ApiError> {
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            self.rate_limiter.acquire(url.as_str()).await;

            match self.get_once(url).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    let failure_type = classify_error(&e);
                    let retry_after_delay = if failure_type == FailureType::RateLimited {
                        self.extract_retry_after_delay(&e, url)
                    } else {
                        None
                    };

                    match self.retry_policy.should_retry(failure_type, attempt) {
                        RetryDecision::Retry {
                            delay: backoff_delay,
                            attempt: next_attempt,
                        } => {
                            let delay = retry_after_delay.unwrap_or(backoff_delay);
                            info!(
                                attempt = next_attempt,
                                max_attempts = self.retry_policy.max_attempts(),
                                delay_ms = delay.as_millis(),
                                using_retry_after = retry_after_delay.is_some(),
                                error = %e,
                                "retrying API request"
                            );
                            tokio::time::sleep(delay).await;
                        }
                        RetryDecision::DoNotRetry { reason } => {
                            debug!(%reason, attempt, "not retrying API request");
                            return Err(e);
                        }
                    }
                }
            }
        }
    }

    async fn get_once(&self, url: &Url) -> Result<String, ApiError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            return Err(ApiError::http_status_with_retry_after(
                url.as_str(),
                status.as_u16(),
                retry_after,
            ));
        }

        response
            .text()
            .await
            .map_err(|e| ApiError::from_reqwest(url.as_str(), e))
    }

    fn extract_retry_after_delay(&self, error: &ApiError, url: &Url) -> Option<Duration> {
        let ApiError::HttpStatus {
            retry_after: Some(header),
            ..
        } = error
        else {
            return None;
        };
        let requested = parse_retry_after(header)?;
        let delay = requested.min(self.retry_policy.max_delay());
        self.rate_limiter.record_rate_limit(url.as_str(), delay);
        debug!(
            retry_after = %header,
            requested_ms = requested.as_millis(),
            delay_ms = delay.as_millis(),
            "using Retry-After header delay"
        );
        Some(delay)
    }
}

#[async_trait]
impl WikiApi for MediaWikiClient {
    fn language(&self) -> &Language {
        &self.language
    }

    #[instrument(skip(self), fields(language = %self.language.id))]
    async fn category_members(
        &self,
        category: &str,
        limit: u32,
    ) -> Result<Vec<CategoryMember>, ApiError> {
        let params = [
            ("list", "categorymembers".to_string()),
            ("cmtitle", category.to_string()),
            ("cmtype", "page".to_string()),
            ("cmnamespace", "0".to_string()),
            ("cmlimit", limit.to_string()),
        ];
        let body = self.query(&params).await?;
        debug!(members = body.categorymembers.len(), "category members fetched");
        Ok(body.categorymembers)
    }

    #[instrument(skip(self, titles), fields(language = %self.language.id, titles = titles.len()))]
    async fn page_details(&self, titles: &[String]) -> Result<Vec<PageRecord>, ApiError> {
        if titles.is_empty() {
            return Ok(Vec::new());
        }
        let mut params = self.page_params();
        params.push(("redirects", "1".to_string()));
        params.push(("titles", titles.join("|")));
        let body = self.query(&params).await?;
        Ok(body.pages.map(super::types::PagesField::into_vec).unwrap_or_default())
    }

    #[instrument(skip(self), fields(language = %self.language.id))]
    async fn random_pages(&self, limit: u32) -> Result<Vec<PageRecord>, ApiError> {
        let mut params = self.page_params();
        params.push(("generator", "random".to_string()));
        params.push(("grnnamespace", "0".to_string()));
        params.push(("grnlimit", limit.to_string()));
        let body = self.query(&params).await?;
        Ok(body.pages.map(super::types::PagesField::into_vec).unwrap_or_default())
    }
}
