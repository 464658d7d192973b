//! MediaWiki API access.
//!
//! # Architecture
//!
//! - [`WikiApi`] - Async trait the discovery stages query through
//! - [`MediaWikiClient`] - HTTP implementation with fetch-with-retry
//! - [`RetryPolicy`] / [`classify_error`] - Backoff and failure classification
//! - [`RateLimiter`] - Per-host spacing and `Retry-After` bookkeeping
//! - [`ApiError`] - Error taxonomy shared by every network call
//!
//! # Example
//!
//! ```no_run
//! use filmfeed_core::api::{MediaWikiClient, WikiApi};
//! use filmfeed_core::Language;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = MediaWikiClient::new(Language::default())?;
//! let members = client.category_members("Category:1994 films", 20).await?;
//! println!("{} films", members.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
pub mod rate_limiter;
mod retry;
mod types;

pub use client::{DEFAULT_THUMBNAIL_SIZE, MediaWikiClient};
pub use error::ApiError;
pub use rate_limiter::{RateLimiter, extract_host, parse_retry_after};
pub use retry::{DEFAULT_MAX_RETRIES, FailureType, RetryDecision, RetryPolicy, classify_error};
pub use types::{CategoryMember, CategoryRecord, PageRecord, ThumbnailRecord};

use async_trait::async_trait;

use crate::language::Language;

/// Read-only view of one Wikipedia edition.
///
/// Implemented by [`MediaWikiClient`]; tests substitute in-memory fakes.
#[async_trait]
pub trait WikiApi: Send + Sync {
    /// The edition this API reads from.
    fn language(&self) -> &Language;

    /// Pages in `category` (article namespace only), at most `limit`.
    async fn category_members(
        &self,
        category: &str,
        limit: u32,
    ) -> Result<Vec<CategoryMember>, ApiError>;

    /// Extract, thumbnail, canonical URL, variant titles and categories for
    /// `titles` in a single request.
    async fn page_details(&self, titles: &[String]) -> Result<Vec<PageRecord>, ApiError>;

    /// A random sample of `limit` article-namespace pages with the same
    /// properties as [`page_details`](Self::page_details).
    async fn random_pages(&self, limit: u32) -> Result<Vec<PageRecord>, ApiError>;
}
