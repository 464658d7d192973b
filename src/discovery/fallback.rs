//! Random-sample discovery used when the year path comes back empty.

use std::sync::Arc;

use tracing::{debug, instrument, trace};

use crate::api::WikiApi;
use crate::article::{Article, is_film_related};
use crate::config::FeedConfig;
use crate::merge::deduplicate;

use super::error::DiscoveryError;

/// Samples random pages and keeps the film-related, acceptable ones.
pub struct FallbackDiscovery {
    api: Arc<dyn WikiApi>,
    sample_size: u32,
    limit: usize,
    min_extract_chars: usize,
}

impl std::fmt::Debug for FallbackDiscovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackDiscovery")
            .field("sample_size", &self.sample_size)
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

impl FallbackDiscovery {
    /// Creates a fallback stage reading through `api`.
    #[must_use]
    pub fn new(api: Arc<dyn WikiApi>, config: &FeedConfig) -> Self {
        Self {
            api,
            sample_size: config.fallback_sample_size,
            limit: config.fallback_limit,
            min_extract_chars: config.min_extract_chars,
        }
    }

    /// Requests one random sample and returns at most `limit` articles.
    ///
    /// An empty result is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Api`] when the sample request fails.
    #[instrument(skip(self), fields(sample_size = self.sample_size))]
    pub async fn discover(&self) -> Result<Vec<Article>, DiscoveryError> {
        let variant = self.api.language().variant().map(str::to_string);
        let pages = self.api.random_pages(self.sample_size).await?;
        let sampled = pages.len();

        let accepted: Vec<Article> = pages
            .into_iter()
            .filter(is_film_related)
            .filter_map(|page| {
                let title = page.title.clone();
                Article::from_page(page, variant.as_deref(), self.min_extract_chars)
                    .inspect_err(|reason| trace!(%title, %reason, "fallback page rejected"))
                    .ok()
            })
            .collect();

        let mut articles = deduplicate(&accepted);
        articles.truncate(self.limit);

        debug!(sampled, accepted = articles.len(), "fallback sample filtered");
        Ok(articles)
    }
}
