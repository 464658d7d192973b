//! Detail lookup for candidate titles.
//!
//! Titles are split into fixed-size chunks and requested strictly one after
//! another with a short pause in between. A failed chunk is logged and
//! skipped; the remaining chunks still run.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument, trace, warn};

use crate::api::WikiApi;
use crate::article::Article;
use crate::config::FeedConfig;
use crate::merge::deduplicate;

/// Sequential, chunked detail queries with the acceptance filter applied.
pub struct DetailBatcher {
    api: Arc<dyn WikiApi>,
    chunk_size: usize,
    chunk_delay: Duration,
    min_extract_chars: usize,
}

impl std::fmt::Debug for DetailBatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetailBatcher")
            .field("chunk_size", &self.chunk_size)
            .field("chunk_delay", &self.chunk_delay)
            .finish_non_exhaustive()
    }
}

impl DetailBatcher {
    /// Creates a batcher reading through `api`.
    #[must_use]
    pub fn new(api: Arc<dyn WikiApi>, config: &FeedConfig) -> Self {
        Self {
            api,
            chunk_size: config.detail_chunk_size.max(1),
            chunk_delay: config.chunk_delay,
            min_extract_chars: config.min_extract_chars,
        }
    }

    /// Fetches details for `titles` and returns the accepted, deduplicated
    /// articles in response order.
    #[instrument(skip(self, titles), fields(titles = titles.len(), chunk_size = self.chunk_size))]
    pub async fn fetch(&self, titles: &[String]) -> Vec<Article> {
        let variant = self.api.language().variant().map(str::to_string);
        let mut accepted = Vec::new();
        let mut rejected = 0usize;

        for (index, chunk) in titles.chunks(self.chunk_size).enumerate() {
            if index > 0 && !self.chunk_delay.is_zero() {
                tokio::time::sleep(self.chunk_delay).await;
            }

            let pages = match self.api.page_details(chunk).await {
                Ok(pages) => pages,
                Err(e) => {
                    warn!(chunk = index, titles = chunk.len(), error = %e, "detail chunk failed, continuing");
                    continue;
                }
            };

            for page in pages {
                let title = page.title.clone();
                match Article::from_page(page, variant.as_deref(), self.min_extract_chars) {
                    Ok(article) => accepted.push(article),
                    Err(reason) => {
                        rejected += 1;
                        trace!(%title, %reason, "page rejected");
                    }
                }
            }
        }

        let articles = deduplicate(&accepted);
        debug!(accepted = articles.len(), rejected, "detail batch complete");
        articles
    }
}
