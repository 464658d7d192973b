//! Year-category discovery (the primary path).
//!
//! Several independently sampled years are queried concurrently, each
//! through a per-year cache that lives as long as the discovery object.
//! Results are concatenated, deduplicated, shuffled and cut to a bounded
//! prefix of candidate titles.

use std::sync::Arc;

use dashmap::DashMap;
use futures_util::future::join_all;
use rand::seq::SliceRandom;
use tracing::{debug, instrument, warn};

use crate::api::{CategoryMember, WikiApi};
use crate::config::FeedConfig;
use crate::merge::deduplicate;

use super::error::DiscoveryError;
use super::sampler::random_year;

/// Per-year film candidate discovery with a session-lifetime cache.
pub struct PrimaryDiscovery {
    api: Arc<dyn WikiApi>,
    cache: DashMap<i32, Vec<CategoryMember>>,
    years_per_fetch: usize,
    category_limit: u32,
    candidate_limit: usize,
}

impl std::fmt::Debug for PrimaryDiscovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimaryDiscovery")
            .field("cached_years", &self.cache.len())
            .field("years_per_fetch", &self.years_per_fetch)
            .finish_non_exhaustive()
    }
}

impl PrimaryDiscovery {
    /// Creates a discovery stage reading through `api`.
    #[must_use]
    pub fn new(api: Arc<dyn WikiApi>, config: &FeedConfig) -> Self {
        Self {
            api,
            cache: DashMap::new(),
            years_per_fetch: config.years_per_fetch.max(1),
            category_limit: config.category_limit,
            candidate_limit: config.candidate_limit,
        }
    }

    /// Number of years whose candidates are cached.
    #[must_use]
    pub fn cached_years(&self) -> usize {
        self.cache.len()
    }

    /// Candidates for one year; empty on any failure.
    ///
    /// Successful responses (including empty ones) are cached; failures are
    /// not, so a later attempt can succeed.
    #[instrument(skip(self))]
    pub async fn candidates_for_year(&self, year: i32) -> Vec<CategoryMember> {
        if let Some(hit) = self.cache.get(&year) {
            debug!(candidates = hit.len(), "year cache hit");
            return hit.value().clone();
        }

        let category = self.api.language().category_for_year(year);
        match self
            .api
            .category_members(&category, self.category_limit)
            .await
        {
            Ok(members) => {
                debug!(%category, candidates = members.len(), "year candidates fetched");
                self.cache.insert(year, members.clone());
                members
            }
            Err(e) => {
                warn!(%category, error = %e, "year candidate query failed");
                Vec::new()
            }
        }
    }

    /// Samples years and returns shuffled candidates.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::NoCandidates`] when every year came back empty.
    pub async fn discover(&self) -> Result<Vec<CategoryMember>, DiscoveryError> {
        let years: Vec<i32> = (0..self.years_per_fetch).map(|_| random_year()).collect();
        self.discover_years(&years).await
    }

    /// Queries `years` concurrently and returns shuffled candidates.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::NoCandidates`] when every year came back empty.
    #[instrument(skip(self))]
    pub async fn discover_years(
        &self,
        years: &[i32],
    ) -> Result<Vec<CategoryMember>, DiscoveryError> {
        let per_year = join_all(years.iter().map(|&year| self.candidates_for_year(year))).await;
        let combined: Vec<CategoryMember> = per_year.into_iter().flatten().collect();

        let mut candidates = deduplicate(&combined);
        if candidates.is_empty() {
            return Err(DiscoveryError::NoCandidates {
                years: years.to_vec(),
            });
        }

        candidates.shuffle(&mut rand::thread_rng());
        candidates.truncate(self.candidate_limit);

        debug!(candidates = candidates.len(), "primary candidates selected");
        Ok(candidates)
    }
}
