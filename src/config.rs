//! Tunables of the acquisition pipeline.

use std::time::Duration;

use crate::api::DEFAULT_THUMBNAIL_SIZE;
use crate::article::DEFAULT_MIN_EXTRACT_CHARS;

/// Default number of years queried concurrently per primary attempt.
pub const DEFAULT_YEARS_PER_FETCH: usize = 3;

/// Default user-initiated fetch cooldown.
pub const DEFAULT_FETCH_COOLDOWN: Duration = Duration::from_millis(1000);

/// Default delay before a background read-ahead or refill.
pub const DEFAULT_READ_AHEAD_DELAY: Duration = Duration::from_millis(1000);

/// Settings for discovery, detail batching, fallback, scheduling and preloading.
///
/// `Default` gives the production values; tests shrink the delays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    /// Extract must be strictly longer than this many characters.
    pub min_extract_chars: usize,
    /// Year queries issued concurrently per primary attempt.
    pub years_per_fetch: usize,
    /// `cmlimit` per year query.
    pub category_limit: u32,
    /// Candidates kept after shuffling.
    pub candidate_limit: usize,
    /// Titles per detail request.
    pub detail_chunk_size: usize,
    /// Pause between sequential detail requests.
    pub chunk_delay: Duration,
    /// Size of the random sample requested by the fallback path.
    pub fallback_sample_size: u32,
    /// Maximum articles the fallback path produces.
    pub fallback_limit: usize,
    /// Minimum spacing between user-initiated fetches.
    pub fetch_cooldown: Duration,
    /// Delay before a background read-ahead or refill starts.
    pub read_ahead_delay: Duration,
    /// A visible batch must be larger than this to schedule read-ahead.
    pub read_ahead_min_batch: usize,
    /// Requested thumbnail width.
    pub thumbnail_size: u32,
    /// Whether thumbnails are preloaded at all.
    pub preload_enabled: bool,
    /// Per-image preload timeout.
    pub preload_timeout: Duration,
    /// Thumbnails awaited before a visible batch is merged.
    pub preload_count: usize,
    /// Simultaneous image preloads.
    pub preload_concurrency: usize,
    /// Minimum spacing between image requests to the same host.
    pub preload_host_delay: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            min_extract_chars: DEFAULT_MIN_EXTRACT_CHARS,
            years_per_fetch: DEFAULT_YEARS_PER_FETCH,
            category_limit: 50,
            candidate_limit: 30,
            detail_chunk_size: 20,
            chunk_delay: Duration::from_millis(100),
            fallback_sample_size: 20,
            fallback_limit: 10,
            fetch_cooldown: DEFAULT_FETCH_COOLDOWN,
            read_ahead_delay: DEFAULT_READ_AHEAD_DELAY,
            read_ahead_min_batch: 5,
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
            preload_enabled: true,
            preload_timeout: Duration::from_secs(2),
            preload_count: 3,
            preload_concurrency: 4,
            preload_host_delay: Duration::from_millis(50),
        }
    }
}

impl FeedConfig {
    /// Sets the number of concurrent year queries (at least one).
    #[must_use]
    pub fn with_years_per_fetch(mut self, years: usize) -> Self {
        self.years_per_fetch = years.max(1);
        self
    }

    /// Sets the user-initiated fetch cooldown.
    #[must_use]
    pub fn with_fetch_cooldown(mut self, cooldown: Duration) -> Self {
        self.fetch_cooldown = cooldown;
        self
    }

    /// Sets the read-ahead delay.
    #[must_use]
    pub fn with_read_ahead_delay(mut self, delay: Duration) -> Self {
        self.read_ahead_delay = delay;
        self
    }

    /// Sets the batch size a visible batch must exceed to schedule read-ahead.
    #[must_use]
    pub fn with_read_ahead_min_batch(mut self, min_batch: usize) -> Self {
        self.read_ahead_min_batch = min_batch;
        self
    }

    /// Sets the pause between detail chunks.
    #[must_use]
    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }

    /// Sets the detail chunk size (at least one).
    #[must_use]
    pub fn with_detail_chunk_size(mut self, size: usize) -> Self {
        self.detail_chunk_size = size.max(1);
        self
    }

    /// Enables or disables thumbnail preloading.
    #[must_use]
    pub fn with_preload(mut self, enabled: bool) -> Self {
        self.preload_enabled = enabled;
        self
    }
}
