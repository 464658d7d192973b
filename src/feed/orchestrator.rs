//! The acquisition state machine.
//!
//! [`FeedOrchestrator`] owns the visible list, the read-ahead buffer and the
//! cooldown timestamp. Every mutation of the two lists goes through
//! [`merge`], so completions arriving in any order never introduce
//! duplicates.
//!
//! ```text
//! Idle ──(cooldown ok)──▶ FetchingPrimary ──(empty / error)──▶ FetchingFallback
//!   ▲                          │                                     │
//!   └──────── Done ◀───────────┴─────────────────────────────────────┘
//! ```
//!
//! Background read-ahead acquisitions target the buffer and skip both the
//! cooldown and the loading guard.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiError, WikiApi};
use crate::article::Article;
use crate::config::FeedConfig;
use crate::discovery::{DetailBatcher, DiscoveryError, FallbackDiscovery, PrimaryDiscovery};
use crate::merge::merge;
use crate::preload::ImagePreloader;

use super::stats::FeedStats;

/// Where the orchestrator currently is in an acquisition.
///
/// With a background read-ahead running next to a user fetch this is the
/// phase most recently entered by either of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionPhase {
    Idle,
    FetchingPrimary,
    FetchingFallback,
    Done,
}

/// Which list an acquisition merges into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchTarget {
    /// The list the reader sees.
    Visible,
    /// The read-ahead buffer.
    ReadAhead,
}

/// What a call to [`FeedOrchestrator::fetch_articles`] or
/// [`FeedOrchestrator::get_more_articles`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Called within the cooldown window; nothing was requested.
    RateLimited {
        /// Time left until the cooldown elapses.
        retry_in: Duration,
    },
    /// A user-initiated fetch is already in flight.
    AlreadyLoading,
    /// New articles were merged into `target`.
    Appended { target: FetchTarget, added: usize },
    /// The buffer was moved into the visible list.
    Promoted { added: usize },
    /// Both paths came back empty, failed, or only produced duplicates.
    NoNewArticles,
}

#[derive(Debug)]
struct FeedState {
    visible: Vec<Article>,
    buffer: Vec<Article>,
    loading: bool,
    phase: AcquisitionPhase,
    last_user_fetch: Option<Instant>,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            visible: Vec::new(),
            buffer: Vec::new(),
            loading: false,
            phase: AcquisitionPhase::Idle,
            last_user_fetch: None,
        }
    }
}

struct Acquired {
    fetched: usize,
    added: usize,
}

/// Clears the loading flag when the user fetch ends, including on drop.
struct LoadingGuard<'a> {
    feed: &'a FeedOrchestrator,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.feed.state().loading = false;
    }
}

/// Coordinates discovery, filtering, merging and scheduling for one session.
///
/// Methods that may schedule background work take `self: &Arc<Self>`.
pub struct FeedOrchestrator {
    primary: PrimaryDiscovery,
    details: DetailBatcher,
    fallback: FallbackDiscovery,
    preloader: ImagePreloader,
    config: FeedConfig,
    state: Mutex<FeedState>,
    read_ahead_pending: AtomicBool,
    stats: FeedStats,
}

impl std::fmt::Debug for FeedOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedOrchestrator")
            .field("state", &self.state)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl FeedOrchestrator {
    /// Creates an orchestrator reading through `api`, with a preloader built
    /// from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if the preloader's HTTP client cannot
    /// be built.
    pub fn new(api: Arc<dyn WikiApi>, config: FeedConfig) -> Result<Self, ApiError> {
        let preloader = ImagePreloader::new(&config)?;
        Ok(Self::with_preloader(api, config, preloader))
    }

    /// Creates an orchestrator with an explicit preloader.
    #[must_use]
    pub fn with_preloader(
        api: Arc<dyn WikiApi>,
        config: FeedConfig,
        preloader: ImagePreloader,
    ) -> Self {
        Self {
            primary: PrimaryDiscovery::new(Arc::clone(&api), &config),
            details: DetailBatcher::new(Arc::clone(&api), &config),
            fallback: FallbackDiscovery::new(api, &config),
            preloader,
            config,
            state: Mutex::new(FeedState::default()),
            read_ahead_pending: AtomicBool::new(false),
            stats: FeedStats::new(),
        }
    }

    fn state(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the visible list.
    #[must_use]
    pub fn articles(&self) -> Vec<Article> {
        self.state().visible.clone()
    }

    /// Number of visible articles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state().visible.len()
    }

    /// Whether the visible list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state().visible.is_empty()
    }

    /// Number of articles waiting in the read-ahead buffer.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.state().buffer.len()
    }

    /// Whether a user-initiated fetch is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    /// Phase most recently entered by any acquisition.
    #[must_use]
    pub fn phase(&self) -> AcquisitionPhase {
        self.state().phase
    }

    /// Whether a background read-ahead is scheduled or running.
    #[must_use]
    pub fn read_ahead_pending(&self) -> bool {
        self.read_ahead_pending.load(Ordering::SeqCst)
    }

    /// Counters for this feed.
    #[must_use]
    pub fn stats(&self) -> &FeedStats {
        &self.stats
    }

    /// Configuration the feed was built with.
    #[must_use]
    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// User-initiated fetch into the visible list.
    ///
    /// A no-op while another user fetch is loading or within the cooldown
    /// window of the previous one. Never fails: errors end as
    /// [`FetchOutcome::NoNewArticles`].
    #[instrument(skip(self))]
    pub async fn fetch_articles(self: &Arc<Self>) -> FetchOutcome {
        {
            let mut state = self.state();
            if state.loading {
                self.stats.record_skipped();
                debug!("fetch skipped, already loading");
                return FetchOutcome::AlreadyLoading;
            }
            let now = Instant::now();
            if let Some(last) = state.last_user_fetch {
                let since = now.duration_since(last);
                if since < self.config.fetch_cooldown {
                    self.stats.record_skipped();
                    let retry_in = self.config.fetch_cooldown - since;
                    debug!(retry_in_ms = retry_in.as_millis(), "fetch skipped, cooling down");
                    return FetchOutcome::RateLimited { retry_in };
                }
            }
            state.loading = true;
            state.last_user_fetch = Some(now);
        }
        let _loading = LoadingGuard { feed: self };
        self.stats.record_user_fetch();

        let acquired = self.acquire(FetchTarget::Visible).await;

        if acquired.fetched > self.config.read_ahead_min_batch {
            self.schedule_read_ahead();
        }

        if acquired.added == 0 {
            FetchOutcome::NoNewArticles
        } else {
            FetchOutcome::Appended {
                target: FetchTarget::Visible,
                added: acquired.added,
            }
        }
    }

    /// Shows the buffer if it has anything, otherwise fetches directly.
    ///
    /// Promotion moves the whole buffer at once and schedules a refill.
    #[instrument(skip(self))]
    pub async fn get_more_articles(self: &Arc<Self>) -> FetchOutcome {
        let promoted = {
            let mut state = self.state();
            if state.buffer.is_empty() {
                None
            } else {
                let buffer = std::mem::take(&mut state.buffer);
                let before = state.visible.len();
                state.visible = merge(&state.visible, &buffer);
                Some(state.visible.len() - before)
            }
        };

        match promoted {
            Some(added) => {
                self.stats.record_promotion();
                info!(added, "read-ahead buffer promoted");
                self.schedule_read_ahead();
                FetchOutcome::Promoted { added }
            }
            None => self.fetch_articles().await,
        }
    }

    /// Starts a background acquisition into the buffer after the read-ahead
    /// delay, unless one is already pending.
    fn schedule_read_ahead(self: &Arc<Self>) {
        if self.read_ahead_pending.swap(true, Ordering::SeqCst) {
            debug!("read-ahead already pending");
            return;
        }

        let feed = Arc::clone(self);
        let delay = self.config.read_ahead_delay;
        debug!(delay_ms = delay.as_millis(), "read-ahead scheduled");
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            feed.stats.record_read_ahead();
            let acquired = feed.acquire(FetchTarget::ReadAhead).await;
            feed.read_ahead_pending.store(false, Ordering::SeqCst);
            debug!(
                fetched = acquired.fetched,
                buffered = acquired.added,
                "read-ahead finished"
            );
        });
    }

    fn set_phase(&self, phase: AcquisitionPhase) {
        self.state().phase = phase;
        debug!(?phase, "phase entered");
    }

    /// One full acquisition: primary, fallback on failure, preload, merge.
    async fn acquire(&self, target: FetchTarget) -> Acquired {
        let batch = match self.run_primary().await {
            Ok(articles) => articles,
            Err(e) => {
                debug!(error = %e, "primary path produced nothing, trying fallback");
                self.run_fallback().await
            }
        };

        self.warm_thumbnails(&batch, target).await;

        let added = {
            let mut state = self.state();
            match target {
                FetchTarget::Visible => {
                    let before = state.visible.len();
                    state.visible = merge(&state.visible, &batch);
                    state.visible.len() - before
                }
                FetchTarget::ReadAhead => {
                    // Articles already on screen never wait in the buffer.
                    let unseen: Vec<Article> = batch
                        .iter()
                        .filter(|a| !state.visible.iter().any(|v| v.id == a.id))
                        .cloned()
                        .collect();
                    let before = state.buffer.len();
                    state.buffer = merge(&state.buffer, &unseen);
                    state.buffer.len() - before
                }
            }
        };

        self.set_phase(AcquisitionPhase::Done);
        if batch.is_empty() {
            warn!(?target, "no articles from either path");
        } else {
            info!(?target, fetched = batch.len(), added, "articles merged");
        }
        self.set_phase(AcquisitionPhase::Idle);

        Acquired {
            fetched: batch.len(),
            added,
        }
    }

    async fn run_primary(&self) -> Result<Vec<Article>, DiscoveryError> {
        self.set_phase(AcquisitionPhase::FetchingPrimary);
        self.stats.record_primary_attempt();

        let candidates = self.primary.discover().await?;
        let titles: Vec<String> = candidates.into_iter().map(|c| c.title).collect();
        let articles = self.details.fetch(&titles).await;
        if articles.is_empty() {
            return Err(DiscoveryError::NoArticles {
                candidates: titles.len(),
            });
        }
        Ok(articles)
    }

    async fn run_fallback(&self) -> Vec<Article> {
        self.set_phase(AcquisitionPhase::FetchingFallback);
        self.stats.record_fallback_attempt();

        match self.fallback.discover().await {
            Ok(articles) => articles,
            Err(e) => {
                warn!(error = %e, "fallback discovery failed");
                Vec::new()
            }
        }
    }

    /// Visible batches wait for their first few thumbnails; read-ahead
    /// batches are warmed in the background.
    async fn warm_thumbnails(&self, batch: &[Article], target: FetchTarget) {
        if !self.preloader.is_enabled() || batch.is_empty() {
            return;
        }
        let urls: Vec<String> = batch
            .iter()
            .filter_map(Article::thumbnail_url)
            .map(str::to_string)
            .collect();

        match target {
            FetchTarget::Visible => {
                let head = &urls[..urls.len().min(self.config.preload_count)];
                let _ = self.preloader.preload_many(head).await;
            }
            FetchTarget::ReadAhead => {
                let preloader = self.preloader.clone();
                tokio::spawn(async move {
                    let _ = preloader.preload_many(&urls).await;
                });
            }
        }
    }
}
