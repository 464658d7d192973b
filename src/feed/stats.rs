use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters describing what the orchestrator has done this session.
///
/// Updated from the caller's task and from background read-ahead tasks,
/// hence atomics.
#[derive(Debug, Default)]
pub struct FeedStats {
    user_fetches: AtomicUsize,
    skipped: AtomicUsize,
    primary_attempts: AtomicUsize,
    fallback_attempts: AtomicUsize,
    promotions: AtomicUsize,
    read_ahead_fetches: AtomicUsize,
}

impl FeedStats {
    /// Creates a tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// User-initiated fetches that passed the guards.
    #[must_use]
    pub fn user_fetches(&self) -> usize {
        self.user_fetches.load(Ordering::SeqCst)
    }

    /// User-initiated fetches dropped by the cooldown or the loading guard.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped.load(Ordering::SeqCst)
    }

    /// Primary discovery attempts, user-initiated or background.
    #[must_use]
    pub fn primary_attempts(&self) -> usize {
        self.primary_attempts.load(Ordering::SeqCst)
    }

    /// Times the random-sample fallback ran.
    #[must_use]
    pub fn fallback_attempts(&self) -> usize {
        self.fallback_attempts.load(Ordering::SeqCst)
    }

    /// Times the read-ahead buffer was moved into the visible list.
    #[must_use]
    pub fn promotions(&self) -> usize {
        self.promotions.load(Ordering::SeqCst)
    }

    /// Background acquisitions targeting the buffer.
    #[must_use]
    pub fn read_ahead_fetches(&self) -> usize {
        self.read_ahead_fetches.load(Ordering::SeqCst)
    }

    pub(crate) fn record_user_fetch(&self) {
        self.user_fetches.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_primary_attempt(&self) {
        self.primary_attempts.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_fallback_attempt(&self) {
        self.fallback_attempts.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_promotion(&self) {
        self.promotions.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_read_ahead(&self) {
        self.read_ahead_fetches.fetch_add(1, Ordering::SeqCst);
    }
}
