//! Per-host request spacing.
//!
//! [`RateLimiter`] enforces a minimum delay between requests to the same host
//! and honours server-mandated pauses recorded from `Retry-After` headers.
//! Requests to different hosts never wait on each other, so thumbnail
//! preloads from `upload.wikimedia.org` do not slow down API queries.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use filmfeed_core::api::RateLimiter;
//!
//! # async fn example() {
//! let limiter = Arc::new(RateLimiter::new(Duration::from_millis(50)));
//!
//! // First request proceeds immediately
//! limiter.acquire("https://upload.wikimedia.org/a.jpg").await;
//!
//! // Second request to same host waits for the delay
//! limiter.acquire("https://upload.wikimedia.org/b.jpg").await;
//!
//! // Request to a different host proceeds immediately
//! limiter.acquire("https://en.wikipedia.org/w/api.php").await;
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

/// Warning threshold for cumulative delay per host.
const CUMULATIVE_DELAY_WARNING_THRESHOLD: Duration = Duration::from_secs(30);

/// Maximum Retry-After value honoured.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(120);

/// Per-host rate limiter, shared behind `Arc`.
#[derive(Debug)]
pub struct RateLimiter {
    /// Minimum delay between requests to the same host.
    default_delay: Duration,

    /// Whether rate limiting is disabled entirely.
    disabled: bool,

    /// Per-host state. Values are `Arc`ed so the map shard lock is released
    /// before awaiting on the inner mutex.
    hosts: DashMap<String, Arc<HostState>>,
}

#[derive(Debug)]
struct HostState {
    /// Time of the last request; `None` until the first one.
    last_request: Mutex<Option<Instant>>,

    /// Earliest instant the next request may start, set by `Retry-After`.
    blocked_until: std::sync::Mutex<Option<Instant>>,

    cumulative_delay_ms: AtomicU64,
}

impl HostState {
    fn new() -> Self {
        Self {
            last_request: Mutex::new(None),
            blocked_until: std::sync::Mutex::new(None),
            cumulative_delay_ms: AtomicU64::new(0),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn add_cumulative_delay(&self, delay: Duration) -> Duration {
        let delay_ms = delay.as_millis() as u64;
        let new_total = self
            .cumulative_delay_ms
            .fetch_add(delay_ms, Ordering::SeqCst)
            + delay_ms;
        Duration::from_millis(new_total)
    }

    fn blocked_until(&self) -> Option<Instant> {
        self.blocked_until
            .lock()
            .map(|guard| *guard)
            .unwrap_or_else(|poisoned| *poisoned.into_inner())
    }

    fn block_until(&self, until: Instant) {
        let mut guard = self
            .blocked_until
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if guard.is_none_or(|current| current < until) {
            *guard = Some(until);
        }
    }
}

impl RateLimiter {
    /// Creates a rate limiter with the given per-host spacing.
    ///
    /// A zero delay still honours recorded `Retry-After` pauses.
    #[must_use]
    #[instrument(skip_all, fields(delay_ms = default_delay.as_millis()))]
    pub fn new(default_delay: Duration) -> Self {
        debug!("creating rate limiter");
        Self {
            default_delay,
            disabled: false,
            hosts: DashMap::new(),
        }
    }

    /// Creates a rate limiter that never waits.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            default_delay: Duration::ZERO,
            disabled: true,
            hosts: DashMap::new(),
        }
    }

    fn host_state(&self, host: &str) -> Arc<HostState> {
        self.hosts
            .entry(host.to_string())
            .or_insert_with(|| Arc::new(HostState::new()))
            .clone()
    }

    /// Waits until a request to `url`'s host is allowed, then records it.
    ///
    /// The first request to any host proceeds immediately unless a
    /// `Retry-After` pause is pending for it.
    #[instrument(skip(self), fields(host))]
    pub async fn acquire(&self, url: &str) {
        if self.disabled {
            return;
        }

        let host = extract_host(url);
        tracing::Span::current().record("host", host.as_str());

        let state = self.host_state(&host);
        let mut last_request_guard = state.last_request.lock().await;

        let now = Instant::now();
        let spacing_ready = last_request_guard.map(|last| last + self.default_delay);
        let ready_at = match (spacing_ready, state.blocked_until()) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };

        if let Some(ready_at) = ready_at
            && ready_at > now
        {
            let delay = ready_at - now;
            let cumulative = state.add_cumulative_delay(delay);

            debug!(
                host = %host,
                delay_ms = delay.as_millis(),
                cumulative_ms = cumulative.as_millis(),
                "applying rate limit delay"
            );

            if cumulative >= CUMULATIVE_DELAY_WARNING_THRESHOLD {
                warn!(
                    host = %host,
                    cumulative_delay_secs = cumulative.as_secs(),
                    "excessive rate limiting - consider reducing request volume to this host"
                );
            }

            tokio::time::sleep(delay).await;
        }

        *last_request_guard = Some(Instant::now());
    }

    /// Records a server-mandated pause for `url`'s host.
    ///
    /// The next [`acquire`](Self::acquire) for that host waits at least `delay`
    /// from now.
    #[instrument(skip(self), fields(host))]
    pub fn record_rate_limit(&self, url: &str, delay: Duration) {
        let host = extract_host(url);
        tracing::Span::current().record("host", host.as_str());

        let state = self.host_state(&host);
        state.block_until(Instant::now() + delay);

        debug!(
            host = %host,
            delay_ms = delay.as_millis(),
            "recorded server rate limit"
        );
    }
}

/// Extracts the lowercase host from a URL.
///
/// Returns "unknown" for malformed URLs so they still share one bucket.
///
/// ```
/// use filmfeed_core::api::extract_host;
///
/// assert_eq!(extract_host("https://upload.wikimedia.org/x.jpg"), "upload.wikimedia.org");
/// assert_eq!(extract_host("http://EN.Wikipedia.org/w/api.php"), "en.wikipedia.org");
/// assert_eq!(extract_host("not a url"), "unknown");
/// ```
#[must_use]
pub fn extract_host(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Parses a Retry-After header value into a Duration.
///
/// Supports integer seconds and HTTP-date (RFC 7231). Returns `None` when the
/// value cannot be parsed; caps excessive values.
///
/// ```
/// use std::time::Duration;
/// use filmfeed_core::api::parse_retry_after;
///
/// assert_eq!(parse_retry_after("5"), Some(Duration::from_secs(5)));
/// assert_eq!(parse_retry_after("0"), Some(Duration::ZERO));
/// assert_eq!(parse_retry_after("soon"), None);
/// ```
#[must_use]
#[instrument]
pub fn parse_retry_after(header_value: &str) -> Option<Duration> {
    let header_value = header_value.trim();

    if let Ok(seconds) = header_value.parse::<i64>() {
        if seconds < 0 {
            debug!(seconds, "negative Retry-After value, ignoring");
            return None;
        }

        #[allow(clippy::cast_sign_loss)]
        let duration = Duration::from_secs(seconds as u64);
        return Some(cap_retry_after(duration));
    }

    match httpdate::parse_http_date(header_value) {
        Ok(datetime) => Some(
            datetime
                .duration_since(std::time::SystemTime::now())
                .map_or(Duration::ZERO, cap_retry_after),
        ),
        Err(_) => {
            debug!(header_value, "unparseable Retry-After value");
            None
        }
    }
}

fn cap_retry_after(duration: Duration) -> Duration {
    if duration > MAX_RETRY_AFTER {
        warn!(
            delay_secs = duration.as_secs(),
            max_secs = MAX_RETRY_AFTER.as_secs(),
            "Retry-After exceeds maximum, capping"
        );
        MAX_RETRY_AFTER
    } else {
        duration
    }
}
