//! Film Feed Core Library
//!
//! This library acquires an endless, deduplicated stream of Wikipedia film
//! articles: recent-biased release years are sampled, their film categories
//! listed, article details fetched in sequential chunks, and a random-sample
//! fallback takes over when the year path comes back empty.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`api`] - MediaWiki client with retry, backoff and rate limiting
//! - [`article`] - Article record and the acceptance filter
//! - [`discovery`] - Year sampler, primary, detail and fallback stages
//! - [`feed`] - Acquisition orchestrator, visible list and read-ahead buffer
//! - [`merge`] - Identifier-based deduplication and merging
//! - [`preload`] - Best-effort thumbnail warmup
//! - [`language`] - Supported Wikipedia editions and script variants

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod article;
pub mod config;
pub mod discovery;
pub mod feed;
pub mod language;
pub mod merge;
pub mod preload;
mod user_agent;

// Re-export commonly used types
pub use api::{
    ApiError, DEFAULT_MAX_RETRIES, FailureType, MediaWikiClient, RateLimiter, RetryDecision,
    RetryPolicy, WikiApi, classify_error,
};
pub use article::{Article, Rejection, Thumbnail, is_film_related};
pub use config::FeedConfig;
pub use discovery::{
    DetailBatcher, DiscoveryError, FIRST_AWARDS_YEAR, FallbackDiscovery, PrimaryDiscovery,
    random_year, sample_year,
};
pub use feed::{AcquisitionPhase, FeedOrchestrator, FeedStats, FetchOutcome, FetchTarget};
pub use language::Language;
pub use merge::{Identified, deduplicate, merge};
pub use preload::{ImagePreloader, PreloadOutcome};
