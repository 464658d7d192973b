//! Feed orchestration: the visible list, the read-ahead buffer and the
//! acquisition state machine that fills them.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use filmfeed_core::{FeedConfig, FeedOrchestrator, Language, MediaWikiClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(MediaWikiClient::new(Language::default())?);
//! let feed = Arc::new(FeedOrchestrator::new(client, FeedConfig::default())?);
//!
//! feed.fetch_articles().await;
//! for article in feed.articles() {
//!     println!("{}: {}", article.title, article.url);
//! }
//! # Ok(())
//! # }
//! ```

mod orchestrator;
mod stats;

pub use orchestrator::{AcquisitionPhase, FeedOrchestrator, FetchOutcome, FetchTarget};
pub use stats::FeedStats;
