//! Article discovery stages.
//!
//! - [`sampler`] - recent-biased release-year sampling
//! - [`PrimaryDiscovery`] - per-year category candidates with a session cache
//! - [`DetailBatcher`] - sequential chunked detail lookups
//! - [`FallbackDiscovery`] - random-sample discovery with a film keyword filter

mod details;
mod error;
mod fallback;
mod primary;
pub mod sampler;

pub use details::DetailBatcher;
pub use error::DiscoveryError;
pub use fallback::FallbackDiscovery;
pub use primary::PrimaryDiscovery;
pub use sampler::{FIRST_AWARDS_YEAR, random_year, sample_year};
