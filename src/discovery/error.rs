//! Error types for the discovery stages.

use thiserror::Error;

use crate::api::ApiError;

/// Why a discovery path produced nothing usable.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Every sampled year came back empty or failed.
    #[error("no film candidates for years {years:?}")]
    NoCandidates {
        /// The years that were queried.
        years: Vec<i32>,
    },

    /// Candidates were found but none passed the acceptance filter.
    #[error("none of {candidates} candidates produced an acceptable article")]
    NoArticles {
        /// How many candidates were looked up.
        candidates: usize,
    },

    /// The upstream request itself failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}
