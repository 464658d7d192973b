//! Serde models of the MediaWiki `action=query` response shape.
//!
//! Only the fields the feed reads are modelled; everything else is ignored.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

/// Top-level `action=query` response.
#[derive(Debug, Deserialize)]
pub(crate) struct QueryResponse {
    #[serde(default)]
    pub query: Option<QueryBody>,
    /// Present instead of `query` when the API rejects the request.
    #[serde(default)]
    pub error: Option<UpstreamError>,
}

/// The `query` object.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct QueryBody {
    #[serde(default)]
    pub pages: Option<PagesField>,
    #[serde(default)]
    pub categorymembers: Vec<CategoryMember>,
}

/// `query.pages` is an array with `formatversion=2` and an object keyed by
/// page id with the legacy format.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum PagesField {
    List(Vec<PageRecord>),
    Map(BTreeMap<String, PageRecord>),
}

impl PagesField {
    pub(crate) fn into_vec(self) -> Vec<PageRecord> {
        match self {
            Self::List(pages) => pages,
            Self::Map(pages) => pages.into_values().collect(),
        }
    }
}

/// `error` object returned by MediaWiki on a rejected request.
#[derive(Debug, Deserialize)]
pub(crate) struct UpstreamError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub info: String,
}

/// One entry of `query.categorymembers`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryMember {
    /// Page id.
    pub pageid: u64,
    /// Canonical page title.
    pub title: String,
}

/// Thumbnail as returned by `prop=pageimages`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ThumbnailRecord {
    /// Image URL.
    pub source: String,
    /// Pixel width.
    #[serde(default)]
    pub width: u32,
    /// Pixel height.
    #[serde(default)]
    pub height: u32,
}

/// Category entry as returned by `prop=categories`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryRecord {
    /// Category title including its namespace prefix.
    pub title: String,
}

/// One page of `query.pages`.
///
/// Missing or invalid titles come back without a `pageid`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PageRecord {
    /// Page id, absent for missing pages.
    #[serde(default)]
    pub pageid: Option<u64>,
    /// Canonical page title.
    #[serde(default)]
    pub title: String,
    /// Plain-text intro extract.
    #[serde(default)]
    pub extract: Option<String>,
    /// Lead image thumbnail.
    #[serde(default)]
    pub thumbnail: Option<ThumbnailRecord>,
    /// Canonical article URL (`inprop=url`).
    #[serde(default)]
    pub canonicalurl: Option<String>,
    /// Title per script variant (`inprop=varianttitles`).
    #[serde(default)]
    pub varianttitles: HashMap<String, String>,
    /// Visible categories (`prop=categories`).
    #[serde(default)]
    pub categories: Vec<CategoryRecord>,
}
