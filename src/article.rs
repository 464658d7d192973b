//! Article records and the acceptance filter.
//!
//! A page from the API becomes an [`Article`] only if it has a page id, a
//! thumbnail, a canonical URL, and an extract longer than the configured
//! minimum. Pages that fail are not errors; they are dropped with a
//! [`Rejection`] reason logged at trace level.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::api::PageRecord;

/// Default minimum extract length, in characters (exclusive).
pub const DEFAULT_MIN_EXTRACT_CHARS: usize = 100;

/// Keywords marking a page as film-related, matched case-insensitively
/// against category titles, the page title, and the extract.
#[allow(clippy::expect_used)]
static FILM_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)film|movie|cinema|directed by|starring").expect("film keyword regex is valid") // Static pattern, safe to panic
});

/// Lead image reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Thumbnail {
    /// Image URL.
    pub url: String,
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
}

/// One accepted film article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    /// Stable identifier (the decimal page id).
    pub id: String,
    /// Title in the reader's script variant, falling back to `canonical_title`.
    pub title: String,
    /// Canonical page title.
    pub canonical_title: String,
    /// Plain-text intro extract.
    pub extract: String,
    /// Lead image; always present on accepted articles.
    pub thumbnail: Option<Thumbnail>,
    /// Canonical article URL.
    pub url: String,
    /// Visible category titles.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
}

/// Why a page was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Missing or invalid page (no page id).
    #[error("page has no id")]
    MissingId,
    /// No lead image.
    #[error("page has no thumbnail")]
    MissingThumbnail,
    /// No canonical URL.
    #[error("page has no canonical URL")]
    MissingUrl,
    /// Extract empty or not longer than the minimum.
    #[error("extract has {chars} chars, need more than {min}")]
    ExtractTooShort {
        /// Extract length in characters.
        chars: usize,
        /// Configured minimum.
        min: usize,
    },
}

impl Article {
    /// Applies the acceptance invariant to a page.
    ///
    /// `variant` selects the display title from the page's variant titles.
    ///
    /// # Errors
    ///
    /// Returns the first [`Rejection`] the page fails.
    pub fn from_page(
        page: PageRecord,
        variant: Option<&str>,
        min_extract_chars: usize,
    ) -> Result<Self, Rejection> {
        let id = page.pageid.ok_or(Rejection::MissingId)?;

        let thumbnail = page
            .thumbnail
            .filter(|thumb| !thumb.source.trim().is_empty())
            .ok_or(Rejection::MissingThumbnail)?;

        let url = page
            .canonicalurl
            .filter(|url| !url.trim().is_empty())
            .ok_or(Rejection::MissingUrl)?;

        let extract = page.extract.unwrap_or_default().trim().to_string();
        let chars = extract.chars().count();
        if chars <= min_extract_chars {
            return Err(Rejection::ExtractTooShort {
                chars,
                min: min_extract_chars,
            });
        }

        let title = variant
            .and_then(|v| page.varianttitles.get(v))
            .filter(|t| !t.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| page.title.clone());

        Ok(Self {
            id: id.to_string(),
            title,
            canonical_title: page.title,
            extract,
            thumbnail: Some(Thumbnail {
                url: thumbnail.source,
                width: thumbnail.width,
                height: thumbnail.height,
            }),
            url,
            categories: page.categories.into_iter().map(|c| c.title).collect(),
        })
    }

    /// Thumbnail URL, if any.
    #[must_use]
    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnail.as_ref().map(|t| t.url.as_str())
    }

    /// First `max_chars` characters of the extract, cut at a word boundary
    /// where one exists.
    #[must_use]
    pub fn preview(&self, max_chars: usize) -> &str {
        let Some((cut, _)) = self.extract.char_indices().nth(max_chars) else {
            return &self.extract;
        };
        let head = &self.extract[..cut];
        head.rfind(' ').map_or(head, |space| &head[..space])
    }
}

/// Whether a raw page looks like it is about a film.
///
/// True when any category title, the page title, or the extract contains one
/// of the film keywords.
#[must_use]
pub fn is_film_related(page: &PageRecord) -> bool {
    page.categories
        .iter()
        .any(|c| FILM_KEYWORDS.is_match(&c.title))
        || FILM_KEYWORDS.is_match(&page.title)
        || page
            .extract
            .as_deref()
            .is_some_and(|extract| FILM_KEYWORDS.is_match(extract))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use crate::api::{CategoryRecord, ThumbnailRecord};

    pub(crate) fn long_extract(subject: &str) -> String {
        format!(
            "{subject} is a feature-length production released to wide audiences. \
             It was shot on location over several months and premiered at a festival before its general release."
        )
    }

    pub(crate) fn film_page(id: u64, title: &str) -> PageRecord {
        PageRecord {
            pageid: Some(id),
            title: title.to_string(),
            extract: Some(long_extract(title)),
            thumbnail: Some(ThumbnailRecord {
                source: format!("https://upload.wikimedia.org/{id}.jpg"),
                width: 800,
                height: 1200,
            }),
            canonicalurl: Some(format!("https://en.wikipedia.org/wiki/{id}")),
            varianttitles: Default::default(),
            categories: vec![CategoryRecord {
                title: "Category:1999 films".to_string(),
            }],
        }
    }

    // ==================== Acceptance Tests ====================

    #[test]
    fn test_complete_page_is_accepted() {
        let article = Article::from_page(film_page(603, "The Matrix"), None, 100).unwrap();
        assert_eq!(article.id, "603");
        assert_eq!(article.title, "The Matrix");
        assert_eq!(article.canonical_title, "The Matrix");
        assert_eq!(article.thumbnail_url(), Some("https://upload.wikimedia.org/603.jpg"));
        assert_eq!(article.categories, vec!["Category:1999 films"]);
    }

    #[test]
    fn test_missing_id_rejected() {
        let mut page = film_page(1, "Ghost");
        page.pageid = None;
        assert_eq!(Article::from_page(page, None, 100), Err(Rejection::MissingId));
    }

    #[test]
    fn test_missing_thumbnail_rejected() {
        let mut page = film_page(1, "Ghost");
        page.thumbnail = None;
        assert_eq!(
            Article::from_page(page, None, 100),
            Err(Rejection::MissingThumbnail)
        );
    }

    #[test]
    fn test_blank_thumbnail_source_rejected() {
        let mut page = film_page(1, "Ghost");
        page.thumbnail.as_mut().unwrap().source = "  ".to_string();
        assert_eq!(
            Article::from_page(page, None, 100),
            Err(Rejection::MissingThumbnail)
        );
    }

    #[test]
    fn test_missing_url_rejected() {
        let mut page = film_page(1, "Ghost");
        page.canonicalurl = None;
        assert_eq!(Article::from_page(page, None, 100), Err(Rejection::MissingUrl));
    }

    #[test]
    fn test_empty_extract_rejected() {
        let mut page = film_page(1, "Ghost");
        page.extract = None;
        assert_eq!(
            Article::from_page(page, None, 100),
            Err(Rejection::ExtractTooShort { chars: 0, min: 100 })
        );
    }

    #[test]
    fn test_extract_at_minimum_rejected_and_above_accepted() {
        let mut page = film_page(1, "Ghost");
        page.extract = Some("x".repeat(100));
        assert!(matches!(
            Article::from_page(page.clone(), None, 100),
            Err(Rejection::ExtractTooShort { chars: 100, .. })
        ));
        page.extract = Some("x".repeat(101));
        assert!(Article::from_page(page, None, 100).is_ok());
    }

    #[test]
    fn test_extract_length_counts_chars_not_bytes() {
        let mut page = film_page(1, "千と千尋の神隠し");
        page.extract = Some("映".repeat(60));
        assert!(matches!(
            Article::from_page(page, None, 100),
            Err(Rejection::ExtractTooShort { chars: 60, .. })
        ));
    }

    #[test]
    fn test_variant_title_used_when_present() {
        let mut page = film_page(9, "Infernal Affairs");
        page.varianttitles
            .insert("zh-tw".to_string(), "無間道".to_string());
        let article = Article::from_page(page.clone(), Some("zh-tw"), 100).unwrap();
        assert_eq!(article.title, "無間道");
        assert_eq!(article.canonical_title, "Infernal Affairs");

        let article = Article::from_page(page, Some("zh-cn"), 100).unwrap();
        assert_eq!(article.title, "Infernal Affairs");
    }

    // ==================== Film Heuristic Tests ====================

    #[test]
    fn test_film_keyword_in_category() {
        let page = PageRecord {
            title: "Casablanca".to_string(),
            categories: vec![CategoryRecord {
                title: "Category:American black-and-white FILMS".to_string(),
            }],
            ..Default::default()
        };
        assert!(is_film_related(&page));
    }

    #[test]
    fn test_film_keyword_in_title_or_extract() {
        let titled = PageRecord {
            title: "List of cinema of Japan".to_string(),
            ..Default::default()
        };
        assert!(is_film_related(&titled));

        let extracted = PageRecord {
            title: "Vertigo".to_string(),
            extract: Some("A 1958 thriller Directed By Alfred Hitchcock".to_string()),
            ..Default::default()
        };
        assert!(is_film_related(&extracted));
    }

    #[test]
    fn test_non_film_page_not_related() {
        let page = PageRecord {
            title: "Basalt".to_string(),
            extract: Some("Basalt is an extrusive igneous rock.".to_string()),
            categories: vec![CategoryRecord {
                title: "Category:Volcanic rocks".to_string(),
            }],
            ..Default::default()
        };
        assert!(!is_film_related(&page));
    }

    // ==================== Preview Tests ====================

    #[test]
    fn test_preview_cuts_at_word_boundary() {
        let article = Article::from_page(film_page(1, "Heat"), None, 10).unwrap();
        let preview = article.preview(20);
        assert!(preview.chars().count() <= 20);
        assert!(!preview.ends_with(' '));
        assert!(article.extract.starts_with(preview));
    }

    #[test]
    fn test_preview_short_extract_returned_whole() {
        let article = Article::from_page(film_page(1, "Heat"), None, 10).unwrap();
        assert_eq!(article.preview(10_000), article.extract);
    }
}
