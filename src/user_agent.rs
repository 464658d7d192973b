//! Shared User-Agent strings for API and image requests.
//!
//! Wikimedia rejects or throttles anonymous clients, so every request carries
//! an identifying User-Agent with a contact URL (Wikimedia User-Agent policy).

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/filmfeed";

/// Default User-Agent for MediaWiki API requests.
#[must_use]
pub(crate) fn default_api_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("filmfeed/{version} (film-feed-reader; +{PROJECT_UA_URL})")
}

/// Default User-Agent for thumbnail preloads.
#[must_use]
pub(crate) fn default_image_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("filmfeed/{version} (image-preload; +{PROJECT_UA_URL})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_format_consistency() {
        let api_ua = default_api_user_agent();
        let image_ua = default_image_user_agent();
        assert!(api_ua.contains(PROJECT_UA_URL), "API UA must contain project URL");
        assert!(image_ua.contains(PROJECT_UA_URL), "image UA must contain project URL");
        assert_eq!(
            env!("CARGO_PKG_VERSION"),
            api_ua
                .strip_prefix("filmfeed/")
                .and_then(|s| s.split(' ').next())
                .expect("API UA has version"),
            "API UA must contain crate version"
        );
    }

    #[test]
    fn test_ua_format_keywords() {
        assert!(default_api_user_agent().contains("film-feed-reader"));
        assert!(default_image_user_agent().contains("image-preload"));
    }
}
