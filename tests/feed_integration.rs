//! End-to-end tests of the feed orchestrator over a mock MediaWiki API.

use std::sync::Arc;
use std::time::Duration;

use filmfeed_core::{
    FeedConfig, FeedOrchestrator, FetchOutcome, FetchTarget, MediaWikiClient, RetryPolicy,
    WikiApi,
};
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod support;
use support::socket_guard::start_mock_server_or_skip;
use support::wiki_mock::{API_PATH, film_page, members_body, mock_language, pages_body, rock_page};

macro_rules! require_mock_server {
    () => {{
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        mock_server
    }};
}

fn client(server: &MockServer) -> Arc<dyn WikiApi> {
    let policy = RetryPolicy::with_max_attempts(1);
    Arc::new(MediaWikiClient::with_retry_policy(mock_language(server, "en"), policy).unwrap())
}

async fn mount_images(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/img/\d+\.jpg$"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 256]))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_empty_categories_fall_back_to_random_sample() {
    let mock_server = require_mock_server!();
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("list", "categorymembers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(members_body(&[])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("generator", "random"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pages_body(vec![
            film_page(1, "Alien", &base),
            rock_page(2),
            film_page(3, "Brazil", &base),
            film_page(4, "Chinatown", &base),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_images(&mock_server).await;

    let feed = Arc::new(FeedOrchestrator::new(client(&mock_server), FeedConfig::default()).unwrap());
    let outcome = feed.fetch_articles().await;

    assert_eq!(
        outcome,
        FetchOutcome::Appended {
            target: FetchTarget::Visible,
            added: 3
        }
    );
    let titles: Vec<String> = feed.articles().into_iter().map(|a| a.title).collect();
    assert_eq!(titles, vec!["Alien", "Brazil", "Chinatown"]);
    assert_eq!(feed.stats().fallback_attempts(), 1);
    assert_eq!(feed.stats().primary_attempts(), 1);
}

#[tokio::test]
async fn test_primary_path_fills_visible_list() {
    let mock_server = require_mock_server!();
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("list", "categorymembers"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(members_body(&[(10, "Heat"), (11, "Se7en"), (12, "Fargo")])),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("redirects", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pages_body(vec![
            film_page(10, "Heat", &base),
            film_page(11, "Se7en", &base),
            film_page(12, "Fargo", &base),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("generator", "random"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;
    mount_images(&mock_server).await;

    let feed = Arc::new(FeedOrchestrator::new(client(&mock_server), FeedConfig::default()).unwrap());
    feed.fetch_articles().await;

    let mut titles: Vec<String> = feed.articles().into_iter().map(|a| a.title).collect();
    titles.sort();
    assert_eq!(titles, vec!["Fargo", "Heat", "Se7en"]);
    assert_eq!(feed.stats().fallback_attempts(), 0);
}

#[tokio::test]
async fn test_upstream_outage_leaves_feed_empty() {
    let mock_server = require_mock_server!();

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let feed = Arc::new(FeedOrchestrator::new(client(&mock_server), FeedConfig::default()).unwrap());
    let outcome = feed.fetch_articles().await;

    assert_eq!(outcome, FetchOutcome::NoNewArticles);
    assert!(feed.is_empty());
    assert!(!feed.is_loading());
    assert_eq!(feed.stats().fallback_attempts(), 1);
}

#[tokio::test]
async fn test_quick_second_fetch_is_not_sent() {
    let mock_server = require_mock_server!();
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("list", "categorymembers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(members_body(&[])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("generator", "random"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(pages_body(vec![film_page(1, "Alien", &base)])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = FeedConfig::default()
        .with_preload(false)
        .with_fetch_cooldown(Duration::from_secs(30));
    let feed = Arc::new(FeedOrchestrator::new(client(&mock_server), config).unwrap());

    feed.fetch_articles().await;
    let second = feed.fetch_articles().await;

    assert!(matches!(second, FetchOutcome::RateLimited { .. }));
    assert_eq!(feed.len(), 1);
}
