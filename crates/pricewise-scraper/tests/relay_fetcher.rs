//! Integration tests for `RelayFetcher` and the shopping-page aggregator.
//!
//! Each relay is a path on a local `wiremock` server, so ordering and
//! fallthrough can be asserted without real network traffic.

use std::sync::Arc;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pricewise_scraper::{AggregatorSearch, PageFetcher, RelayFetcher, ScraperError, ShoppingSearch};

const TARGET: &str = "https://www.croma.com/searchB?q=widget%20pro";

fn relay(server: &MockServer, name: &str) -> String {
    format!("{}/{name}?url=", server.uri())
}

fn fetcher(relays: Vec<String>) -> RelayFetcher {
    RelayFetcher::new(relays, 5, "pricewise-test/0.1").expect("failed to build test RelayFetcher")
}

// ---------------------------------------------------------------------------
// Relay ordering
// ---------------------------------------------------------------------------

#[tokio::test]
async fn first_working_relay_wins_and_later_relays_are_not_called() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/first"))
        .and(query_param("url", TARGET))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>first</html>"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/second"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>second</html>"))
        .expect(0)
        .mount(&server)
        .await;

    let body = fetcher(vec![relay(&server, "first"), relay(&server, "second")])
        .fetch(TARGET)
        .await
        .expect("fetch should succeed");

    assert_eq!(body, "<html>first</html>");
}

#[tokio::test]
async fn server_error_falls_through_to_next_relay() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/first"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/second"))
        .and(query_param("url", TARGET))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>second</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let body = fetcher(vec![relay(&server, "first"), relay(&server, "second")])
        .fetch(TARGET)
        .await
        .expect("second relay should answer");

    assert_eq!(body, "<html>second</html>");
}

#[tokio::test]
async fn empty_body_falls_through_to_next_relay() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/first"))
        .respond_with(ResponseTemplate::new(200).set_body_string("   "))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/second"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    let body = fetcher(vec![relay(&server, "first"), relay(&server, "second")])
        .fetch(TARGET)
        .await
        .unwrap();

    assert_eq!(body, "<html>ok</html>");
}

#[tokio::test]
async fn json_relay_body_is_returned_as_text() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "contents": "<html>wrapped</html>" })),
        )
        .mount(&server)
        .await;

    let body = fetcher(vec![relay(&server, "json")]).fetch(TARGET).await.unwrap();

    let value: serde_json::Value = serde_json::from_str(&body).expect("body is the raw JSON text");
    assert_eq!(value["contents"], "<html>wrapped</html>");
}

// ---------------------------------------------------------------------------
// Aggregate failure
// ---------------------------------------------------------------------------

#[tokio::test]
async fn all_relays_failing_reports_every_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/first"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/second"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .mount(&server)
        .await;

    let err = fetcher(vec![relay(&server, "first"), relay(&server, "second")])
        .fetch(TARGET)
        .await
        .unwrap_err();

    match err {
        ScraperError::AllProxiesFailed { url, errors } => {
            assert_eq!(url, TARGET);
            assert_eq!(errors.len(), 2);
            assert!(errors[0].contains("/first") && errors[0].contains("403"));
            assert!(errors[1].contains("/second") && errors[1].contains("empty response body"));
        }
        other => panic!("expected AllProxiesFailed, got: {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_relay_is_skipped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/second"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    // Port 9 (discard) is never served in test environments.
    let body = fetcher(vec![
        "http://127.0.0.1:9/dead?url=".to_string(),
        relay(&server, "second"),
    ])
    .fetch(TARGET)
    .await
    .unwrap();

    assert_eq!(body, "<html>ok</html>");
}

// ---------------------------------------------------------------------------
// Shopping aggregator over a relay
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shopping_search_parses_relayed_results_page() {
    let server = MockServer::start().await;
    let html = r#"
        <html><body>
          <div data-sh-sr="1">
            <a href="/shopping/product/9"></a>
            <span class="a8Pemb">₹2,199</span>
            <span class="aULzUe">Amazon.in</span>
          </div>
          <div data-sh-sr="2">
            <a href="https://www.croma.com/widget/p/1"></a>
            <span class="a8Pemb">₹1,999</span>
            <span class="aULzUe">Croma</span>
          </div>
        </body></html>
    "#;

    Mock::given(method("GET"))
        .and(path("/relay"))
        .and(query_param(
            "url",
            "https://www.google.com/search?q=Widget%20Pro%20price%20in%20India&tbm=shop",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .expect(1)
        .mount(&server)
        .await;

    let search = ShoppingSearch::new(Arc::new(fetcher(vec![relay(&server, "relay")])));
    let results = search.search("Widget Pro").await.expect("search should succeed");

    let summary: Vec<(&str, Option<f64>)> = results
        .iter()
        .map(|r| (r.website.as_str(), r.price))
        .collect();
    assert_eq!(summary, vec![("Croma", Some(1999.0)), ("Amazon.in", Some(2199.0))]);
    assert_eq!(results[1].url, "https://www.google.com/shopping/product/9");
    assert_eq!(results[1].logo.as_deref(), Some("🛒"));
}
