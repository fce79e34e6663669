mod common;

use common::{Fixed, init_test_tracing};
use quip_fetch::{ErrorKind, FetchFailure, Fetcher, JokeApi, OnlineFlag};
use quip_http::{HttpClient, HttpError};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup() -> (MockServer, JokeApi, Fetcher) {
    init_test_tracing();
    let server = MockServer::start().await;
    let api = JokeApi::new(&server.uri()).unwrap();
    let client = HttpClient::new(&server.uri()).unwrap();
    let fetcher = Fetcher::new(Arc::new(client)).with_random(Arc::new(Fixed(1)));
    (server, api, fetcher)
}

#[tokio::test]
async fn random_joke_is_returned_as_is() {
    let (server, api, fetcher) = setup().await;
    let joke = json!({
        "categories": [],
        "id": "abc",
        "url": "https://api.chucknorris.io/jokes/abc",
        "value": "Chuck Norris counted to infinity. Twice."
    });
    Mock::given(method("GET"))
        .and(path("/jokes/random"))
        .respond_with(ResponseTemplate::new(200).set_body_json(joke.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let data = fetcher.fetch_and_classify(&api.random(), None).await.unwrap();
    assert_eq!(data, joke);
}

#[tokio::test]
async fn search_selects_a_single_hit() {
    let (server, api, fetcher) = setup().await;
    Mock::given(method("GET"))
        .and(path("/jokes/search"))
        .and(query_param("query", "kick"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 2,
            "result": [{"value": "first kick"}, {"value": "second kick"}]
        })))
        .mount(&server)
        .await;

    let data = fetcher
        .fetch_and_classify(&api.search("kick"), None)
        .await
        .unwrap();
    assert_eq!(data, json!({"value": "second kick"}));
}

#[tokio::test]
async fn short_query_is_rejected_by_the_server() {
    let (server, api, fetcher) = setup().await;
    Mock::given(method("GET"))
        .and(path("/jokes/search"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "timestamp": "2024-01-01T00:00:00.000Z",
            "status": 400,
            "error": "Bad Request",
            "message": "search.query: size must be between 3 and 120",
            "path": "/jokes/search"
        })))
        .mount(&server)
        .await;

    let err = fetcher
        .fetch_and_classify(&api.search("ab"), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::QueryLengthError));
}

#[tokio::test]
async fn unknown_category_is_a_fetch_error() {
    let (server, api, fetcher) = setup().await;
    Mock::given(method("GET"))
        .and(path("/jokes/random"))
        .and(query_param("category", "nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "status": 404,
            "error": "Not Found",
            "message": "No jokes for category \"nope\" found."
        })))
        .mount(&server)
        .await;

    let err = fetcher
        .fetch_and_classify(&api.random_in("nope"), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::FetchError));
}

#[tokio::test]
async fn no_hits_is_a_search_error() {
    let (server, api, fetcher) = setup().await;
    Mock::given(method("GET"))
        .and(path("/jokes/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 0, "result": []})))
        .mount(&server)
        .await;

    let err = fetcher
        .fetch_and_classify(&api.search("zzzzzz"), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::SearchError));
}

#[tokio::test]
async fn categories_list_passes_through() {
    let (server, api, fetcher) = setup().await;
    Mock::given(method("GET"))
        .and(path("/jokes/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["animal", "dev"])))
        .mount(&server)
        .await;

    let data = fetcher
        .fetch_and_classify(&api.categories(), None)
        .await
        .unwrap();
    assert_eq!(data, json!(["animal", "dev"]));
}

#[tokio::test]
async fn html_error_page_is_a_decode_failure_when_online() {
    let (server, api, fetcher) = setup().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let err = fetcher
        .fetch_and_classify(&api.random(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchFailure::Transport(HttpError::Decode(..))));

    let offline = fetcher.with_connectivity(Arc::new(OnlineFlag::offline()));
    let err = offline
        .fetch_and_classify(&api.random(), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::ConnectionError));
}
