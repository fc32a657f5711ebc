use std::time::{Duration, Instant};

use reddit_client::{RedditClient, RedditCredentials, RedditError};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials() -> RedditCredentials {
    RedditCredentials {
        client_id: "id".into(),
        client_secret: "secret".into(),
        username: "bot".into(),
        password: "pw".into(),
        user_agent: "thread-harvest-test".into(),
    }
}

fn thread_body() -> serde_json::Value {
    json!([
        {"kind": "Listing", "data": {"children": [
            {"kind": "t3", "data": {"id": "abc", "score": 41, "num_comments": 1}}
        ]}},
        {"kind": "Listing", "data": {"children": [
            {"kind": "t1", "data": {"id": "c1", "score": 17, "body": "Top answer"}}
        ]}}
    ])
}

async fn server_with_token() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "tok", "expires_in": 3600})),
        )
        .mount(&server)
        .await;
    server
}

fn client(server: &MockServer) -> RedditClient {
    RedditClient::new(credentials(), &server.uri(), &server.uri()).unwrap()
}

#[tokio::test]
async fn lookup_sends_bearer_token_and_parses_thread() {
    let server = server_with_token().await;
    Mock::given(method("GET"))
        .and(path("/comments/abc"))
        .and(query_param("sort", "top"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(thread_body()))
        .expect(1)
        .mount(&server)
        .await;

    let found = client(&server).submission_with_top_comment("abc").await.unwrap();

    assert_eq!(found.link.score, 41);
    assert_eq!(found.top_comment.unwrap().body.as_deref(), Some("Top answer"));
}

#[tokio::test]
async fn error_statuses_map_to_variants() {
    let server = server_with_token().await;
    for (id, status) in [("gone", 404u16), ("private", 403), ("busy", 429), ("boom", 500)] {
        Mock::given(method("GET"))
            .and(path(format!("/comments/{id}")))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;
    }
    let client = client(&server);

    assert!(matches!(
        client.submission_with_top_comment("gone").await,
        Err(RedditError::NotFound(_))
    ));
    assert!(matches!(
        client.submission_with_top_comment("private").await,
        Err(RedditError::Forbidden(_))
    ));
    assert!(matches!(
        client.submission_with_top_comment("busy").await,
        Err(RedditError::RateLimited)
    ));
    assert!(matches!(
        client.submission_with_top_comment("boom").await,
        Err(RedditError::Api { status: 500, .. })
    ));
}

#[tokio::test]
async fn rejected_grant_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "invalid_grant"})))
        .mount(&server)
        .await;

    let err = client(&server).authenticate().await.unwrap_err();

    assert!(matches!(err, RedditError::Auth(msg) if msg == "invalid_grant"));
}

#[tokio::test]
async fn spent_quota_delays_next_request_until_reset() {
    let server = server_with_token().await;
    Mock::given(method("GET"))
        .and(path("/comments/abc"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(thread_body())
                .insert_header("x-ratelimit-remaining", "0.0")
                .insert_header("x-ratelimit-reset", "1"),
        )
        .expect(2)
        .mount(&server)
        .await;
    let client = client(&server);

    client.submission_with_top_comment("abc").await.unwrap();
    let started = Instant::now();
    client.submission_with_top_comment("abc").await.unwrap();

    assert!(started.elapsed() >= Duration::from_millis(900));
}

#[tokio::test]
async fn remaining_quota_does_not_delay() {
    let server = server_with_token().await;
    Mock::given(method("GET"))
        .and(path("/comments/abc"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(thread_body())
                .insert_header("x-ratelimit-remaining", "500.0")
                .insert_header("x-ratelimit-reset", "30"),
        )
        .mount(&server)
        .await;
    let client = client(&server);

    client.submission_with_top_comment("abc").await.unwrap();
    let started = Instant::now();
    client.submission_with_top_comment("abc").await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(10));
}
