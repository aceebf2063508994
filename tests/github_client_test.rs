//! GitHub client against a mock API.

mod common;

use std::time::Duration;

use mockito::Matcher;

use mfe_shell::adapters::github::GitHubClient;
use mfe_shell::domain::errors::QueryError;
use mfe_shell::query_key;
use mfe_shell::services::QueryClient;

const COMMITS: &str = r#"[
  {
    "sha": "abc1234def",
    "commit": {
      "message": "Fix hydration mismatch\n\nDetails",
      "author": { "name": "Dan", "email": "dan@example.com", "date": "2026-10-01T12:00:00Z" }
    },
    "author": { "login": "gaearon" },
    "html_url": "https://github.com/facebook/react/commit/abc1234def"
  }
]"#;

#[tokio::test]
async fn test_sends_github_headers_and_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/repos/facebook/react/commits")
        .match_query(Matcher::UrlEncoded("per_page".into(), "15".into()))
        .match_header("accept", "application/vnd.github.v3+json")
        .match_header("authorization", "Bearer ghp_test")
        .match_header("user-agent", Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(COMMITS)
        .create_async()
        .await;

    let client = GitHubClient::new(server.url(), Some("ghp_test".to_string()));
    let commits = client.list_commits("facebook", "react", 15).await.unwrap();

    mock.assert_async().await;
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].headline(), "Fix hydration mismatch");
}

#[tokio::test]
async fn test_non_success_status_maps_to_http_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/repos/acme/missing")
        .with_status(404)
        .with_body(r#"{"message":"Not Found"}"#)
        .create_async()
        .await;

    let client = GitHubClient::new(server.url(), None);
    let err = client.get_repo("acme", "missing").await.unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), "GitHub API error: 404");
}

#[tokio::test]
async fn test_malformed_body_maps_to_decode_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/orgs/acme")
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let client = GitHubClient::new(server.url(), None);
    let err = client.get_org("acme").await.unwrap_err();
    assert!(matches!(err, QueryError::Decode { .. }));
}

#[tokio::test]
async fn test_budget_exhaustion_refuses_without_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/repos/acme/widget/languages")
        .with_status(200)
        .with_body(r#"{"Rust": 1000}"#)
        .expect(1)
        .create_async()
        .await;

    let client = GitHubClient::with_budget(server.url(), None, 1);
    assert!(client.get_languages("acme", "widget").await.is_ok());

    let err = client.get_languages("acme", "widget").await.unwrap_err();
    assert!(matches!(err, QueryError::RateLimited { .. }));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_silent_api_times_out_and_releases_query_key() {
    let client = GitHubClient::new(common::silent_server().await, None).with_timeout(Duration::from_millis(200));
    let cache = QueryClient::default();
    let key = query_key!["github", "repo", "acme", "widget"];

    for _ in 0..2 {
        let gh = client.clone();
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            cache.fetch(key.clone(), move || async move { gh.get_repo("acme", "widget").await }),
        )
        .await
        .expect("request must not hang");
        assert!(matches!(result, Err(QueryError::Transport { .. })));
        assert!(!cache.is_fetching(&key));
    }
}
