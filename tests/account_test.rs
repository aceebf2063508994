//! Account provider sharing through the query cache.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{context_with, CountingAccountSource};
use mfe_shell::domain::models::Greeting;
use mfe_shell::services::account_query_key;

#[tokio::test(start_paused = true)]
async fn test_overlapping_requests_share_one_fetch() {
    let source = CountingAccountSource::new(Duration::from_millis(500));
    let ctx = context_with(source.clone(), Duration::from_secs(3));

    let (a, b) = tokio::join!(ctx.account.account(), ctx.account.account());
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(source.calls(), 1);
    assert!(Arc::ptr_eq(&a, &b), "both call sites hold the same account");
    assert_eq!(a.name, "Ada Lovelace");
}

#[tokio::test(start_paused = true)]
async fn test_prefetch_warms_greeting() {
    let source = CountingAccountSource::new(Duration::from_millis(500));
    let ctx = context_with(source.clone(), Duration::from_millis(100));

    // Render timeout shorter than the fetch: the greeting is still loading.
    assert_eq!(ctx.greeting().await, Greeting::Loading);

    ctx.account.prefetch().await;
    assert_eq!(
        ctx.greeting().await,
        Greeting::Welcome {
            name: "Ada Lovelace".to_string()
        }
    );
    assert_eq!(source.calls(), 1);
    assert!(ctx.query_client.get(&account_query_key()).is_some());
}

#[tokio::test(start_paused = true)]
async fn test_failed_account_shows_anonymous() {
    let source = CountingAccountSource::failing();
    let ctx = context_with(source.clone(), Duration::from_secs(1));

    assert_eq!(ctx.greeting().await, Greeting::Anonymous);
    assert!(ctx.account.cached().is_none());
    assert!(ctx.query_client.get_error(&account_query_key()).is_some());
}
