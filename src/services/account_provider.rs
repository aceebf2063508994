//! Account provider backed by the shared query cache.
//!
//! The account lives under the single key `["account"]`, so the shell's
//! warm-up prefetch and every remote's greeting share one fetch.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::errors::QueryError;
use crate::domain::models::{Account, QueryKey, QueryOptions};
use crate::domain::ports::AccountSource;
use crate::query_key;

use super::query_client::QueryClient;

/// Cache key of the signed-in account.
pub fn account_query_key() -> QueryKey {
    query_key!["account"]
}

/// Account source returning a fixed account after a fixed delay.
#[derive(Debug, Clone)]
pub struct SimulatedAccountSource {
    delay: Duration,
    account: Account,
}

impl SimulatedAccountSource {
    /// Default demo account, answered after `delay`.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            account: Account {
                id: "user-001".to_string(),
                name: "John Smith".to_string(),
                email: "john@example.com".to_string(),
            },
        }
    }

    /// Answer with `account` instead.
    #[must_use]
    pub fn with_account(mut self, account: Account) -> Self {
        self.account = account;
        self
    }
}

impl Default for SimulatedAccountSource {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}

#[async_trait]
impl AccountSource for SimulatedAccountSource {
    async fn fetch_account(&self) -> Result<Account, QueryError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.account.clone())
    }
}

/// Resolves the signed-in account through the query cache.
#[derive(Clone)]
pub struct AccountProvider {
    client: QueryClient,
    source: Arc<dyn AccountSource>,
}

impl AccountProvider {
    /// Provider caching `source` in `client`.
    pub fn new(client: QueryClient, source: Arc<dyn AccountSource>) -> Self {
        Self { client, source }
    }

    /// The account, fetched at most once while it stays fresh.
    pub async fn account(&self) -> Result<Arc<Account>, QueryError> {
        let source = Arc::clone(&self.source);
        self.client
            .fetch(account_query_key(), move || async move {
                source.fetch_account().await
            })
            .await
    }

    /// Warm the cache; failures are logged and left for pages to surface.
    pub async fn prefetch(&self) {
        let source = Arc::clone(&self.source);
        self.client
            .prefetch(account_query_key(), QueryOptions::default(), move || async move {
                source.fetch_account().await
            })
            .await;
    }

    /// Cached account without fetching.
    pub fn cached(&self) -> Option<Arc<Account>> {
        self.client.get_data::<Account>(&account_query_key())
    }
}

impl std::fmt::Debug for AccountProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountProvider")
            .field("cached", &self.cached().map(|a| a.id.clone()))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_simulated_source_returns_fixture() {
        let source = SimulatedAccountSource::default();
        let account = source.fetch_account().await.unwrap();
        assert_eq!(account.id, "user-001");
        assert_eq!(account.name, "John Smith");
    }

    #[tokio::test(start_paused = true)]
    async fn test_prefetch_then_cached() {
        let client = QueryClient::default();
        let provider = AccountProvider::new(
            client.clone(),
            Arc::new(SimulatedAccountSource::new(Duration::from_millis(10))),
        );
        assert!(provider.cached().is_none());
        provider.prefetch().await;
        assert_eq!(provider.cached().unwrap().email, "john@example.com");
        assert!(client.get(&account_query_key()).is_some());
    }
}
