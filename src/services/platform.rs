//! Shared platform context handed to every page.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::errors::QueryError;
use crate::domain::models::{Account, Greeting};

use super::account_provider::AccountProvider;
use super::query_client::QueryClient;

/// Services every remote renders against.
///
/// One instance is created by the shell and shared by reference; remotes
/// never construct their own cache.
#[derive(Debug, Clone)]
pub struct PlatformContext {
    /// The shared query cache.
    pub query_client: QueryClient,
    /// Account resolution through the cache.
    pub account: AccountProvider,
    /// How long a render waits on a query before showing a skeleton.
    pub render_timeout: Duration,
}

impl PlatformContext {
    /// Context over one cache and account provider.
    pub const fn new(query_client: QueryClient, account: AccountProvider, render_timeout: Duration) -> Self {
        Self {
            query_client,
            account,
            render_timeout,
        }
    }

    /// Account within the render timeout; `Ok(None)` means still loading.
    pub async fn account_within_timeout(&self) -> Result<Option<Arc<Account>>, QueryError> {
        match tokio::time::timeout(self.render_timeout, self.account.account()).await {
            Ok(result) => result.map(Some),
            Err(_) => Ok(self.account.cached()),
        }
    }

    /// Greeting for a page header.
    pub async fn greeting(&self) -> Greeting {
        match self.account_within_timeout().await {
            Ok(Some(account)) => Greeting::Welcome {
                name: account.name.clone(),
            },
            Ok(None) => Greeting::Loading,
            Err(err) => {
                tracing::debug!(error = %err, "account unavailable for greeting");
                Greeting::Anonymous
            }
        }
    }
}
