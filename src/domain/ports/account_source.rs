//! Port for the identity provider behind the account query.

use async_trait::async_trait;

use crate::domain::errors::QueryError;
use crate::domain::models::Account;

/// Backend that resolves the signed-in account.
#[async_trait]
pub trait AccountSource: Send + Sync {
    /// Fetch the signed-in account.
    async fn fetch_account(&self) -> Result<Account, QueryError>;
}
