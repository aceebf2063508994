//! The signed-in account.

use serde::{Deserialize, Serialize};

/// Identity of the signed-in user, shared by every remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Stable user id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Contact address.
    pub email: String,
}

impl Account {
    /// Upper-cased first letter of the name, used for the header avatar.
    pub fn initial(&self) -> String {
        self.name
            .chars()
            .next()
            .map_or_else(|| "?".to_string(), |c| c.to_uppercase().to_string())
    }
}
