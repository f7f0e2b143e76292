//! Account domain entity
//!
//! Identities live in the external identity provider; nothing here is persisted.

use serde::Serialize;

/// A signed-in account as reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    /// Provider-assigned user id
    pub uid: String,
    pub email: String,
}

/// An authenticated session with the identity provider
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub account: Account,
    /// Bearer credential forwarded to the document store.
    /// Once the store rejects it the session is over.
    pub id_token: String,
}

impl AuthSession {
    pub fn email(&self) -> &str {
        &self.account.email
    }
}
