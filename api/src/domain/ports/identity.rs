//! Identity provider port trait
//!
//! Defines the interface to the hosted authentication service.
//! Change notifications are published by the session manager, not the provider.

use async_trait::async_trait;

use crate::domain::entities::AuthSession;
use crate::error::AuthError;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Sign in with email and password
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    /// Create a new account and sign it in
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    /// End a session
    async fn sign_out(&self, session: &AuthSession) -> Result<(), AuthError>;
}
