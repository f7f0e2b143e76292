//! Session manager
//!
//! Holds the signed-in identity of one client and publishes every change on a
//! watch channel. Token lifetime is left to the identity provider; a token the
//! document store rejects ends the session.

use std::sync::Arc;

use tokio::sync::watch;

use crate::domain::entities::{Account, AuthSession};
use crate::domain::ports::IdentityProvider;
use crate::error::AuthError;

/// Per-client session state
pub struct SessionManager<IP>
where
    IP: IdentityProvider + ?Sized,
{
    provider: Arc<IP>,
    current: watch::Sender<Option<AuthSession>>,
}

impl<IP> SessionManager<IP>
where
    IP: IdentityProvider + ?Sized,
{
    pub fn new(provider: Arc<IP>) -> Self {
        let (current, _) = watch::channel(None);
        Self { provider, current }
    }

    /// Subscribe to identity changes.
    ///
    /// The receiver is closed when the session manager is dropped.
    pub fn subscribe(&self) -> watch::Receiver<Option<AuthSession>> {
        self.current.subscribe()
    }

    /// Snapshot of the current session
    pub fn current(&self) -> Option<AuthSession> {
        self.current.borrow().clone()
    }

    /// Sign in with email and password
    ///
    /// On failure the session is left as it was.
    pub async fn login(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        let session = self
            .provider
            .sign_in(email.trim(), password)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Sign-in failed"))?;

        Ok(self.publish(session))
    }

    /// Create an account and sign it in
    pub async fn register(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        let session = self
            .provider
            .sign_up(email.trim(), password)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Sign-up failed"))?;

        tracing::info!(email = %session.account.email, "Account registered");
        Ok(self.publish(session))
    }

    /// Sign out. The session is cleared even if the provider reports an error.
    pub async fn logout(&self) -> Result<(), AuthError> {
        let Some(session) = self.current.send_replace(None) else {
            return Ok(());
        };

        tracing::info!(email = %session.account.email, "Signed out");
        self.provider.sign_out(&session).await
    }

    /// End the session after the document store rejected its token.
    ///
    /// The provider has already let the session lapse, so it is not told.
    pub fn expire(&self) {
        let mut ended = None;
        self.current.send_if_modified(|current| {
            ended = current.take();
            ended.is_some()
        });
        if let Some(session) = ended {
            tracing::info!(email = %session.account.email, "Session expired");
        }
    }

    fn publish(&self, session: AuthSession) -> Account {
        let account = session.account.clone();
        tracing::info!(email = %account.email, "Signed in");
        self.current.send_replace(Some(session));
        account
    }
}
