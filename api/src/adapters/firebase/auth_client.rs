//! Firebase Authentication client
//!
//! Email/password sign-in and sign-up through the Identity Toolkit REST API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::domain::entities::{Account, AuthSession};
use crate::domain::ports::IdentityProvider;
use crate::error::AuthError;

/// Identity provider backed by Firebase Authentication
pub struct FirebaseAuthClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl FirebaseAuthClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/v1/accounts:{}", self.base_url, method)
    }

    async fn password_request(
        &self,
        method: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        let response = self
            .http
            .post(self.api_url(method))
            .query(&[("key", self.api_key.as_str())])
            .json(&PasswordRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let body: AuthResponse = response
                .json()
                .await
                .map_err(|e| AuthError::Deserialization(e.to_string()))?;
            Ok(body.into())
        } else {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            Err(map_error(status.as_u16(), &message))
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    local_id: String,
    email: String,
    id_token: String,
}

impl From<AuthResponse> for AuthSession {
    fn from(r: AuthResponse) -> Self {
        AuthSession {
            account: Account {
                uid: r.local_id,
                email: r.email,
            },
            id_token: r.id_token,
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Map an Identity Toolkit error message to an `AuthError`.
///
/// Messages look like `EMAIL_EXISTS` or `WEAK_PASSWORD : Password should be at least 6 characters`.
fn map_error(status: u16, message: &str) -> AuthError {
    let (code, detail) = match message.split_once(':') {
        Some((code, detail)) => (code.trim(), detail.trim()),
        None => (message.trim(), ""),
    };

    match code {
        "INVALID_LOGIN_CREDENTIALS" | "INVALID_CREDENTIAL" => AuthError::InvalidCredential,
        "EMAIL_NOT_FOUND" => AuthError::UserNotFound,
        "INVALID_PASSWORD" => AuthError::WrongPassword,
        "EMAIL_EXISTS" => AuthError::EmailInUse,
        "WEAK_PASSWORD" => AuthError::WeakPassword(detail.to_string()),
        "INVALID_EMAIL" | "MISSING_EMAIL" => AuthError::InvalidEmail,
        "USER_DISABLED" => AuthError::UserDisabled,
        "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthError::TooManyAttempts,
        _ => AuthError::Provider {
            status,
            message: message.to_string(),
        },
    }
}

#[async_trait]
impl IdentityProvider for FirebaseAuthClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        self.password_request("signInWithPassword", email, password)
            .await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        self.password_request("signUp", email, password).await
    }

    async fn sign_out(&self, session: &AuthSession) -> Result<(), AuthError> {
        // The REST API keeps no server-side session; dropping the tokens is enough.
        tracing::debug!(uid = %session.account.uid, "Discarding Firebase tokens");
        Ok(())
    }
}
