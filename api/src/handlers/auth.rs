//! Auth handlers
//!
//! Sign-in, registration and sign-out form posts.

use axum::{http::HeaderMap, response::Response, Extension, Form};
use serde::Deserialize;

use super::{dispatch, Client};
use crate::app::ViewAction;

/// Form body for POST /auth
#[derive(Debug, Deserialize)]
pub struct AuthForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// POST /auth
///
/// Signs in or registers depending on the view's current auth mode.
pub async fn submit_auth(
    Extension(client): Extension<Client>,
    headers: HeaderMap,
    Form(form): Form<AuthForm>,
) -> Response {
    let action = ViewAction::SubmitAuth {
        email: form.email,
        password: form.password,
    };
    dispatch(&client, &headers, action).await
}

/// POST /auth/mode
pub async fn toggle_auth_mode(
    Extension(client): Extension<Client>,
    headers: HeaderMap,
) -> Response {
    dispatch(&client, &headers, ViewAction::ToggleAuthMode).await
}

/// POST /auth/show
pub async fn show_login(Extension(client): Extension<Client>, headers: HeaderMap) -> Response {
    dispatch(&client, &headers, ViewAction::ShowLogin).await
}

/// POST /logout
pub async fn logout(Extension(client): Extension<Client>, headers: HeaderMap) -> Response {
    dispatch(&client, &headers, ViewAction::Logout).await
}
