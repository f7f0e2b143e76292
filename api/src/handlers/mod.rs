//! HTTP handlers
//!
//! Axum request handlers for the directory page and its form posts.
//! Every handler works on the caller's own directory view, resolved by the
//! session middleware.

pub mod auth;
pub mod bots;
pub mod page;

use axum::{
    http::{header, HeaderMap},
    response::{IntoResponse, Redirect, Response},
    Json,
};

use crate::app::{ClientHandle, ViewAction};
use crate::{Identity, Store};

pub use auth::{logout, show_login, submit_auth, toggle_auth_mode};
pub use bots::{ban_bot, delete_bot, submit_bot, verify_bot};
pub use page::{dismiss_notice, get_page, toggle_theme};

/// The client session injected by the session middleware
pub type Client = ClientHandle<Identity, Store>;

/// Check if the client wants JSON response
fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("application/json"))
        .unwrap_or(false)
}

/// Run one action on the caller's view and answer the form post.
///
/// - Accept: application/json → the updated page model
/// - Otherwise → 303 back to the page
async fn dispatch(client: &Client, headers: &HeaderMap, action: ViewAction) -> Response {
    let mut view = client.view.lock().await;
    view.dispatch(action).await;

    if wants_json(headers) {
        Json(view.page()).into_response()
    } else {
        Redirect::to("/").into_response()
    }
}
