//! Page handlers
//!
//! The directory page itself plus the actions that only touch presentation.
//! Supports content negotiation: Accept: application/json for the page model, otherwise HTML.

use axum::{
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
    Extension, Json,
};

use super::{dispatch, wants_json, Client};
use crate::app::ViewAction;
use crate::view::render_page;

/// GET /
pub async fn get_page(Extension(client): Extension<Client>, headers: HeaderMap) -> Response {
    let page = {
        let mut view = client.view.lock().await;
        view.load().await;
        view.page()
    };

    if wants_json(&headers) {
        Json(page).into_response()
    } else {
        Html(render_page(&page)).into_response()
    }
}

/// POST /theme
pub async fn toggle_theme(Extension(client): Extension<Client>, headers: HeaderMap) -> Response {
    dispatch(&client, &headers, ViewAction::ToggleTheme).await
}

/// POST /notice/dismiss
pub async fn dismiss_notice(Extension(client): Extension<Client>, headers: HeaderMap) -> Response {
    dispatch(&client, &headers, ViewAction::DismissNotice).await
}
