//! Client session middleware
//!
//! Resolves the `bothub_sid` cookie to the caller's client session and injects
//! the handle into request extensions. New sessions get a fresh cookie.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

use crate::app::SessionId;
use crate::error::AppError;
use crate::AppState;

pub const SESSION_COOKIE: &str = "bothub_sid";

/// Find a cookie value by name in the Cookie header(s)
fn parse_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
}

/// Session id from the request, if present and well-formed
fn session_from_headers(headers: &HeaderMap) -> Option<SessionId> {
    parse_cookie(headers, SESSION_COOKIE).and_then(|v| v.parse().ok())
}

fn session_cookie(id: SessionId, secure: bool) -> Result<HeaderValue, AppError> {
    let secure = if secure { "; Secure" } else { "" };
    HeaderValue::from_str(&format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/{}",
        SESSION_COOKIE, id, secure
    ))
    .map_err(|e| AppError::Internal(format!("invalid session cookie: {}", e)))
}

/// Session middleware
///
/// Every page and action route runs behind this, so handlers can rely on a
/// `ClientHandle` being present in extensions.
pub async fn client_session_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let requested = session_from_headers(request.headers());
    let client = state.sessions.resolve(requested).await;

    let cookie = if client.is_new {
        Some(session_cookie(client.id, state.cookie_secure)?)
    } else {
        None
    };

    request.extensions_mut().insert(client);
    let mut response = next.run(request).await;

    if let Some(cookie) = cookie {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    Ok(response)
}
