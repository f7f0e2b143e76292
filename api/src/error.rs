//! Unified error types for the BotHub API
//!
//! This module defines error types for each layer:
//! - `AuthError`: Identity provider failures (shown to the user verbatim)
//! - `StoreError`: Document store failures
//! - `DomainError`: Core business logic errors
//! - `AppError`: HTTP layer errors (wraps domain errors for responses)
//! - `ConfigError`: Startup configuration errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Identity provider errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password (auth/invalid-credential)")]
    InvalidCredential,

    #[error("No account exists for this email (auth/user-not-found)")]
    UserNotFound,

    #[error("Wrong password (auth/wrong-password)")]
    WrongPassword,

    #[error("Email address is already in use (auth/email-already-in-use)")]
    EmailInUse,

    #[error("Weak password: {0} (auth/weak-password)")]
    WeakPassword(String),

    #[error("Invalid email address (auth/invalid-email)")]
    InvalidEmail,

    #[error("Account has been disabled (auth/user-disabled)")]
    UserDisabled,

    #[error("Too many attempts, try again later (auth/too-many-requests)")]
    TooManyAttempts,

    #[error("{message}")]
    Provider { status: u16, message: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

/// Document store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Store API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Not signed in to the document store")]
    Unauthenticated,

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Malformed document: {0}")]
    Decode(String),
}

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not signed in")]
    Unauthenticated,

    #[error("Listing not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Auth(#[from] AuthError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Configuration errors raised while loading `Config`
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Application layer errors - used by HTTP handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body for JSON responses
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Domain(DomainError::Validation(msg)) => (
                StatusCode::BAD_REQUEST,
                "Validation error",
                Some(msg.clone()),
            ),
            AppError::Domain(DomainError::Forbidden(msg)) => {
                (StatusCode::FORBIDDEN, "Forbidden", Some(msg.clone()))
            }
            AppError::Domain(DomainError::Unauthenticated) => {
                (StatusCode::UNAUTHORIZED, "Unauthorized", None)
            }
            AppError::Domain(DomainError::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, "Not found", Some(msg.clone()))
            }
            AppError::Domain(DomainError::Auth(e)) => {
                (StatusCode::UNAUTHORIZED, "Authentication failed", Some(e.to_string()))
            }
            AppError::Domain(DomainError::Store(e)) => {
                tracing::error!("Store error: {}", e);
                match e {
                    StoreError::PermissionDenied(_) | StoreError::Unauthenticated => {
                        (StatusCode::FORBIDDEN, "Store access denied", None)
                    }
                    StoreError::NotFound(msg) => {
                        (StatusCode::NOT_FOUND, "Not found", Some(msg.clone()))
                    }
                    _ => (StatusCode::BAD_GATEWAY, "Store error", None),
                }
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "Bad request", Some(msg.clone()))
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            details,
        });

        (status, body).into_response()
    }
}
