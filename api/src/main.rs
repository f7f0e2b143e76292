//! BotHub API Server
//!
//! A directory of Discord and WhatsApp bots. Signed-in users submit listings;
//! the owner account verifies, bans and deletes them.
//! Uses hexagonal (ports & adapters) architecture for clean separation of concerns.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod auth;
mod config;
mod domain;
mod error;
mod handlers;
mod view;

#[cfg(test)]
mod test_utils;


use adapters::{FirebaseAuthClient, FirestoreDocumentStore};
use app::{ListingRepository, ModerationService, OwnerPolicy, SessionRegistry};
use config::Config;
use domain::ports::{DocumentStore, IdentityProvider};

/// Identity provider behind the running server
pub type Identity = dyn IdentityProvider;
/// Document store behind the running server
pub type Store = dyn DocumentStore;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionRegistry<Identity, Store>>,
    pub cookie_secure: bool,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the router. Everything except the health check runs behind the session middleware.
pub fn build_router(state: AppState) -> Router {
    let session_routes = Router::new()
        .route("/", get(handlers::get_page))
        .route("/theme", post(handlers::toggle_theme))
        .route("/notice/dismiss", post(handlers::dismiss_notice))
        .route("/auth", post(handlers::submit_auth))
        .route("/auth/mode", post(handlers::toggle_auth_mode))
        .route("/auth/show", post(handlers::show_login))
        .route("/logout", post(handlers::logout))
        .route("/bots", post(handlers::submit_bot))
        .route("/bots/:id/verify", post(handlers::verify_bot))
        .route("/bots/:id/ban", post(handlers::ban_bot))
        .route("/bots/:id/delete", post(handlers::delete_bot))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::client_session_middleware,
        ));

    Router::new()
        // Health check (no session)
        .route("/health", get(health))
        .merge(session_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,bothub_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting BotHub API...");

    // Load configuration
    let config = Config::from_env()?;

    // Create adapters
    let identity: Arc<Identity> = Arc::new(FirebaseAuthClient::new(
        config.auth_url.clone(),
        config.firebase_api_key.clone(),
    ));
    let store: Arc<Store> = Arc::new(FirestoreDocumentStore::new(
        config.firestore_url.clone(),
        config.firebase_project_id.clone(),
        config.firebase_api_key.clone(),
    ));

    // Create application services
    let listings = Arc::new(ListingRepository::new(
        store,
        config.bots_collection.clone(),
    ));
    let policy = OwnerPolicy::new(config.owner_email.clone());
    tracing::info!(
        owner = %policy.owner_email(),
        collection = %config.bots_collection,
        sync = ?config.listing_sync,
        "Directory configured"
    );
    let moderation = Arc::new(ModerationService::new(listings.clone(), policy));

    let sessions = Arc::new(SessionRegistry::new(
        identity,
        listings,
        moderation,
        config.listing_sync,
        config.session_idle,
    ));

    // Evict idle client sessions in the background
    tracing::debug!(
        period_secs = sessions.eviction_period().as_secs(),
        "Session eviction scheduled"
    );
    tokio::spawn(sessions.clone().run_eviction());

    let app = build_router(AppState {
        sessions,
        cookie_secure: config.cookie_secure,
    });

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
