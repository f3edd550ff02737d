//! HTTP API for the caller directory.

mod handlers;
mod middleware;
mod types;

pub use handlers::*;
pub use middleware::{
    auth_middleware, logging_middleware, rate_limit_middleware, Caller, RateLimitState,
};
pub use types::*;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use callerid_directory::{ContactDedup, DirectoryStore};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Directory records
    pub store: Arc<DirectoryStore>,
    /// Duplicate rule for new contacts
    pub contact_dedup: ContactDedup,
}

impl AppState {
    /// Create new application state.
    pub fn new(store: DirectoryStore, contact_dedup: ContactDedup) -> Self {
        Self {
            store: Arc::new(store),
            contact_dedup,
        }
    }
}

/// Create the API router with the default rate limit.
pub fn create_router(state: AppState) -> Router {
    create_router_with_rate_limit(state, RateLimitState::new(600))
}

/// Create the API router with custom rate limiting.
pub fn create_router_with_rate_limit(state: AppState, rate_limit: RateLimitState) -> Router {
    // Everything here requires a token
    let authenticated = Router::new()
        .route(
            "/api/contacts",
            get(handlers::list_contacts).post(handlers::add_contact),
        )
        .route("/api/spam", post(handlers::mark_spam))
        .route("/api/search/name", get(handlers::search_by_name))
        .route("/api/search/phone", get(handlers::search_by_phone))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/register", post(handlers::register))
        .route("/api/login", post(handlers::login))
        .merge(authenticated)
        .layer(axum_middleware::from_fn_with_state(
            rate_limit,
            rate_limit_middleware,
        ))
        .layer(axum_middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
