//! Authentication, rate limiting and logging middleware.

use super::AppState;
use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use callerid_directory::{authenticate_token, Identity};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::{num::NonZeroU32, sync::Arc};
use tracing::{debug, warn};

/// Global rate limiter (not keyed by IP).
pub type GlobalLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Rate limiter state shared across requests.
#[derive(Clone)]
pub struct RateLimitState {
    /// Global rate limiter for all requests
    pub global: Arc<GlobalLimiter>,
}

impl RateLimitState {
    /// Create a new rate limit state with the specified limits.
    pub fn new(requests_per_minute: u32) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN));

        Self {
            global: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Create a permissive rate limiter for testing.
    pub fn permissive() -> Self {
        Self::new(10_000)
    }
}

/// Rate limiting middleware.
///
/// Checks the global rate limit and returns 429 Too Many Requests if exceeded.
pub async fn rate_limit_middleware(
    State(rate_limit): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if rate_limit.global.check().is_err() {
        warn!("Global rate limit exceeded");
        return Err(ApiError::RateLimitExceeded);
    }

    Ok(next.run(request).await)
}

/// The identity a request is authenticated as.
#[derive(Debug, Clone)]
pub struct Caller(pub Identity);

/// Resolve the `Authorization` token and attach the [`Caller`] to the request.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = token_from_headers(request.headers()).ok_or(ApiError::MissingToken)?;

    let identity = authenticate_token(&state.store, &key).await.map_err(|e| {
        warn!("Request with unknown token");
        ApiError::from(e)
    })?;

    debug!(identity_id = %identity.id, "Request authenticated");
    request.extensions_mut().insert(Caller(identity));
    Ok(next.run(request).await)
}

/// Accepts `Token <key>` and `Bearer <key>`.
fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, key) = value.trim().split_once(' ')?;
    let key = key.trim();

    let known_scheme =
        scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer");
    (known_scheme && !key.is_empty()).then(|| key.to_string())
}

/// Logging middleware for requests.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    debug!(%method, %uri, "Request started");

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    if status.is_success() {
        debug!(%method, %uri, %status, ?duration, "Request completed");
    } else {
        warn!(%method, %uri, %status, ?duration, "Request failed");
    }

    response
}
