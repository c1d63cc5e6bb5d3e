//! services/api/src/web/middleware.rs
//!
//! Bearer-token authentication for protected routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

use crate::error::ApiError;
use crate::web::state::AppState;

/// Tokens of the form `mock-token-<uid>` stand in for `<uid>` when `ALLOW_MOCK_TOKENS` is on.
pub const MOCK_TOKEN_PREFIX: &str = "mock-token-";

/// The verified caller, inserted into request extensions by [`require_auth`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub String);

/// The token from the `Authorization` header, with any `Bearer ` prefix removed.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then_some(token)
}

/// Resolves the caller's user id from the request headers.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<String, ApiError> {
    let token = bearer_token(headers)
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

    if state.config.allow_mock_tokens {
        if let Some(uid) = token.strip_prefix(MOCK_TOKEN_PREFIX).filter(|u| !u.is_empty()) {
            warn!("Accepting mock token for user {}", uid);
            return Ok(uid.to_string());
        }
    }

    state
        .identity
        .verify_token(token)
        .await
        .map_err(|e| ApiError::Unauthorized(format!("Invalid auth token: {}", e)))
}

/// Middleware that verifies the bearer token and inserts the caller into request extensions.
///
/// Missing or invalid tokens are answered with 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user_id = authenticate(&state, req.headers()).await?;
    req.extensions_mut().insert(AuthenticatedUser(user_id));
    Ok(next.run(req).await)
}
