//! API Handlers
//!
//! HTTP request handlers for the service's own endpoints.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};

use crate::auth::AuthValidator;
use crate::error::{AuthError, ErrorKind, Result, TypedError};
use crate::models::{StatusResponse, WhoAmIResponse};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Token validator, and through it the token cache
    pub validator: Arc<AuthValidator>,
}

impl AppState {
    pub fn new(validator: AuthValidator) -> Self {
        Self {
            validator: Arc::new(validator),
        }
    }
}

/// Handler for GET /status
///
/// Reports liveness and token cache figures.
pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    let stats = state.validator.cache_stats().await;
    Json(StatusResponse::ok(stats))
}

/// Handler for GET /whoami
///
/// Resolves the `Authorization` header to the user it belongs to.
pub async fn whoami_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<WhoAmIResponse>> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AuthError::InvalidToken(no_token()))?;

    let identity = state.validator.get_identity(token).await?;
    Ok(Json(WhoAmIResponse::from_identity(&identity)))
}

fn no_token() -> TypedError {
    TypedError::new(
        ErrorKind::InvalidToken,
        401,
        "invalidToken",
        "Invalid Token",
        "Authorization header is required",
        Default::default(),
    )
}
