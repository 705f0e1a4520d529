//! API Routes
//!
//! Configures the Axum router for the service's endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{status_handler, whoami_handler, AppState};

/// Creates the router.
///
/// # Endpoints
/// - `GET /status` - Liveness and token cache statistics
/// - `GET /whoami` - User for the token in the `Authorization` header
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/status", get(status_handler))
        .route("/whoami", get(whoami_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
