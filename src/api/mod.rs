//! API Module
//!
//! HTTP handlers and routing for the service's own endpoints.
//!
//! # Endpoints
//! - `GET /status` - Liveness and token cache statistics
//! - `GET /whoami` - Resolve the caller's token to a username

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
