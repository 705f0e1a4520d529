//! ORCID Link auth layer
//!
//! Token validation with a bounded TTL cache, plus clients for the identity
//! service, ORCID OAuth, the ORCID API and the Service Wizard. Every upstream
//! failure is normalized into one error shape.

pub mod api;
pub mod auth;
pub mod cache;
pub mod client;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;
pub mod upstream;

use sha2::{Digest, Sha256};

pub use api::{create_router, AppState};
pub use auth::{AuthValidator, AuthValidatorParams};
pub use cache::TokenCache;
pub use config::Config;
pub use error::{AuthError, ConstructionError, ErrorKind, TypedError};
pub use models::IdentityRecord;
pub use tasks::spawn_cleanup_task;

/// Short, non-reversible label for a token, safe to log.
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    let hex = format!("{digest:x}");
    hex[..12].to_string()
}
