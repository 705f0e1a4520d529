//! Data types shared by the clients, the validator and the HTTP surface.

pub mod identity;
pub mod orcid;
pub mod responses;
pub mod service;

// Re-export commonly used types
pub use identity::IdentityRecord;
pub use orcid::{OrcidAuth, OrcidAuthPublic};
pub use responses::{StatusResponse, TokenCacheStatus, WhoAmIResponse};
pub use service::{ServiceStatus, ServiceVersion};
