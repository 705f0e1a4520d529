//! Concrete upstream clients built on [`OutboundClient`](crate::client::OutboundClient).

pub mod dynamic_service;
pub mod identity;
pub mod jsonrpc;
pub mod orcid_api;
pub mod orcid_oauth;
pub mod service_wizard;

pub use dynamic_service::DynamicServiceClient;
pub use identity::IdentityClient;
pub use jsonrpc::JsonRpcClient;
pub use orcid_api::OrcidApiClient;
pub use orcid_oauth::{OrcidOAuthClient, OrcidOAuthParams};
pub use service_wizard::ServiceWizardClient;
