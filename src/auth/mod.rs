//! Token validation
//!
//! Entry point for the rest of the service: turns a bearer token into an
//! identity, consulting the token cache before the identity service.

mod validator;

pub use validator::{AuthValidator, AuthValidatorParams};
