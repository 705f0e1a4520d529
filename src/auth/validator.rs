//! Token Validator
//!
//! Cache first, identity service on a miss. Only successful validations are
//! cached; invalid tokens and upstream failures are re-checked every time.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::HeaderValue;
use tracing::{debug, info};

use crate::cache::{CacheStats, TokenCache};
use crate::client::Transport;
use crate::clients::identity::IdentityClient;
use crate::error::{AuthError, ConstructionError, ErrorKind, Result, TypedError};
use crate::models::IdentityRecord;
use crate::token_fingerprint;

// == Parameters ==
/// Everything a validator needs. All three fields are required.
#[derive(Debug, Clone, Default)]
pub struct AuthValidatorParams {
    pub auth_url: Option<String>,
    pub cache_max_size: Option<usize>,
    pub cache_lifetime: Option<Duration>,
}

impl AuthValidatorParams {
    pub fn new(auth_url: impl Into<String>, cache_max_size: usize, cache_lifetime: Duration) -> Self {
        Self {
            auth_url: Some(auth_url.into()),
            cache_max_size: Some(cache_max_size),
            cache_lifetime: Some(cache_lifetime),
        }
    }

    /// Checks every field, reporting all missing ones at once.
    fn validate(self) -> std::result::Result<(String, usize, Duration), ConstructionError> {
        match (self.auth_url, self.cache_max_size, self.cache_lifetime) {
            (Some(url), Some(size), Some(lifetime)) => {
                if size == 0 {
                    return Err(ConstructionError::InvalidParameter {
                        name: "cache_max_size",
                        reason: "must be at least 1".into(),
                    });
                }
                if lifetime.is_zero() {
                    return Err(ConstructionError::InvalidParameter {
                        name: "cache_lifetime",
                        reason: "must be greater than zero".into(),
                    });
                }
                Ok((url, size, lifetime))
            }
            (url, size, lifetime) => {
                let mut missing = Vec::new();
                if url.is_none() {
                    missing.push("auth_url");
                }
                if size.is_none() {
                    missing.push("cache_max_size");
                }
                if lifetime.is_none() {
                    missing.push("cache_lifetime");
                }
                Err(ConstructionError::MissingParameters(missing))
            }
        }
    }
}

// == Auth Validator ==
/// Validates bearer tokens against the identity service, with caching.
#[derive(Clone)]
pub struct AuthValidator {
    identity: IdentityClient,
    cache: TokenCache,
}

impl AuthValidator {
    // == Constructor ==
    /// Builds a validator. Fails before any I/O if a parameter is missing.
    pub fn new(
        params: AuthValidatorParams,
        transport: Arc<dyn Transport>,
    ) -> std::result::Result<Self, ConstructionError> {
        let (auth_url, max_size, lifetime) = params.validate()?;
        let identity = IdentityClient::new(auth_url, transport)?;

        info!(
            auth_url = identity.url(),
            cache_max_size = max_size,
            cache_lifetime_ms = lifetime.as_millis() as u64,
            "Token validator initialized"
        );

        Ok(Self {
            identity,
            cache: TokenCache::new(max_size, lifetime),
        })
    }

    // == Get Identity ==
    /// Identity for `token`, from cache when possible.
    pub async fn get_identity(&self, token: &str) -> Result<IdentityRecord> {
        if token.is_empty() {
            return Err(AuthError::InvalidToken(missing_token()));
        }
        if HeaderValue::from_str(token).is_err() {
            return Err(AuthError::InvalidToken(unusable_token()));
        }

        if let Some(record) = self.cache.get(token).await {
            debug!(token = %token_fingerprint(token), "Token cache hit");
            return Ok(record);
        }

        debug!(token = %token_fingerprint(token), "Token cache miss");
        let record = self.identity.fetch_identity(token).await?;
        self.cache.put(token, record.clone()).await;
        Ok(record)
    }

    // == Get Username ==
    pub async fn get_username(&self, token: &str) -> Result<String> {
        Ok(self.get_identity(token).await?.user().to_string())
    }

    /// The validator's cache, shared with clones of this validator.
    pub fn cache(&self) -> &TokenCache {
        &self.cache
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }
}

/// A token that cannot travel in an `Authorization` header cannot be valid.
fn unusable_token() -> TypedError {
    TypedError::new(
        ErrorKind::InvalidToken,
        401,
        "invalidToken",
        "Invalid Token",
        "Token contains characters not allowed in a header",
        Default::default(),
    )
}

fn missing_token() -> TypedError {
    TypedError::new(
        ErrorKind::InvalidToken,
        401,
        "invalidToken",
        "Invalid Token",
        "No authentication token supplied",
        Default::default(),
    )
}
