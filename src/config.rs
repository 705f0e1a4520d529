//! Configuration Module
//!
//! Loads service configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::auth::AuthValidatorParams;
use crate::clients::OrcidOAuthParams;

pub const DEFAULT_TOKEN_CACHE_LIFETIME_MS: u64 = 300_000;
pub const DEFAULT_TOKEN_CACHE_MAX_SIZE: usize = 20_000;
pub const DEFAULT_ORCID_OAUTH_BASE_URL: &str = "https://sandbox.orcid.org/oauth";
pub const DEFAULT_ORCID_API_BASE_URL: &str = "https://api.sandbox.orcid.org/v3.0";
pub const DEFAULT_SERVICE_REQUEST_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_SERVER_PORT: u16 = 3000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for environment variable {0}")]
    Invalid(&'static str),
}

/// Service configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Identity-service token endpoint
    pub auth_url: String,
    pub token_cache_lifetime: Duration,
    pub token_cache_max_size: usize,
    pub orcid_oauth_base_url: String,
    pub orcid_api_base_url: String,
    pub orcid_client_id: String,
    pub orcid_client_secret: String,
    pub service_wizard_url: Option<String>,
    /// Timeout applied to every outbound call
    pub request_timeout: Duration,
    /// Background purge interval in seconds
    pub cleanup_interval: u64,
    pub server_port: u16,
}

impl Config {
    /// Loads configuration from the process environment.
    ///
    /// # Environment Variables
    /// - `AUTH_URL` - Identity-service token endpoint (required)
    /// - `TOKEN_CACHE_LIFETIME_MS` - Token cache lifetime (default: 300000)
    /// - `TOKEN_CACHE_MAX_SIZE` - Token cache capacity (default: 20000)
    /// - `ORCID_OAUTH_BASE_URL`, `ORCID_API_BASE_URL` - ORCID endpoints (default: sandbox)
    /// - `ORCID_CLIENT_ID`, `ORCID_CLIENT_SECRET` - ORCID client credentials (default: empty)
    /// - `SERVICE_WIZARD_URL` - Service Wizard endpoint (optional)
    /// - `SERVICE_REQUEST_TIMEOUT_MS` - Outbound call timeout (default: 60000)
    /// - `CACHE_CLEANUP_INTERVAL` - Purge frequency in seconds (default: 60)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`Config::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let auth_url = get("AUTH_URL").ok_or(ConfigError::Missing("AUTH_URL"))?;
        let lifetime_ms = parse_or(&get, "TOKEN_CACHE_LIFETIME_MS", DEFAULT_TOKEN_CACHE_LIFETIME_MS)?;
        let max_size = parse_or(&get, "TOKEN_CACHE_MAX_SIZE", DEFAULT_TOKEN_CACHE_MAX_SIZE)?;
        let timeout_ms = parse_or(
            &get,
            "SERVICE_REQUEST_TIMEOUT_MS",
            DEFAULT_SERVICE_REQUEST_TIMEOUT_MS,
        )?;

        if lifetime_ms == 0 {
            return Err(ConfigError::Invalid("TOKEN_CACHE_LIFETIME_MS"));
        }
        if max_size == 0 {
            return Err(ConfigError::Invalid("TOKEN_CACHE_MAX_SIZE"));
        }

        Ok(Self {
            auth_url,
            token_cache_lifetime: Duration::from_millis(lifetime_ms),
            token_cache_max_size: max_size,
            orcid_oauth_base_url: get("ORCID_OAUTH_BASE_URL")
                .unwrap_or_else(|| DEFAULT_ORCID_OAUTH_BASE_URL.to_string()),
            orcid_api_base_url: get("ORCID_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_ORCID_API_BASE_URL.to_string()),
            orcid_client_id: get("ORCID_CLIENT_ID").unwrap_or_default(),
            orcid_client_secret: get("ORCID_CLIENT_SECRET").unwrap_or_default(),
            service_wizard_url: get("SERVICE_WIZARD_URL"),
            request_timeout: Duration::from_millis(timeout_ms),
            cleanup_interval: parse_or(&get, "CACHE_CLEANUP_INTERVAL", DEFAULT_CLEANUP_INTERVAL_SECS)?,
            server_port: parse_or(&get, "SERVER_PORT", DEFAULT_SERVER_PORT)?,
        })
    }

    /// The three parameters the token validator requires.
    pub fn validator_params(&self) -> AuthValidatorParams {
        AuthValidatorParams::new(
            self.auth_url.clone(),
            self.token_cache_max_size,
            self.token_cache_lifetime,
        )
    }

    /// ORCID OAuth parameters; empty credentials count as missing.
    pub fn orcid_oauth_params(&self) -> OrcidOAuthParams {
        let non_empty = |v: &str| (!v.is_empty()).then(|| v.to_string());
        OrcidOAuthParams {
            base_url: non_empty(&self.orcid_oauth_base_url),
            client_id: non_empty(&self.orcid_client_id),
            client_secret: non_empty(&self.orcid_client_secret),
        }
    }
}

fn parse_or<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        None => Ok(default),
    }
}
