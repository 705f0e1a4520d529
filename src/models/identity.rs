//! Identity record returned for a validated token.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the identity service asserts about a token.
///
/// Deserialized from the identity service's token record; unknown members are
/// ignored. Fields are read-only once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    roles: Option<BTreeSet<String>>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    token_type: Option<String>,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    created: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    expires: Option<DateTime<Utc>>,
}

impl IdentityRecord {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            name: None,
            roles: None,
            token_type: None,
            created: None,
            expires: None,
        }
    }

    #[cfg(test)]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[cfg(test)]
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = Some(roles.into_iter().map(Into::into).collect());
        self
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn roles(&self) -> Option<&BTreeSet<String>> {
        self.roles.as_ref()
    }

    pub fn token_type(&self) -> Option<&str> {
        self.token_type.as_deref()
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created
    }

    pub fn expires(&self) -> Option<DateTime<Utc>> {
        self.expires
    }
}
