//! Outbound request description
//!
//! A value object for one outbound call. Built per call, discarded after.

use reqwest::Method;
use serde_json::Value;
use url::form_urlencoded;

// == Request Body ==
/// Body of an outbound request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Serialized as JSON
    Json(Value),
    /// Serialized as `application/x-www-form-urlencoded`
    Form(Vec<(String, String)>),
}

impl RequestBody {
    /// Returns the encoded body text.
    pub fn encode(&self) -> String {
        match self {
            RequestBody::Json(value) => value.to_string(),
            RequestBody::Form(pairs) => form_urlencoded::Serializer::new(String::new())
                .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
                .finish(),
        }
    }

    /// Content type implied by the body, used when no explicit header is set.
    pub fn content_type(&self) -> &'static str {
        match self {
            RequestBody::Json(_) => "application/json",
            RequestBody::Form(_) => "application/x-www-form-urlencoded",
        }
    }
}

// == Request Spec ==
/// Describes one outbound call.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub base_url: String,
    pub path: String,
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl RequestSpec {
    pub fn new(method: Method, base_url: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            path: path.into(),
            method,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(base_url: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(Method::GET, base_url, path)
    }

    pub fn post(base_url: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(Method::POST, base_url, path)
    }

    pub fn put(base_url: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(Method::PUT, base_url, path)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn form<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let pairs = pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self.body = Some(RequestBody::Form(pairs));
        self
    }

    /// Full target URL. An empty path targets the base URL itself.
    pub fn url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = self.path.trim_start_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{path}")
        }
    }

    /// Case-insensitive header lookup.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
