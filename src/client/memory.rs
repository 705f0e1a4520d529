//! In-memory transport
//!
//! Answers requests from a table of routes keyed by method and path. Each
//! route is a closure so tests can vary the answer by header or body.
//! Every request is recorded so callers can count upstream hits.

use async_trait::async_trait;
use reqwest::Method;
use std::sync::{Arc, Mutex, PoisonError};

use super::{RawResponse, RequestSpec, Transport, TransportError};

type Responder = dyn Fn(&RequestSpec) -> Result<RawResponse, TransportError> + Send + Sync;

struct Route {
    method: Method,
    path: String,
    respond: Arc<Responder>,
}

/// Transport backed by an in-memory request/response table.
#[derive(Clone, Default)]
pub struct StaticTransport {
    routes: Arc<Mutex<Vec<Route>>>,
    requests: Arc<Mutex<Vec<RequestSpec>>>,
}

impl StaticTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a responder for `method` + `path` (leading `/` optional).
    pub fn route<F>(self, method: Method, path: &str, respond: F) -> Self
    where
        F: Fn(&RequestSpec) -> Result<RawResponse, TransportError> + Send + Sync + 'static,
    {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Route {
                method,
                path: normalize(path),
                respond: Arc::new(respond),
            });
        self
    }

    /// Registers a fixed response.
    pub fn respond(self, method: Method, path: &str, response: RawResponse) -> Self {
        self.route(method, path, move |_| Ok(response.clone()))
    }

    /// Registers a fixed network failure.
    pub fn fail(self, method: Method, path: &str, error: TransportError) -> Self {
        self.route(method, path, move |_| Err(error.clone()))
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<RequestSpec> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn reset_calls(&self) {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

fn normalize(path: &str) -> String {
    path.trim_start_matches('/').to_string()
}

#[async_trait]
impl Transport for StaticTransport {
    fn backend_name(&self) -> &'static str {
        "static"
    }

    async fn send(&self, request: &RequestSpec) -> Result<RawResponse, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let path = normalize(&request.path);
        let respond = {
            let routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
            routes
                .iter()
                .find(|r| r.method == request.method && r.path == path)
                .map(|r| Arc::clone(&r.respond))
        };

        match respond {
            Some(respond) => (*respond)(request),
            None => Ok(RawResponse::new(404, "Not Found")),
        }
    }
}
