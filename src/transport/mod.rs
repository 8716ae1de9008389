//! HTTP seam between the fetcher and the catalog service.
//!
//! [`Transport`] is one GET, returning status and body.
//! Success/failure classification happens in the fetcher, so every
//! implementation reports non-2xx responses as `Ok(ApiResponse)` and reserves
//! `Err` for infrastructure failures (DNS, refused connections, timeouts).
//!
//! - [`HttpTransport`]: `reqwest` implementation.
//! - [`mock::MockTransport`]: expectation-driven double for tests.

pub mod http;
pub mod mock;

pub use http::HttpTransport;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Failures below the HTTP layer.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} timed out after {after:?}")]
    Timeout { url: String, after: Duration },

    /// The connection could not be established.
    #[error("Service unreachable: {0}")]
    Unreachable(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// A GET request against the catalog service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub url: String,
    /// Cookie header forwarded to private endpoints. `None` means the request
    /// goes out without credentials.
    pub cookie: Option<String>,
}

impl ApiRequest {
    pub fn public(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            cookie: None,
        }
    }

    pub fn with_credentials(url: impl Into<String>, cookie: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            cookie: Some(cookie.into()),
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.cookie.is_some()
    }
}

/// Raw response: status code plus body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}
