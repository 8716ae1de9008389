//! # Mock Transport
//!
//! Utilities for testing the fetcher and the page loader without a server.
//!
//! Queue expectations in the order requests will be made, hand the mock to
//! the code under test, then assert on [`MockTransport::requests`] and call
//! [`MockTransport::verify`].
//!
//! ```ignore
//! let mock = MockTransport::new();
//! mock.expect_get("/api/auth/books/b1").return_status(500, "boom");
//! mock.expect_get("/api/public/books/b1").return_json(json!({ "id": "b1" }));
//!
//! let fetcher = BookFetcher::new(config, Arc::new(mock.clone()), session, ctx);
//! fetcher.fetch_book("b1").await?;
//! mock.verify();
//! ```

use super::{ApiRequest, ApiResponse, Transport, TransportError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct Expectation {
    url_fragment: String,
    delay: Option<Duration>,
    response: Result<ApiResponse, TransportError>,
}

/// A [`Transport`] that answers from a queue of expectations and records
/// every request it receives.
///
/// Clones share the same queue and log.
#[derive(Clone, Default)]
pub struct MockTransport {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    requests: Arc<Mutex<Vec<ApiRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects a GET whose URL contains `url_fragment`.
    pub fn expect_get(&self, url_fragment: impl Into<String>) -> GetExpectationBuilder {
        GetExpectationBuilder {
            url_fragment: url_fragment.into(),
            delay: None,
            expectations: self.expectations.clone(),
        }
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            let pending: Vec<&str> = exps.iter().map(|e| e.url_fragment.as_str()).collect();
            panic!("Not all expectations were met. {} remaining: {:?}", exps.len(), pending);
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());

        let expectation = self.expectations.lock().unwrap().pop_front();
        let Some(expectation) = expectation else {
            panic!("Unexpected request: {}", request.url);
        };
        if !request.url.contains(&expectation.url_fragment) {
            panic!(
                "Request mismatch: expected URL containing {:?}, got {}",
                expectation.url_fragment, request.url
            );
        }

        if let Some(delay) = expectation.delay {
            tokio::time::sleep(delay).await;
        }
        expectation.response
    }
}

/// Builder for GET expectations.
pub struct GetExpectationBuilder {
    url_fragment: String,
    delay: Option<Duration>,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl GetExpectationBuilder {
    /// Delays the response, e.g. to exercise timeouts or in-flight guards.
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Responds `200` with `value` serialized as the body.
    pub fn return_json(self, value: Value) {
        self.return_status(200, value.to_string());
    }

    /// Responds with an arbitrary status and body.
    pub fn return_status(self, status: u16, body: impl Into<String>) {
        self.push(Ok(ApiResponse::new(status, body)));
    }

    /// Fails below the HTTP layer.
    pub fn return_err(self, error: TransportError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<ApiResponse, TransportError>) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation {
            url_fragment: self.url_fragment,
            delay: self.delay,
            response,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_transport_with_expectations() {
        let mock = MockTransport::new();
        mock.expect_get("/books/1").return_json(json!({ "id": "1" }));
        mock.expect_get("/books/2").return_status(503, "down");

        let first = mock.get(ApiRequest::public("http://h/books/1")).await.unwrap();
        assert!(first.is_success());
        assert_eq!(first.body, r#"{"id":"1"}"#);

        let second = mock
            .get(ApiRequest::with_credentials("http://h/books/2", "sid=1"))
            .await
            .unwrap();
        assert_eq!(second.status, 503);
        assert!(second.is_server_error());

        assert_eq!(mock.call_count(), 2);
        assert!(mock.requests()[1].has_credentials());
        mock.verify();
    }

    #[tokio::test]
    #[should_panic(expected = "Not all expectations were met")]
    async fn test_verify_reports_unmet_expectations() {
        let mock = MockTransport::new();
        mock.expect_get("/books/1").return_json(json!({}));
        mock.verify();
    }
}
