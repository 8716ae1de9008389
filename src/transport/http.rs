use super::{ApiRequest, ApiResponse, Transport, TransportError};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, COOKIE};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

/// [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    timeout: Duration,
}

impl HttpTransport {
    /// Builds a client whose requests are bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::Client)?;
        Ok(Self { client, timeout })
    }

    /// Wraps an already configured client. `timeout` should match the one
    /// the client was built with; it is only used for error reporting.
    pub fn with_client(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(url = %request.url, credentials = request.has_credentials()))]
    async fn get(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut builder = self.client.get(&request.url).header(ACCEPT, "application/json");
        if let Some(cookie) = request.cookie.as_deref().filter(|c| !c.is_empty()) {
            builder = builder.header(COOKIE, cookie);
        }

        let wrap = |source: reqwest::Error| {
            if source.is_timeout() {
                TransportError::Timeout {
                    url: request.url.clone(),
                    after: self.timeout,
                }
            } else if source.is_connect() {
                TransportError::Unreachable(format!("{}: {}", request.url, source))
            } else {
                TransportError::Http {
                    url: request.url.clone(),
                    source,
                }
            }
        };

        let response = builder.send().await.map_err(wrap)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(wrap)?;
        debug!(status, bytes = body.len(), "Response received");

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_refused_connection_is_unreachable() {
        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();

        let err = transport
            .get(ApiRequest::public("http://127.0.0.1:1/api/public/books/b1"))
            .await
            .expect_err("nothing listens on port 1");

        match err {
            TransportError::Unreachable(message) => assert!(message.starts_with("http://127.0.0.1:1/")),
            other => panic!("Expected Unreachable, got {:?}", other),
        }
    }

    #[test]
    fn test_client_error_message() {
        let source = Client::new().get("not a url").build().unwrap_err();
        let message = TransportError::Client(source).to_string();
        assert!(message.starts_with("Failed to build HTTP client: "), "{}", message);
    }
}
