//! # Resource Fetcher
//!
//! [`BookFetcher`] fetches one book with identity-aware routing:
//!
//! 1. Signed-in callers hit `/api/auth/books/{id}` with their cookies.
//!    A 5xx there falls back once to `/api/public/books/{id}` without
//!    credentials; a 4xx is final.
//! 2. Anonymous callers only ever hit `/api/public/books/{id}`.
//!
//! `Ok(None)` is reserved for the "not found" status marker inside a
//! successful payload. Every other failure is an error.
//!
//! The fetcher is also the [`PageSource`] for collections, serving pages
//! from `/api/public/books?profileId=..&page=..&size=..`.

mod decode;
pub mod error;

pub use error::*;

use crate::config::LibraryConfig;
use crate::model::{BookResource, Page};
use crate::pagination::{PageError, PageSource};
use crate::session::{RequestContext, Session, SessionProbe};
use crate::transport::{ApiRequest, ApiResponse, Transport, TransportError};
use async_trait::async_trait;
use decode::{decode_authoritative, decode_page, decode_resource};
use reqwest::Url;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

const PRIVATE_BOOKS: [&str; 3] = ["api", "auth", "books"];
const PUBLIC_BOOKS: [&str; 3] = ["api", "public", "books"];

pub struct BookFetcher {
    config: Arc<LibraryConfig>,
    transport: Arc<dyn Transport>,
    session: Arc<dyn SessionProbe>,
    context: Arc<dyn RequestContext>,
}

impl BookFetcher {
    pub fn new(
        config: Arc<LibraryConfig>,
        transport: Arc<dyn Transport>,
        session: Arc<dyn SessionProbe>,
        context: Arc<dyn RequestContext>,
    ) -> Self {
        Self {
            config,
            transport,
            session,
            context,
        }
    }

    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    /// Fetches one book. `Ok(None)` means the catalog said it does not exist.
    #[instrument(skip(self))]
    pub async fn fetch_book(&self, id: &str) -> Result<Option<BookResource>, BookError> {
        if id.trim().is_empty() {
            return Err(BookError::Validation("book id must not be empty".to_string()));
        }

        let session = self.session.current_session().await?;
        let origin = self.origin().await?;

        if session.as_ref().is_some_and(Session::is_authenticated) {
            self.fetch_private(&origin, id).await
        } else {
            self.fetch_public(&origin, id).await
        }
    }

    async fn fetch_private(&self, origin: &Url, id: &str) -> Result<Option<BookResource>, BookError> {
        let cookie = self.context.cookie_header().await?;
        let url = endpoint(origin, &PRIVATE_BOOKS, Some(id))?;
        let response = self.send(ApiRequest::with_credentials(url, cookie)).await?;

        if response.is_success() {
            return decode_resource(&response.body);
        }
        if !response.is_server_error() {
            warn!(id, status = response.status, "Private fetch rejected");
            return Err(fetch_error(response));
        }

        warn!(id, status = response.status, "Private fetch failed, falling back to public endpoint");
        let public_url = endpoint(origin, &PUBLIC_BOOKS, Some(id))?;
        let fallback = self.send(ApiRequest::public(public_url)).await?;

        if fallback.is_success() {
            debug!(id, "Serving public data after private failure");
            return decode_authoritative(&fallback.body).map(Some);
        }

        warn!(
            id,
            private_status = response.status,
            public_status = fallback.status,
            "Fallback fetch failed"
        );
        Err(fetch_error(response))
    }

    async fn fetch_public(&self, origin: &Url, id: &str) -> Result<Option<BookResource>, BookError> {
        let url = endpoint(origin, &PUBLIC_BOOKS, Some(id))?;
        let response = self.send(ApiRequest::public(url)).await?;

        if response.is_success() {
            decode_resource(&response.body)
        } else {
            warn!(id, status = response.status, "Public fetch failed");
            Err(fetch_error(response))
        }
    }

    /// Fetches one page of `subject`'s collection from the public endpoint.
    ///
    /// A 404, or the "not found" marker, is an empty final page.
    #[instrument(skip(self))]
    pub async fn fetch_collection_page(
        &self,
        subject: &str,
        page: usize,
        size: usize,
    ) -> Result<Page<BookResource>, BookError> {
        if subject.trim().is_empty() {
            return Err(BookError::Validation("profile id must not be empty".to_string()));
        }

        let origin = self.origin().await?;
        let mut url = endpoint(&origin, &PUBLIC_BOOKS, None)?;
        url.query_pairs_mut()
            .append_pair("profileId", subject)
            .append_pair("page", &page.to_string())
            .append_pair("size", &size.to_string());

        let response = self.send(ApiRequest::public(url)).await?;
        if response.status == 404 {
            debug!(subject, page, "Collection not found, treating as empty");
            return Ok(Page::empty());
        }
        if !response.is_success() {
            warn!(subject, page, status = response.status, "Collection page fetch failed");
            return Err(fetch_error(response));
        }

        decode_page(&response.body, size)
    }

    /// `{scheme}://{host}` for the current request.
    async fn origin(&self) -> Result<Url, BookError> {
        let host = self
            .context
            .host()
            .await?
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| self.config.default_host.clone());
        let raw = format!("{}://{}", self.config.environment.scheme(), host.trim());
        Url::parse(&raw).map_err(|e| BookError::InvalidUrl(format!("{}: {}", raw, e)))
    }

    /// Sends through the transport, bounded by the configured timeout.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, BookError> {
        let after = self.config.request_timeout();
        let url = request.url.clone();
        debug!(%url, credentials = request.has_credentials(), "Sending request");

        match tokio::time::timeout(after, self.transport.get(request)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(TransportError::Timeout { url, after }.into()),
        }
    }
}

#[async_trait]
impl PageSource<BookResource> for BookFetcher {
    async fn fetch_page(&self, subject: &str, page: usize, size: usize) -> Result<Page<BookResource>, PageError> {
        Ok(self.fetch_collection_page(subject, page, size).await?)
    }
}

fn endpoint(origin: &Url, base: &[&str], id: Option<&str>) -> Result<Url, BookError> {
    let mut url = origin.clone();
    url.path_segments_mut()
        .map_err(|_| BookError::InvalidUrl(origin.to_string()))?
        .clear()
        .extend(base)
        .extend(id);
    Ok(url)
}

fn fetch_error(response: ApiResponse) -> BookError {
    BookError::Fetch {
        status: response.status,
        body: response.body,
    }
}
