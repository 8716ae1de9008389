//! Error types for book retrieval.

use crate::session::SessionError;
use crate::transport::TransportError;
use thiserror::Error;

/// Errors that can occur while fetching a book or a collection page.
///
/// `Validation`, `Fetch` and `Decode` describe what the catalog said (or
/// would have been asked). `Transport` and `Session` are infrastructure
/// failures and are passed through as they were raised.
#[derive(Debug, Error)]
pub enum BookError {
    /// The caller supplied an unusable identifier. Nothing was sent.
    #[error("Book validation error: {0}")]
    Validation(String),

    /// The catalog answered with a non-success status.
    #[error("Book fetch failed with status {status}")]
    Fetch { status: u16, body: String },

    /// The catalog answered successfully but the body is not a book.
    #[error("Book decode error: {0}")]
    Decode(String),

    /// The request origin could not be turned into a URL.
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl BookError {
    /// HTTP status for `Fetch` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            BookError::Fetch { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the request could not be made at all.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, BookError::Transport(_) | BookError::Session(_))
    }
}
