//! # Session identity and request context
//!
//! The retrieval layer does not issue or validate credentials. It asks two
//! collaborators what the current caller looks like:
//!
//! - [`SessionProbe`]: is there a signed-in user?
//! - [`RequestContext`]: which host did the request come in on, and which
//!   cookies should be forwarded to the private endpoints?
//!
//! Both can fail. Their errors ([`SessionError`]) propagate to callers
//! untouched so "we could not even ask" stays distinguishable from an HTTP
//! failure.

use async_trait::async_trait;
use thiserror::Error;

/// Failures of the identity and request-context collaborators.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SessionError {
    /// The session provider could not be reached or returned garbage.
    #[error("Session provider error: {0}")]
    Provider(String),

    /// Request headers could not be read.
    #[error("Header access error: {0}")]
    Headers(String),

    /// The cookie header could not be materialized.
    #[error("Cookie access error: {0}")]
    Cookies(String),
}

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPrincipal {
    pub id: String,
    pub email: Option<String>,
}

/// Result of a session lookup. A session without a principal is anonymous.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user: Option<UserPrincipal>,
}

impl Session {
    pub fn for_user(id: impl Into<String>) -> Self {
        Self {
            user: Some(UserPrincipal {
                id: id.into(),
                email: None,
            }),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.as_ref().is_some_and(|u| !u.id.is_empty())
    }
}

/// Answers "who is calling?".
#[async_trait]
pub trait SessionProbe: Send + Sync {
    async fn current_session(&self) -> Result<Option<Session>, SessionError>;
}

/// Accessors for the inbound request the retrieval runs on behalf of.
#[async_trait]
pub trait RequestContext: Send + Sync {
    /// Value of the `Host` header, if any.
    async fn host(&self) -> Result<Option<String>, SessionError>;

    /// Cookie header to forward. May be empty.
    async fn cookie_header(&self) -> Result<String, SessionError>;
}

/// A fixed session, for tools and tests that already know the caller.
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    session: Option<Session>,
}

impl StaticSession {
    pub fn anonymous() -> Self {
        Self { session: None }
    }

    pub fn authenticated(user_id: impl Into<String>) -> Self {
        Self {
            session: Some(Session::for_user(user_id)),
        }
    }
}

#[async_trait]
impl SessionProbe for StaticSession {
    async fn current_session(&self) -> Result<Option<Session>, SessionError> {
        Ok(self.session.clone())
    }
}

/// A fixed request context.
#[derive(Debug, Clone, Default)]
pub struct StaticRequestContext {
    host: Option<String>,
    cookies: String,
}

impl StaticRequestContext {
    pub fn new(host: Option<String>, cookies: impl Into<String>) -> Self {
        Self {
            host,
            cookies: cookies.into(),
        }
    }
}

#[async_trait]
impl RequestContext for StaticRequestContext {
    async fn host(&self) -> Result<Option<String>, SessionError> {
        Ok(self.host.clone())
    }

    async fn cookie_header(&self) -> Result<String, SessionError> {
        Ok(self.cookies.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_without_principal_is_anonymous() {
        assert!(!Session::default().is_authenticated());
        assert!(!Session::for_user("").is_authenticated());
        assert!(Session::for_user("u1").is_authenticated());
    }

    #[tokio::test]
    async fn test_static_collaborators() {
        let probe = StaticSession::authenticated("u1");
        let session = probe.current_session().await.unwrap().unwrap();
        assert_eq!(session.user.unwrap().id, "u1");

        let ctx = StaticRequestContext::new(Some("shelf.example".into()), "sid=abc");
        assert_eq!(ctx.host().await.unwrap().as_deref(), Some("shelf.example"));
        assert_eq!(ctx.cookie_header().await.unwrap(), "sid=abc");
    }
}
