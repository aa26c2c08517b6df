//! Error types for the netTime client.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, session state, remote rejections, poll
//! timeouts and input validation.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// The unified error type for netTime operations.
///
/// The only failure the client recovers from on its own is a single
/// `401` answered by a reconnect and one retry; everything else surfaces
/// here.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (connection, timeout, undecodable body).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (login rejected, missing token).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// An operation was attempted without an active session.
    #[error("state error: {0}")]
    State(#[from] StateError),

    /// The server answered with a non-2xx status.
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    /// An async task did not complete within the configured bounds.
    #[error("timeout: {0}")]
    Timeout(#[from] TimeoutError),

    /// Input validation errors (base URL, query, container action).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Returns true if this is a remote `401 Unauthorized`.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Error::Remote(remote) if remote.is_unauthenticated())
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },

    /// The response body could not be decoded as the expected JSON shape.
    #[error("could not decode response: {message}")]
    Decode { message: String },
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The login endpoint answered with a non-2xx status.
    #[error("login failed with HTTP {status}: {body}")]
    LoginFailed { status: u16, body: String },

    /// The login endpoint answered `ok: false`.
    #[error("login rejected: {}", message.as_deref().unwrap_or("no message"))]
    LoginRejected { message: Option<String> },

    /// No access token is available to build session headers from.
    #[error("missing access token")]
    MissingToken,

    /// The access token contains characters not allowed in a header.
    #[error("access token is not a valid header value")]
    InvalidToken,
}

/// Session state errors.
#[derive(Debug, Error)]
pub enum StateError {
    /// The client has no active session.
    #[error("client is not connected")]
    NotConnected,
}

/// A non-2xx answer from the remote service.
#[derive(Debug)]
pub struct RemoteError {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: String,
}

impl RemoteError {
    /// Create a new remote error.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Check if the server rejected the session.
    pub fn is_unauthenticated(&self) -> bool {
        self.status == 401
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if !self.body.is_empty() {
            write!(f, ": {}", self.body)?;
        }
        Ok(())
    }
}

impl std::error::Error for RemoteError {}

/// Poll bound exceeded while waiting on an async task.
#[derive(Debug, Error)]
#[error("task '{task_id}' not completed after {polls} polls ({}ms)", elapsed.as_millis())]
pub struct TimeoutError {
    /// The task that was being polled.
    pub task_id: String,
    /// Number of status calls issued.
    pub polls: u32,
    /// Time spent polling.
    pub elapsed: Duration,
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid base URL.
    #[error("invalid base URL '{value}': {reason}")]
    BaseUrl { value: String, reason: String },

    /// Invalid container query.
    #[error("invalid query: {reason}")]
    Query { reason: String },

    /// The server returned an empty form or element list.
    #[error("empty response for {operation}")]
    EmptyResponse { operation: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_display_includes_body() {
        let err = RemoteError::new(500, "boom");
        assert_eq!(err.to_string(), "HTTP 500: boom");
        assert_eq!(RemoteError::new(503, "").to_string(), "HTTP 503");
    }

    #[test]
    fn unauthenticated_is_detected_through_wrapper() {
        let err = Error::from(RemoteError::new(401, "expired"));
        assert!(err.is_unauthenticated());
        assert!(!Error::from(RemoteError::new(403, "")).is_unauthenticated());
        assert!(!Error::from(StateError::NotConnected).is_unauthenticated());
    }

    #[test]
    fn login_rejected_without_message() {
        let err = AuthError::LoginRejected { message: None };
        assert_eq!(err.to_string(), "login rejected: no message");
    }
}
