//! Error types for the gatehouse client.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, request, decoding, storage and input validation
//! errors.

use std::fmt;
use thiserror::Error;

/// Fallback description when the server gives no usable message.
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// The unified error type for gatehouse operations.
///
/// Callers that need to redirect on session loss should match
/// [`Error::is_session_expired`] before anything else.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (expired session, rejected credentials).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Non-success responses from the API.
    #[error("request error: {0}")]
    Request(#[from] RequestError),

    /// A success response whose body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Credential store failures.
    #[error("credential store error: {0}")]
    Store(#[from] StoreError),

    /// Input validation errors (URLs, form fields).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Returns true when the session is gone and the user must sign in again.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Error::Auth(AuthError::SessionExpired))
    }

    /// Returns true for failures that are raised on the error reporter.
    ///
    /// Network failures and API rejections are surfaced to the user; session
    /// expiry is signalled separately and client-side faults are only returned.
    pub fn is_reportable(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Request(_))
    }

    /// The HTTP status carried by a request error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Request(err) => Some(err.status),
            _ => None,
        }
    }

    /// Human-readable description suitable for a notification.
    pub fn user_message(&self) -> String {
        match self {
            Error::Request(err) => err.description().to_string(),
            other => other.to_string(),
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connection {
                message: err.to_string(),
            }
        } else {
            TransportError::Http {
                message: err.to_string(),
            }
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(TransportError::from(err))
    }
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The session could not be recovered; stored credentials were cleared.
    #[error("session expired")]
    SessionExpired,

    /// Credentials were rejected before a request was sent.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),
}

/// A non-success response from the API.
#[derive(Debug, Clone)]
pub struct RequestError {
    /// HTTP status code.
    pub status: u16,
    /// Error code or short error string from the body (if present).
    pub error: Option<String>,
    /// Error message from the server.
    pub message: Option<String>,
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref error) = self.error {
            write!(f, " [{}]", error)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for RequestError {}

impl RequestError {
    /// Create a new request error.
    pub fn new(status: u16, error: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            error,
            message,
        }
    }

    /// Check if the server rejected the request's credentials.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// The server message, else the error string, else a generic fallback.
    pub fn description(&self) -> &str {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .unwrap_or(GENERIC_ERROR_MESSAGE)
    }
}

/// Credential store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing storage failed.
    #[error("storage I/O failed: {message}")]
    Io { message: String },

    /// The backing storage holds data that cannot be parsed.
    #[error("stored credentials are corrupt: {message}")]
    Corrupt { message: String },
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// A required form field is empty.
    #[error("missing required field '{field}'")]
    MissingField { field: &'static str },

    /// Password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// A field is present but malformed.
    #[error("invalid value for '{field}': {reason}")]
    Field { field: &'static str, reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
