//! HTTP helper error types.

use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Result type for httplib operations.
pub type Result<T> = std::result::Result<T, HttpError>;

/// Boxed error used for causes that are not known to this crate.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// HTTP helper errors.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// URL parsing error.
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// An earlier read of the response body failed.
    #[error("Failed to read response body: {0}")]
    BodyRead(String),

    /// Header name or value rejected by the `http` crate.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// The deferred body source failed to produce a body.
    #[error("Failed to produce request body: {0}")]
    Body(String),

    /// Underlying HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response status was not one of the accepted codes.
    #[error("{0}")]
    Status(#[from] StatusError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Form encoding error.
    #[error("Form encoding error: {0}")]
    Form(#[from] serde_urlencoded::ser::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error raised by a caller-supplied response handler.
    #[error("Handler error: {0}")]
    Handler(#[source] BoxError),
}

impl HttpError {
    /// Wrap an arbitrary error raised by a custom handler.
    pub fn handler<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Handler(error.into())
    }

    /// Get the status code if this error carries a [`StatusError`].
    pub fn status_code(&self) -> Option<u16> {
        find_status_error(self).map(StatusError::status_code)
    }

    /// Check whether this error carries a [`StatusError`] with one of `codes`.
    pub fn has_status(&self, codes: &[u16]) -> bool {
        has_status_err(self, codes)
    }

    /// Check whether this error is a 404 status error.
    pub fn is_not_found(&self) -> bool {
        is_not_found_error(self)
    }

    /// Get the status error, if any.
    pub fn as_status(&self) -> Option<&StatusError> {
        match self {
            Self::Status(e) => Some(e),
            _ => None,
        }
    }
}

/// Error raised when a response carries an unexpected status code.
///
/// The optional inner error is exposed through [`StdError::source`], so
/// callers can walk the chain instead of matching on message text.
#[derive(Debug)]
pub struct StatusError {
    status_code: u16,
    inner: Option<BoxError>,
}

impl StatusError {
    /// Create a status error without a cause.
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            inner: None,
        }
    }

    /// Create a status error wrapping a cause.
    pub fn with_inner<E>(status_code: u16, inner: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self {
            status_code,
            inner: Some(inner.into()),
        }
    }

    /// The observed status code.
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// The wrapped cause, if any.
    pub fn inner(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.inner.as_deref()
    }

    /// Downcast the wrapped cause to a concrete type.
    pub fn inner_as<E: StdError + 'static>(&self) -> Option<&E> {
        self.inner.as_deref().and_then(|e| e.downcast_ref::<E>())
    }

    /// Consume the error and return the wrapped cause.
    pub fn into_inner(self) -> Option<BoxError> {
        self.inner
    }
}

impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Some(inner) => write!(f, "unexpected status: {}: {}", self.status_code, inner),
            None => write!(f, "unexpected status: {}", self.status_code),
        }
    }
}

impl StdError for StatusError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.as_deref().map(|e| e as &(dyn StdError + 'static))
    }
}

fn find_status_error<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a StatusError> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(status) = e.downcast_ref::<StatusError>() {
            return Some(status);
        }
        current = e.source();
    }
    None
}

/// Returns true if `err`, or any error in its source chain, is a
/// [`StatusError`] whose code is one of `codes`.
///
/// Only the first status error found in the chain is considered.
pub fn has_status_err(err: &(dyn StdError + 'static), codes: &[u16]) -> bool {
    find_status_error(err).is_some_and(|e| codes.contains(&e.status_code))
}

/// Returns true if `err` carries a 404 status error.
pub fn is_not_found_error(err: &(dyn StdError + 'static)) -> bool {
    has_status_err(err, &[http::StatusCode::NOT_FOUND.as_u16()])
}
