//! Request descriptors.

use crate::{BodySource, HttpError, Result};
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use std::time::Duration;
use url::Url;

/// A replayable HTTP request.
///
/// The descriptor keeps a [`BodySource`] instead of a body, and every call to
/// [`Request::build`] produces a brand new `reqwest::Request` with a freshly
/// generated body.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<BodySource>,
    timeout: Option<Duration>,
}

impl Request {
    /// Create a request for `method` and `url`.
    ///
    /// The body source, if any, is invoked once up front so encoding errors
    /// surface here rather than on send.
    pub fn new(method: Method, url: impl AsRef<str>, body: Option<BodySource>) -> Result<Self> {
        let url = Url::parse(url.as_ref())?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(HttpError::InvalidUrl(format!(
                "unsupported scheme '{}' in {}",
                url.scheme(),
                url
            )));
        }

        if let Some(source) = &body {
            source.produce()?;
        }

        Ok(Self {
            method,
            url,
            headers: HeaderMap::new(),
            body,
            timeout: None,
        })
    }

    /// Set a header, replacing any previous value.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| HttpError::InvalidHeader(e.to_string()))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| HttpError::InvalidHeader(e.to_string()))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Add multiple headers.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Set a timeout for this request only.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Target URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Request headers set on the descriptor.
    pub fn header_map(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable access to the request headers.
    pub fn header_map_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// The deferred body source.
    pub fn body_source(&self) -> Option<&BodySource> {
        self.body.as_ref()
    }

    /// Per-request timeout.
    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout
    }

    /// Materialize a `reqwest::Request`, regenerating the body.
    ///
    /// A content type set explicitly on the descriptor wins over the one
    /// provided by the body source.
    pub fn build(&self) -> Result<reqwest::Request> {
        let mut request = reqwest::Request::new(self.method.clone(), self.url.clone());
        *request.headers_mut() = self.headers.clone();

        if let Some(source) = &self.body {
            let (bytes, content_type) = source.produce()?.into_parts();
            if let Some(content_type) = content_type {
                request
                    .headers_mut()
                    .entry(CONTENT_TYPE)
                    .or_insert(content_type);
            }
            *request.body_mut() = Some(reqwest::Body::from(bytes));
        }

        *request.timeout_mut() = self.timeout;

        Ok(request)
    }
}

/// Create a GET request.
pub fn get(url: impl AsRef<str>) -> Result<Request> {
    Request::new(Method::GET, url, None)
}

/// Create a POST request with a body source.
pub fn post(url: impl AsRef<str>, body: BodySource) -> Result<Request> {
    Request::new(Method::POST, url, Some(body))
}

/// Create a PUT request with a body source.
pub fn put(url: impl AsRef<str>, body: BodySource) -> Result<Request> {
    Request::new(Method::PUT, url, Some(body))
}

/// Create a PATCH request with a body source.
pub fn patch(url: impl AsRef<str>, body: BodySource) -> Result<Request> {
    Request::new(Method::PATCH, url, Some(body))
}

/// Create a DELETE request.
pub fn delete(url: impl AsRef<str>) -> Result<Request> {
    Request::new(Method::DELETE, url, None)
}
