//! HTTP response wrapper.

use crate::{HttpError, Result};
use bytes::Bytes;
use http::{HeaderMap, StatusCode, Version};
use serde::de::DeserializeOwned;

/// HTTP response handed to validators and handlers.
///
/// Status line and headers are available immediately. The body is read on
/// demand: [`Response::bytes`] buffers it once and every later call sees the
/// same bytes, while [`Response::discard`] drains it without keeping it.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    version: Version,
    headers: HeaderMap,
    url: url::Url,
    body: BodyState,
}

#[derive(Debug)]
enum BodyState {
    Pending(reqwest::Response),
    Buffered(Bytes),
    Released,
    /// A read failed part way; the message is replayed to later readers.
    Failed(String),
}

impl Response {
    /// Wrap a reqwest response without reading its body.
    pub fn from_reqwest(response: reqwest::Response) -> Self {
        Self {
            status: response.status(),
            version: response.version(),
            headers: response.headers().clone(),
            url: response.url().clone(),
            body: BodyState::Pending(response),
        }
    }

    /// Get the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get the HTTP version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Get the response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a specific header value.
    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.headers
            .get(name.as_ref())
            .and_then(|v| v.to_str().ok())
    }

    /// Get the response URL.
    pub fn url(&self) -> &url::Url {
        &self.url
    }

    /// Get the content type if available.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Check if the response was successful (2xx).
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body bytes, if they have already been buffered.
    pub fn buffered(&self) -> Option<&Bytes> {
        match &self.body {
            BodyState::Buffered(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Read the whole body, buffering it for later readers.
    ///
    /// Returns an empty body if it was already discarded. If reading fails,
    /// this and every later read return an error.
    pub async fn bytes(&mut self) -> Result<Bytes> {
        match std::mem::replace(&mut self.body, BodyState::Released) {
            BodyState::Pending(response) => match response.bytes().await {
                Ok(body) => {
                    self.body = BodyState::Buffered(body.clone());
                    Ok(body)
                }
                Err(e) => {
                    self.body = BodyState::Failed(e.to_string());
                    Err(e.into())
                }
            },
            BodyState::Buffered(body) => {
                self.body = BodyState::Buffered(body.clone());
                Ok(body)
            }
            BodyState::Released => Ok(Bytes::new()),
            BodyState::Failed(message) => {
                self.body = BodyState::Failed(message.clone());
                Err(HttpError::BodyRead(message))
            }
        }
    }

    /// Read the body as UTF-8 text (lossy).
    pub async fn text(&mut self) -> Result<String> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Decode the body as JSON.
    pub async fn json<T: DeserializeOwned>(&mut self) -> Result<T> {
        let bytes = self.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Read and drop at most `limit` bytes of an unread body, then release it.
    ///
    /// Returns how many bytes were read, never more than `limit`. A body that
    /// was already buffered or released is left as is and reports zero; one
    /// whose earlier read failed reports that failure.
    pub async fn discard(&mut self, limit: u64) -> Result<u64> {
        let mut response = match std::mem::replace(&mut self.body, BodyState::Released) {
            BodyState::Pending(response) => response,
            BodyState::Failed(message) => {
                self.body = BodyState::Failed(message.clone());
                return Err(HttpError::BodyRead(message));
            }
            other => {
                self.body = other;
                return Ok(0);
            }
        };

        let mut read = 0u64;
        while read < limit {
            match response.chunk().await {
                Ok(Some(chunk)) => read += (chunk.len() as u64).min(limit - read),
                Ok(None) => return Ok(read),
                Err(e) => {
                    self.body = BodyState::Failed(e.to_string());
                    return Err(e.into());
                }
            }
        }

        tracing::debug!(
            url = %self.url,
            limit,
            "Response body reached discard limit, dropping the rest"
        );
        Ok(read)
    }

    /// Drop an unread body, closing its connection.
    ///
    /// Returns true if a pending body was released by this call.
    pub fn release(&mut self) -> bool {
        if self.is_body_pending() {
            self.body = BodyState::Released;
            true
        } else {
            false
        }
    }

    /// Whether the body is still attached to the connection.
    pub fn is_body_pending(&self) -> bool {
        matches!(self.body, BodyState::Pending(_))
    }
}

impl<T> From<http::Response<T>> for Response
where
    T: Into<reqwest::Body>,
{
    fn from(response: http::Response<T>) -> Self {
        Self::from_reqwest(reqwest::Response::from(response))
    }
}
