//! Status validators.

use crate::{Response, ResponseHandler, Result, StatusError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::error::Error as StdError;
use std::marker::PhantomData;

/// Status codes accepted when no validator is supplied.
pub const DEFAULT_ACCEPTED_STATUSES: [u16; 5] = [200, 201, 202, 203, 204];

/// Fails with a [`StatusError`] unless the status is in the accepted set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckStatus {
    accept: Vec<u16>,
}

impl CheckStatus {
    /// Accept exactly `codes`.
    pub fn new(codes: impl IntoIterator<Item = u16>) -> Self {
        Self {
            accept: codes.into_iter().collect(),
        }
    }

    /// Accept the usual success codes: 200, 201, 202, 203 and 204.
    pub fn success() -> Self {
        Self::new(DEFAULT_ACCEPTED_STATUSES)
    }

    /// Whether `code` is accepted.
    pub fn accepts(&self, code: u16) -> bool {
        self.accept.contains(&code)
    }
}

/// Validate that the response has one of the accepted status codes.
pub fn check_status(codes: impl IntoIterator<Item = u16>) -> CheckStatus {
    CheckStatus::new(codes)
}

#[async_trait]
impl ResponseHandler for CheckStatus {
    async fn handle(&self, response: &mut Response) -> Result<()> {
        let code = response.status().as_u16();
        if self.accepts(code) {
            return Ok(());
        }
        Err(StatusError::new(code).into())
    }
}

/// Like [`CheckStatus`], but decodes an error payload on failure.
///
/// On an unexpected status the body is decoded as JSON into `E`, and the
/// returned [`StatusError`] wraps the decoded value. If the body cannot be
/// read or decoded, the read or decode error is wrapped instead, so an
/// empty body carries an end-of-input decode error.
pub struct ErrorJson<E> {
    accept: CheckStatus,
    _payload: PhantomData<fn() -> E>,
}

/// Validate the status, decoding failures into the error type `E`.
pub fn error_json<E>(codes: impl IntoIterator<Item = u16>) -> ErrorJson<E>
where
    E: DeserializeOwned + StdError + Send + Sync + 'static,
{
    ErrorJson {
        accept: CheckStatus::new(codes),
        _payload: PhantomData,
    }
}

#[async_trait]
impl<E> ResponseHandler for ErrorJson<E>
where
    E: DeserializeOwned + StdError + Send + Sync + 'static,
{
    async fn handle(&self, response: &mut Response) -> Result<()> {
        let code = response.status().as_u16();
        if self.accept.accepts(code) {
            return Ok(());
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => return Err(StatusError::with_inner(code, e).into()),
        };

        let error = match serde_json::from_slice::<E>(&body) {
            Ok(payload) => StatusError::with_inner(code, payload),
            Err(e) => StatusError::with_inner(code, e),
        };
        Err(error.into())
    }
}
