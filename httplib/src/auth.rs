//! Authentication strategies.

use crate::{HttpError, Result};
use base64::Engine;
use http::HeaderValue;
use http::header::AUTHORIZATION;
use std::fmt;

/// Attaches a credential to an outgoing request.
pub trait AuthMethod: Send + Sync {
    /// Mutate `request` so it carries the credential.
    fn set_auth(&self, request: &mut reqwest::Request) -> Result<()>;
}

/// HTTP basic authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    /// User name.
    pub username: String,
    /// Password.
    pub password: String,
}

impl BasicAuth {
    /// Create basic credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl AuthMethod for BasicAuth {
    fn set_auth(&self, request: &mut reqwest::Request) -> Result<()> {
        let credentials = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", self.username, self.password));
        set_authorization(request, format!("Basic {}", credentials))
    }
}

/// Bearer token authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenAuth {
    /// The bearer token.
    pub token: String,
}

impl TokenAuth {
    /// Create bearer credentials.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl fmt::Debug for TokenAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenAuth")
            .field("token", &"<redacted>")
            .finish()
    }
}

impl AuthMethod for TokenAuth {
    fn set_auth(&self, request: &mut reqwest::Request) -> Result<()> {
        set_authorization(request, format!("Bearer {}", self.token))
    }
}

fn set_authorization(request: &mut reqwest::Request, value: String) -> Result<()> {
    let mut value = HeaderValue::try_from(value)
        .map_err(|e| HttpError::InvalidHeader(format!("authorization: {}", e)))?;
    value.set_sensitive(true);
    request.headers_mut().insert(AUTHORIZATION, value);
    Ok(())
}
