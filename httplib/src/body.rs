//! Deferred request body sources.
//!
//! A [`BodySource`] produces a fresh [`Body`] every time it is invoked, so the
//! same request descriptor can be sent again after a failure or a redirect.

use crate::Result;
use bytes::Bytes;
use http::HeaderValue;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// A materialized request body.
#[derive(Debug, Clone, Default)]
pub struct Body {
    bytes: Bytes,
    content_type: Option<HeaderValue>,
}

impl Body {
    /// Create a body from raw bytes.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: None,
        }
    }

    /// Set the content type sent along with this body.
    pub fn with_content_type(mut self, content_type: HeaderValue) -> Self {
        self.content_type = Some(content_type);
        self
    }

    /// Body bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Content type, if the source set one.
    pub fn content_type(&self) -> Option<&HeaderValue> {
        self.content_type.as_ref()
    }

    /// Split into bytes and content type.
    pub fn into_parts(self) -> (Bytes, Option<HeaderValue>) {
        (self.bytes, self.content_type)
    }
}

type GetBodyFn = dyn Fn() -> Result<Body> + Send + Sync;

/// A function invoked lazily to (re)produce a request body.
#[derive(Clone)]
pub struct BodySource(Arc<GetBodyFn>);

impl BodySource {
    /// Wrap a body-producing closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> Result<Body> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Produce a new body.
    pub fn produce(&self) -> Result<Body> {
        (self.0)()
    }
}

impl fmt::Debug for BodySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodySource").finish_non_exhaustive()
    }
}

/// Body source that serializes `value` as JSON on every call.
pub fn to_json<T>(value: T) -> BodySource
where
    T: Serialize + Send + Sync + 'static,
{
    BodySource::new(move || {
        let bytes = serde_json::to_vec(&value)?;
        Ok(Body::new(bytes).with_content_type(HeaderValue::from_static("application/json")))
    })
}

/// Body source that form-urlencodes `form` on every call.
///
/// Accepts anything `serde_urlencoded` can encode: a struct, a map, or a
/// slice of key/value pairs.
pub fn form_data<T>(form: T) -> BodySource
where
    T: Serialize + Send + Sync + 'static,
{
    BodySource::new(move || {
        let encoded = serde_urlencoded::to_string(&form)?;
        Ok(Body::new(encoded).with_content_type(HeaderValue::from_static(
            "application/x-www-form-urlencoded",
        )))
    })
}

/// Body source for plain text.
pub fn text(text: impl Into<String>) -> BodySource {
    let text = Bytes::from(text.into());
    BodySource::new(move || {
        Ok(Body::new(text.clone())
            .with_content_type(HeaderValue::from_static("text/plain; charset=utf-8")))
    })
}

/// Body source for raw bytes, sent without a content type.
pub fn bytes(bytes: impl Into<Bytes>) -> BodySource {
    let bytes = bytes.into();
    BodySource::new(move || Ok(Body::new(bytes.clone())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct LoginData {
        username: String,
        password: String,
    }

    #[test]
    fn test_to_json() {
        let source = to_json(LoginData {
            username: "pinco.pallo@gmail.com".to_string(),
            password: "abbracadabbra".to_string(),
        });

        let body = source.produce().unwrap();
        assert_eq!(
            body.bytes().as_ref(),
            br#"{"username":"pinco.pallo@gmail.com","password":"abbracadabbra"}"#
        );
        assert_eq!(body.content_type().unwrap(), "application/json");
    }

    #[test]
    fn test_form_data() {
        let body = form_data(vec![("name", "John Doe"), ("lang", "rust&go")])
            .produce()
            .unwrap();
        assert_eq!(body.bytes().as_ref(), b"name=John+Doe&lang=rust%26go");
        assert_eq!(
            body.content_type().unwrap(),
            "application/x-www-form-urlencoded"
        );
    }

    #[test]
    fn test_form_data_rejects_nested_values() {
        #[derive(Serialize)]
        struct Nested {
            inner: Vec<u8>,
        }

        let err = form_data(Nested { inner: vec![1, 2] }).produce().unwrap_err();
        assert!(matches!(err, crate::HttpError::Form(_)));
    }

    #[test]
    fn test_source_is_replayable() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let source = BodySource::new(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            Ok(Body::new(format!("call {n}")))
        });

        assert_eq!(source.produce().unwrap().bytes().as_ref(), b"call 0");
        assert_eq!(source.clone().produce().unwrap().bytes().as_ref(), b"call 1");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_text_and_bytes() {
        let body = text("hello").produce().unwrap();
        assert_eq!(body.bytes().as_ref(), b"hello");
        assert!(body.content_type().is_some());

        let body = bytes(vec![0u8, 1, 2]).produce().unwrap();
        assert_eq!(body.bytes().as_ref(), &[0u8, 1, 2]);
        assert!(body.content_type().is_none());
    }
}
