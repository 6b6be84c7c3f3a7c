//! URL composition.

use crate::{HttpError, Result};
use percent_encoding::percent_decode_str;
use url::Url;

/// Compose `base_url`, a relative `path` and query pairs into a URL.
///
/// The path is appended to the base path segment by segment: escaped
/// segments are decoded before being re-encoded, `.` is skipped and `..`
/// removes the preceding segment, base segments included. Query keys are
/// form-urlencoded and emitted sorted by key, keeping insertion order for
/// repeated keys. Query parameters already present on `base_url` are kept.
///
/// ```
/// let url = httplib::new_url(
///     "https://dev.azure.com",
///     "my-great-org/projects",
///     [("api_version", "7.0")],
/// )
/// .unwrap();
///
/// assert_eq!(url.as_str(), "https://dev.azure.com/my-great-org/projects?api_version=7.0");
/// ```
pub fn new_url<I, K, V>(base_url: &str, path: &str, query: I) -> Result<Url>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut url = Url::parse(base_url)?;
    join_path(&mut url, path)?;
    append_query(
        &mut url,
        query
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string())),
    );
    Ok(url)
}

/// Builder form of [`new_url`].
#[derive(Debug, Clone, Default)]
pub struct UrlBuilder {
    base_url: String,
    path: String,
    query: Vec<(String, String)>,
}

impl UrlBuilder {
    /// Start building from a base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the path appended to the base URL.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Add a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add multiple query parameters.
    pub fn queries<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in params {
            self.query.push((k.into(), v.into()));
        }
        self
    }

    /// Build the URL.
    pub fn build(&self) -> Result<Url> {
        new_url(&self.base_url, &self.path, self.query.iter().map(|(k, v)| (k, v)))
    }
}

fn join_path(url: &mut Url, path: &str) -> Result<()> {
    if path.is_empty() {
        return Ok(());
    }

    let trailing_slash = path.ends_with('/');
    let mut segments = url
        .path_segments_mut()
        .map_err(|_| HttpError::InvalidUrl("URL cannot be used as a base".to_string()))?;

    segments.pop_if_empty();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => {
                segments.push(&percent_decode_str(segment).decode_utf8_lossy());
            }
        }
    }
    if trailing_slash {
        segments.push("");
    }

    Ok(())
}

fn append_query(url: &mut Url, extra: impl Iterator<Item = (String, String)>) {
    let mut extra = extra.peekable();
    if extra.peek().is_none() {
        return;
    }

    let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    pairs.extend(extra);
    // stable: repeated keys keep their order
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    url.query_pairs_mut().clear().extend_pairs(pairs);
}
