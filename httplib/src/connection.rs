//! Reusable connection wrapper.

use crate::client::{FireOptions, fire};
use crate::handler::{BoxedHandler, HandlerChain};
use crate::url_builder::new_url;
use crate::{AuthMethod, HttpClientConfig, HttpError, Request, Response, ResponseHandler, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use url::Url;

/// A client, credential, base URL and verbosity bundled for repeated calls.
///
/// Cloning is cheap and clones share the underlying connection pool.
#[derive(Clone)]
pub struct Connection {
    client: reqwest::Client,
    config: Arc<HttpClientConfig>,
    base_url: Option<Url>,
    auth: Option<Arc<dyn AuthMethod>>,
}

impl Connection {
    /// Create a connection, building its client from `config`.
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let client = config.build_client()?;
        let base_url = config.base_url.as_deref().map(Url::parse).transpose()?;

        Ok(Self {
            client,
            config: Arc::new(config),
            base_url,
            auth: None,
        })
    }

    /// Replace the client with a pre-configured one.
    ///
    /// Transport settings in the configuration no longer apply; base URL and
    /// verbosity still do.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Authenticate every request with `auth`.
    pub fn with_auth<A: AuthMethod + 'static>(mut self, auth: A) -> Self {
        self.auth = Some(Arc::new(auth));
        self
    }

    /// Get the underlying reqwest client.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Get the connection configuration.
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Get the parsed base URL.
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Build a URL relative to the configured base URL.
    pub fn url<I, K, V>(&self, path: &str, query: I) -> Result<Url>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let base = self
            .base_url
            .as_ref()
            .ok_or_else(|| HttpError::InvalidUrl("no base URL configured".to_string()))?;
        new_url(base.as_str(), path, query)
    }

    /// Send `request` with the connection defaults filled into `options`.
    ///
    /// The connection credential is used unless `options` carries one, and
    /// verbose dumps are on if either side asks for them.
    pub async fn fire<'a>(
        &'a self,
        request: &Request,
        mut options: FireOptions<'a>,
    ) -> Result<()> {
        if options.auth.is_none() {
            options.auth = self
                .auth
                .as_ref()
                .map(|auth| auth.as_ref() as &dyn AuthMethod);
        }
        options.verbose |= self.config.verbose;
        fire(&self.client, request, options).await
    }

    /// Send `request`, run `validators` and then `handler`.
    ///
    /// Empty validators and a missing handler fall back to the defaults of
    /// [`crate::handle_response`].
    pub async fn execute<'a>(
        &'a self,
        request: &Request,
        handler: Option<BoxedHandler<'a>>,
        validators: HandlerChain<'a>,
    ) -> Result<()> {
        let options = FireOptions {
            response_handler: handler,
            validators,
            ..Default::default()
        };
        self.fire(request, options).await
    }

    /// Send `request` and decode a successful response body as JSON.
    pub async fn fetch_json<T>(&self, request: &Request) -> Result<T>
    where
        T: DeserializeOwned + Send,
    {
        let capture = Capture::<T>(Mutex::new(None));
        self.fire(request, FireOptions::new().handler(&capture)).await?;

        capture
            .0
            .into_inner()
            .ok_or_else(|| HttpError::handler("response handler produced no value"))
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("base_url", &self.base_url.as_ref().map(Url::as_str))
            .field("auth", &self.auth.is_some())
            .field("verbose", &self.config.verbose)
            .finish()
    }
}

struct Capture<T>(Mutex<Option<T>>);

#[async_trait]
impl<T> ResponseHandler for Capture<T>
where
    T: DeserializeOwned + Send,
{
    async fn handle(&self, response: &mut Response) -> Result<()> {
        let value: T = response.json().await?;
        *self.0.lock() = Some(value);
        Ok(())
    }
}
