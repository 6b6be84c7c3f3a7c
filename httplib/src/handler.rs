//! Response handlers and handler chains.

use crate::{Response, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Maximum number of body bytes read by [`DiscardBody`] by default.
pub const MAX_DISCARD_SIZE: u64 = 640 * 1024;

/// Validates or consumes a completed response.
#[async_trait]
pub trait ResponseHandler: Send + Sync {
    /// Handle the response. An error aborts the enclosing chain.
    async fn handle(&self, response: &mut Response) -> Result<()>;
}

/// Boxed handler, the unit stored in chains and options.
pub type BoxedHandler<'a> = Box<dyn ResponseHandler + 'a>;

#[async_trait]
impl<H> ResponseHandler for Box<H>
where
    H: ResponseHandler + ?Sized,
{
    async fn handle(&self, response: &mut Response) -> Result<()> {
        (**self).handle(response).await
    }
}

#[async_trait]
impl<H> ResponseHandler for Arc<H>
where
    H: ResponseHandler + ?Sized,
{
    async fn handle(&self, response: &mut Response) -> Result<()> {
        (**self).handle(response).await
    }
}

#[async_trait]
impl<'a, H> ResponseHandler for &'a H
where
    H: ResponseHandler + ?Sized,
{
    async fn handle(&self, response: &mut Response) -> Result<()> {
        (**self).handle(response).await
    }
}

/// An absent handler is a no-op.
#[async_trait]
impl<H> ResponseHandler for Option<H>
where
    H: ResponseHandler,
{
    async fn handle(&self, response: &mut Response) -> Result<()> {
        match self {
            Some(handler) => handler.handle(response).await,
            None => Ok(()),
        }
    }
}

/// Ordered handler composition that stops at the first error.
#[derive(Default)]
pub struct HandlerChain<'a> {
    handlers: Vec<BoxedHandler<'a>>,
}

impl<'a> HandlerChain<'a> {
    /// Create an empty chain. An empty chain always succeeds.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Append a handler.
    pub fn with<H: ResponseHandler + 'a>(mut self, handler: H) -> Self {
        self.push(handler);
        self
    }

    /// Append a handler in place.
    pub fn push<H: ResponseHandler + 'a>(&mut self, handler: H) {
        self.handlers.push(Box::new(handler));
    }

    /// Number of handlers in the chain.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the chain has no handlers.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<'a> FromIterator<BoxedHandler<'a>> for HandlerChain<'a> {
    fn from_iter<I: IntoIterator<Item = BoxedHandler<'a>>>(iter: I) -> Self {
        Self {
            handlers: iter.into_iter().collect(),
        }
    }
}

#[async_trait]
impl<'a> ResponseHandler for HandlerChain<'a> {
    async fn handle(&self, response: &mut Response) -> Result<()> {
        for handler in &self.handlers {
            handler.handle(response).await?;
        }
        Ok(())
    }
}

/// Compose handlers into a single handler applied in order.
pub fn chain_handlers<'a, I>(handlers: I) -> HandlerChain<'a>
where
    I: IntoIterator<Item = BoxedHandler<'a>>,
{
    handlers.into_iter().collect()
}

/// Handler built from a synchronous closure over the response head.
pub struct FnHandler<F>(F);

/// Adapt a closure inspecting status and headers into a handler.
///
/// The closure cannot read the body; implement [`ResponseHandler`] for that.
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(&Response) -> Result<()> + Send + Sync,
{
    FnHandler(f)
}

#[async_trait]
impl<F> ResponseHandler for FnHandler<F>
where
    F: Fn(&Response) -> Result<()> + Send + Sync,
{
    async fn handle(&self, response: &mut Response) -> Result<()> {
        (self.0)(&*response)
    }
}

/// Decodes a JSON body into a caller-owned target.
pub struct FromJson<'a, T> {
    target: Mutex<&'a mut T>,
}

/// Handler that decodes the whole body as JSON into `target`.
pub fn from_json<T>(target: &mut T) -> FromJson<'_, T>
where
    T: DeserializeOwned + Send,
{
    FromJson {
        target: Mutex::new(target),
    }
}

#[async_trait]
impl<'a, T> ResponseHandler for FromJson<'a, T>
where
    T: DeserializeOwned + Send,
{
    async fn handle(&self, response: &mut Response) -> Result<()> {
        let value: T = response.json().await?;
        **self.target.lock() = value;
        Ok(())
    }
}

/// Reads and drops the body up to a byte limit.
#[derive(Debug, Clone, Copy)]
pub struct DiscardBody {
    limit: u64,
}

impl DiscardBody {
    /// Discard up to `limit` bytes.
    pub fn with_limit(limit: u64) -> Self {
        Self { limit }
    }
}

impl Default for DiscardBody {
    fn default() -> Self {
        Self::with_limit(MAX_DISCARD_SIZE)
    }
}

/// The default response handler: drain up to [`MAX_DISCARD_SIZE`] bytes.
pub fn discard_body() -> DiscardBody {
    DiscardBody::default()
}

#[async_trait]
impl ResponseHandler for DiscardBody {
    async fn handle(&self, response: &mut Response) -> Result<()> {
        response.discard(self.limit).await?;
        Ok(())
    }
}
