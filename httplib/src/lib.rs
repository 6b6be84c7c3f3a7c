//! # httplib
//!
//! Ergonomic helpers around a pooled `reqwest` client: URL composition,
//! replayable request descriptors, authentication, response validation and
//! decoding, and wire-format request/response dumps.
//!
//! ## Features
//!
//! - **URL builder**: base URL + path + sorted, encoded query parameters
//! - **Replayable requests**: bodies come from a [`BodySource`] that is
//!   re-invoked on every send
//! - **Auth strategies**: HTTP basic and bearer token
//! - **Handler chains**: validators and decoders run in order, stopping at
//!   the first failure
//! - **Typed status errors**: test for "was this a 404" without matching
//!   on error text
//! - **Verbose dumps**: raw request/response dumps to any writer
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use httplib::{FireOptions, UrlBuilder, fire, from_json, get, new_client};
//! use std::collections::HashMap;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let url = UrlBuilder::new("http://httpbin.org").path("user-agent").build()?;
//!     let request = get(url)?.header("User-Agent", "httplib example")?;
//!
//!     let mut res: HashMap<String, String> = HashMap::new();
//!     fire(&new_client()?, &request, FireOptions::new().handler(from_json(&mut res))).await?;
//!
//!     println!("{}", res["user-agent"]);
//!     Ok(())
//! }
//! ```
//!
//! ## Checking Status Codes
//!
//! ```rust,no_run
//! use httplib::{FireOptions, check_status, fire, get, is_not_found_error, new_client};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let request = get("http://example.com/404")?;
//!     let options = FireOptions::new().validator(check_status([200]));
//!
//!     if let Err(err) = fire(&new_client()?, &request, options).await {
//!         if is_not_found_error(&err) {
//!             println!("got a 404");
//!         }
//!     }
//!     Ok(())
//! }
//! ```

mod auth;
pub mod body;
mod client;
mod config;
mod connection;
mod dump;
mod error;
mod handler;
mod request;
mod response;
mod url_builder;
mod validators;

pub use auth::{AuthMethod, BasicAuth, TokenAuth};
pub use body::{Body, BodySource, form_data, to_json};
pub use client::{FireOptions, fire, handle_response, new_client};
pub use config::{HttpClientConfig, HttpClientConfigBuilder};
pub use connection::Connection;
pub use dump::{dump_request, dump_response};
pub use error::{BoxError, HttpError, Result, StatusError, has_status_err, is_not_found_error};
pub use handler::{
    BoxedHandler, DiscardBody, FnHandler, FromJson, HandlerChain, MAX_DISCARD_SIZE,
    ResponseHandler, chain_handlers, discard_body, from_json, handler_fn,
};
pub use request::{Request, delete, get, patch, post, put};
pub use response::Response;
pub use url_builder::{UrlBuilder, new_url};
pub use validators::{CheckStatus, DEFAULT_ACCEPTED_STATUSES, ErrorJson, check_status, error_json};

// Re-export common types
pub use bytes::Bytes;
pub use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
pub use url::Url;

/// Prelude for common imports.
///
/// ```
/// use httplib::prelude::*;
/// ```
pub mod prelude {
    pub use crate::auth::{AuthMethod, BasicAuth, TokenAuth};
    pub use crate::body::{BodySource, form_data, to_json};
    pub use crate::client::{FireOptions, fire, new_client};
    pub use crate::config::HttpClientConfig;
    pub use crate::connection::Connection;
    pub use crate::error::{HttpError, Result, StatusError, has_status_err, is_not_found_error};
    pub use crate::handler::{HandlerChain, ResponseHandler, from_json};
    pub use crate::request::Request;
    pub use crate::response::Response;
    pub use crate::url_builder::{UrlBuilder, new_url};
    pub use crate::validators::{check_status, error_json};
    pub use http::{Method, StatusCode};
}
