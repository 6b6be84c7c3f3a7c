//! Request execution.

use crate::dump::{dump_request, dump_response};
use crate::handler::{BoxedHandler, HandlerChain, discard_body};
use crate::{
    AuthMethod, CheckStatus, HttpClientConfig, Request, Response, ResponseHandler, Result,
};
use std::io::Write;
use tracing::{debug, warn};

/// Create a pooled client with the default configuration.
pub fn new_client() -> Result<reqwest::Client> {
    HttpClientConfig::default().build_client()
}

/// Per-call options for [`fire`].
#[derive(Default)]
pub struct FireOptions<'a> {
    /// Credential attached to the outgoing request.
    pub auth: Option<&'a dyn AuthMethod>,
    /// Handler run after validation. Defaults to draining the body.
    pub response_handler: Option<BoxedHandler<'a>>,
    /// Validators run before the handler. Defaults to [`CheckStatus::success`].
    pub validators: HandlerChain<'a>,
    /// Dump the request and response.
    pub verbose: bool,
    /// Sink for verbose dumps. Defaults to stderr.
    pub dump_to: Option<&'a mut (dyn Write + Send)>,
}

impl<'a> FireOptions<'a> {
    /// Options with every default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a credential.
    pub fn auth(mut self, auth: &'a dyn AuthMethod) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Set the response handler.
    pub fn handler<H: ResponseHandler + 'a>(mut self, handler: H) -> Self {
        self.response_handler = Some(Box::new(handler));
        self
    }

    /// Append a validator.
    pub fn validator<H: ResponseHandler + 'a>(mut self, validator: H) -> Self {
        self.validators.push(validator);
        self
    }

    /// Enable or disable verbose dumps.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Send verbose dumps to `out` instead of stderr.
    pub fn dump_to(mut self, out: &'a mut (dyn Write + Send)) -> Self {
        self.dump_to = Some(out);
        self
    }
}

/// Send `request` with `client`, then validate and handle the response.
///
/// The response is owned by this call and released before it returns, on
/// success and on every error path.
pub async fn fire(
    client: &reqwest::Client,
    request: &Request,
    options: FireOptions<'_>,
) -> Result<()> {
    let FireOptions {
        auth,
        response_handler,
        validators,
        verbose,
        dump_to,
    } = options;

    let mut outgoing = request.build()?;
    if let Some(auth) = auth {
        auth.set_auth(&mut outgoing)?;
    }

    let mut stderr = std::io::stderr();
    let out: &mut (dyn Write + Send) = match dump_to {
        Some(out) => out,
        None => &mut stderr,
    };

    if verbose && let Err(e) = dump_request(&outgoing, out, true) {
        warn!(error = %e, "Failed to dump HTTP request");
    }

    // streaming watch responses must not be buffered by the dump
    let dump_body = !is_watch(outgoing.url());

    debug!(
        method = %outgoing.method(),
        url = %outgoing.url(),
        "Sending HTTP request"
    );
    let mut response = Response::from_reqwest(client.execute(outgoing).await?);
    debug!(
        status = %response.status(),
        url = %response.url(),
        "Received HTTP response"
    );

    if verbose && let Err(e) = dump_response(&mut response, out, dump_body).await {
        warn!(error = %e, "Failed to dump HTTP response");
    }

    let result = handle_response(&mut response, response_handler.as_deref(), &validators).await;
    response.release();
    result
}

/// Run `validators`, then `handler`, against `response`.
///
/// An empty validator chain means [`CheckStatus::success`]; a missing
/// handler means draining the body. The handler does not run if any
/// validator fails.
pub async fn handle_response(
    response: &mut Response,
    handler: Option<&dyn ResponseHandler>,
    validators: &HandlerChain<'_>,
) -> Result<()> {
    if validators.is_empty() {
        CheckStatus::success().handle(response).await?;
    } else {
        validators.handle(response).await?;
    }

    match handler {
        Some(handler) => handler.handle(response).await,
        None => discard_body().handle(response).await,
    }
}

fn is_watch(url: &url::Url) -> bool {
    url.query_pairs().any(|(k, v)| k == "watch" && v == "true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{check_status, from_json, handler_fn};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn response(status: u16, body: &'static str) -> Response {
        http::Response::builder()
            .status(status)
            .body(body)
            .unwrap()
            .into()
    }

    #[test]
    fn test_new_client() {
        assert!(new_client().is_ok());
    }

    #[test]
    fn test_is_watch() {
        assert!(is_watch(&"http://k8s/api/pods?watch=true".parse().unwrap()));
        assert!(!is_watch(&"http://k8s/api/pods?watch=false".parse().unwrap()));
        assert!(!is_watch(&"http://k8s/api/pods".parse().unwrap()));
    }

    #[tokio::test]
    async fn test_handle_response_defaults() {
        let mut res = response(204, "");
        handle_response(&mut res, None, &HandlerChain::new())
            .await
            .unwrap();
        assert!(!res.is_body_pending());

        let mut res = response(404, "missing");
        let err = handle_response(&mut res, None, &HandlerChain::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_validator_failure_skips_handler() {
        let called = Arc::new(AtomicBool::new(false));
        let flag = called.clone();
        let handler = handler_fn(move |_| {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });

        let validators = HandlerChain::new().with(check_status([200]));
        let mut res = response(500, "boom");
        let err = handle_response(&mut res, Some(&handler), &validators)
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), Some(500));
        assert!(!called.load(Ordering::SeqCst));

        // left to the caller, which releases it exactly once
        assert!(res.is_body_pending());
        assert!(res.release());
        assert!(!res.release());
    }

    #[tokio::test]
    async fn test_custom_validators_replace_default() {
        let mut target = serde_json::Value::Null;
        let handler = from_json(&mut target);
        let validators = HandlerChain::new().with(check_status([404]));

        let mut res = response(404, r#"{"error":"not found"}"#);
        handle_response(&mut res, Some(&handler), &validators)
            .await
            .unwrap();
        drop(handler);

        assert_eq!(target["error"], "not found");
    }

    #[test]
    fn test_fire_options_builder() {
        let auth = crate::TokenAuth::new("t");
        let mut sink = Vec::new();
        let options = FireOptions::new()
            .auth(&auth)
            .validator(check_status([200]))
            .validator(check_status([200, 201]))
            .handler(discard_body())
            .verbose(true)
            .dump_to(&mut sink);

        assert!(options.auth.is_some());
        assert!(options.response_handler.is_some());
        assert_eq!(options.validators.len(), 2);
        assert!(options.verbose);
        assert!(options.dump_to.is_some());
    }
}
