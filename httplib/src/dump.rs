//! Wire-format request and response dumps for diagnostics.

use crate::{Response, Result};
use http::HeaderMap;
use std::io::Write;
use url::Position;

/// Write `request` in HTTP/1.x wire format.
///
/// The body is included when `body` is set and the request body is held in
/// memory.
pub fn dump_request(
    request: &reqwest::Request,
    out: &mut (dyn Write + Send),
    body: bool,
) -> std::io::Result<()> {
    let url = request.url();
    write!(
        out,
        "{} {} {:?}\r\n",
        request.method(),
        &url[Position::BeforePath..Position::AfterQuery],
        request.version()
    )?;

    if !request.headers().contains_key(http::header::HOST) {
        write!(out, "Host: {}\r\n", &url[Position::BeforeHost..Position::AfterPort])?;
    }
    write_headers(out, request.headers())?;
    out.write_all(b"\r\n")?;

    if body && let Some(bytes) = request.body().and_then(|b| b.as_bytes()) {
        out.write_all(bytes)?;
    }
    out.write_all(b"\n")?;
    out.flush()
}

/// Write `response` in HTTP/1.x wire format.
///
/// Including the body buffers it in `response`, so handlers that run later
/// still see the full payload.
pub async fn dump_response(
    response: &mut Response,
    out: &mut (dyn Write + Send),
    body: bool,
) -> Result<()> {
    write!(out, "{:?} {}\r\n", response.version(), response.status())?;
    write_headers(out, response.headers())?;
    out.write_all(b"\r\n")?;

    if body {
        let bytes = response.bytes().await?;
        out.write_all(&bytes)?;
    }
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

fn write_headers(out: &mut (dyn Write + Send), headers: &HeaderMap) -> std::io::Result<()> {
    for (name, value) in headers {
        tracing::trace!(header = %name, value = ?value, "Dumping header");
        write!(out, "{}: ", canonical_name(name.as_str()))?;
        out.write_all(value.as_bytes())?;
        out.write_all(b"\r\n")?;
    }
    Ok(())
}

/// `content-type` -> `Content-Type`
fn canonical_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}
