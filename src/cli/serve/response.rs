//! HTTP response handlers.
//!
//! HTML goes through a [`ResponseInterceptor`] wrapping an [`HttpSink`];
//! everything else is sent as read from disk.

use crate::{
    config::AppConfig,
    debug,
    purge::{Payload, PurgeError, PurgeOptions, ResponseInterceptor, ResponseSink},
    utils::mime::{self, types},
};
use anyhow::{Context, Result};
use std::{
    fs,
    io::{self, Cursor},
    path::Path,
};
use tiny_http::{Header, Method, Request, Response, StatusCode};

// ============================================================================
// HttpSink
// ============================================================================

/// A `tiny_http` request seen as a [`ResponseSink`].
///
/// `tiny_http` sends headers and body in one `respond` call, so writes are
/// collected and headers only count as sent once `finish` responds.
pub struct HttpSink {
    request: Option<Request>,
    status: StatusCode,
    headers: Vec<Header>,
    content_length: Option<usize>,
    body: Vec<u8>,
}

impl HttpSink {
    pub fn new(request: Request, status: u16) -> Self {
        Self {
            request: Some(request),
            status: StatusCode(status),
            headers: Vec::new(),
            content_length: None,
            body: Vec::new(),
        }
    }

    /// Answer with a plain-text error if nothing was sent yet.
    pub fn fail(&mut self, status: u16, message: &str) -> io::Result<()> {
        let Some(request) = self.request.take() else {
            return Ok(());
        };
        let response = Response::from_string(message)
            .with_status_code(StatusCode(status))
            .with_header(make_header("Content-Type", types::PLAIN));
        request.respond(response)
    }
}

impl ResponseSink for HttpSink {
    type Args = ();

    fn write(&mut self, payload: Payload, _args: ()) -> io::Result<()> {
        if self.request.is_none() {
            return Err(io::Error::other("response already sent"));
        }
        self.body.extend(payload.into_bytes());
        Ok(())
    }

    fn finish(&mut self, payload: Payload, _args: ()) -> io::Result<()> {
        let request = self
            .request
            .take()
            .ok_or_else(|| io::Error::other("response already sent"))?;

        self.body.extend(payload.into_bytes());
        let body = std::mem::take(&mut self.body);
        let length = self.content_length.unwrap_or(body.len());

        let response = Response::new(
            self.status,
            std::mem::take(&mut self.headers),
            Cursor::new(body),
            Some(length),
            None,
        );
        request.respond(response)
    }

    fn set_header(&mut self, name: &str, value: &str) {
        if self.headers_sent() {
            return;
        }
        // tiny_http owns the Content-Length header
        if name.eq_ignore_ascii_case("content-length") {
            self.content_length = value.parse().ok();
            return;
        }
        if let Ok(header) = Header::from_bytes(name.as_bytes(), value.as_bytes()) {
            self.headers
                .retain(|h| !h.field.as_str().as_str().eq_ignore_ascii_case(name));
            self.headers.push(header);
        }
    }

    fn headers_sent(&self) -> bool {
        self.request.is_none()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Respond with a file, purging it first when it is HTML.
pub fn respond_file(request: Request, path: &Path, options: &PurgeOptions) -> Result<()> {
    let content_type = mime::from_path(path);

    if !mime::is_html(content_type) {
        if is_head_request(&request) {
            return send_head(request, 200, content_type);
        }
        let body = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        return send_body(request, 200, content_type, body);
    }

    let body = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    respond_purged(request, 200, body, options)
}

/// Run an HTML document through the interceptor and send the result.
///
/// HEAD requests take the same path so `Content-Length` matches what a GET
/// would deliver; `tiny_http` drops the body for them.
pub fn respond_purged(
    request: Request,
    status: u16,
    html: Vec<u8>,
    options: &PurgeOptions,
) -> Result<()> {
    let url = request.url().to_string();
    let mut sink = HttpSink::new(request, status);
    sink.set_header("Content-Type", types::HTML);

    match ResponseInterceptor::new(&mut sink, options.clone()).finish(html, ()) {
        Ok(outcome) => {
            debug!("purge"; "{}: {:?}", url, outcome);
            Ok(())
        }
        Err(PurgeError::Sink(e)) => Err(e).context("failed to send response"),
        Err(e) => {
            sink.fail(500, &format!("{e}"))?;
            Err(anyhow::Error::new(e).context(format!("failed to purge {url}")))
        }
    }
}

/// Respond with 404 page (custom `404.html` from the serve root, or plain text).
pub fn respond_not_found(request: Request, config: &AppConfig) -> Result<()> {
    let custom_404 = config.serve.root.join("404.html");

    if custom_404.is_file()
        && let Ok(body) = fs::read(&custom_404)
    {
        return respond_purged(request, 404, body, &config.purge);
    }

    if is_head_request(&request) {
        return send_head(request, 404, types::PLAIN);
    }
    send_body(request, 404, types::PLAIN, b"404 Not Found".to_vec())
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(
        request,
        503,
        types::PLAIN,
        b"503 Service Unavailable".to_vec(),
    )
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send_head(request: Request, status: u16, content_type: &'static str) -> Result<()> {
    let response =
        Response::empty(StatusCode(status)).with_header(make_header("Content-Type", content_type));
    request.respond(response)?;
    Ok(())
}

fn send_body(
    request: Request,
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(make_header("Content-Type", content_type));
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &'static str, value: &'static str) -> Header {
    Header::from_bytes(key, value).unwrap()
}
