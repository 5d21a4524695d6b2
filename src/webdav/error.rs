//! Error taxonomy for the protocol engine.
//!
//! Two top-level kinds: [`HttpError`] for non-2xx outcomes (with per-status
//! variants so callers can match optimistic-concurrency collisions or auth
//! failures directly) and [`DavError`] for protocol-level failures (redirect
//! discipline, malformed Multi-Status envelopes, unexpected statuses).
//! Transport and I/O failures pass through as their own variants; the engine
//! never retries.

use chrono::{DateTime, Utc};
use hyper::HeaderMap;
use quick_xml::NsReader;
use quick_xml::events::Event;
use std::time::Duration;

use crate::webdav::xml::{self, NS_DAV, QName};

/// Parsed `Retry-After` hint from a 503 response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAfter {
    /// Delta-seconds form.
    Delay(Duration),
    /// HTTP-date form.
    At(DateTime<Utc>),
}

/// Everything captured from a non-2xx response: status code, reason phrase,
/// response headers, and the child names of a root `DAV:error` body
/// (precondition/postcondition codes, RFC 4918 §11).
#[derive(Debug, Clone)]
pub struct ErrorResponse {
    pub status: u16,
    pub reason: String,
    pub headers: HeaderMap,
    pub conditions: Vec<QName>,
}

impl ErrorResponse {
    pub fn has_condition(&self, name: &QName) -> bool {
        self.conditions.contains(name)
    }
}

/// Typed non-2xx HTTP outcome.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("authentication required (HTTP {})", .0.status)]
    Unauthorized(ErrorResponse),

    #[error("access forbidden (HTTP {})", .0.status)]
    Forbidden(ErrorResponse),

    #[error("resource not found (HTTP {})", .0.status)]
    NotFound(ErrorResponse),

    #[error("conflict (HTTP {})", .0.status)]
    Conflict(ErrorResponse),

    #[error("precondition failed (HTTP {})", .0.status)]
    PreconditionFailed(ErrorResponse),

    #[error("service unavailable (HTTP {})", .0.status)]
    ServiceUnavailable(ErrorResponse, Option<RetryAfter>),

    #[error("HTTP {} {}", .0.status, .0.reason)]
    Other(ErrorResponse),
}

impl HttpError {
    /// Status translator: pick the variant for `status` and harvest the
    /// condition codes from the (already fully read) response body.
    pub fn translate(status: u16, reason: &str, headers: HeaderMap, body: &[u8]) -> Self {
        let response = ErrorResponse {
            status,
            reason: reason.to_owned(),
            conditions: parse_error_conditions(body),
            headers,
        };
        match status {
            401 => HttpError::Unauthorized(response),
            403 => HttpError::Forbidden(response),
            404 => HttpError::NotFound(response),
            409 => HttpError::Conflict(response),
            412 => HttpError::PreconditionFailed(response),
            503 => {
                let retry_after = parse_retry_after(&response.headers);
                HttpError::ServiceUnavailable(response, retry_after)
            }
            _ => HttpError::Other(response),
        }
    }

    pub fn response(&self) -> &ErrorResponse {
        match self {
            HttpError::Unauthorized(r)
            | HttpError::Forbidden(r)
            | HttpError::NotFound(r)
            | HttpError::Conflict(r)
            | HttpError::PreconditionFailed(r)
            | HttpError::ServiceUnavailable(r, _)
            | HttpError::Other(r) => r,
        }
    }

    pub fn status(&self) -> u16 {
        self.response().status
    }

    pub fn retry_after(&self) -> Option<RetryAfter> {
        match self {
            HttpError::ServiceUnavailable(_, retry_after) => *retry_after,
            _ => None,
        }
    }
}

/// Errors raised by the protocol engine.
#[derive(Debug, thiserror::Error)]
pub enum DavError {
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Empty, truncated, or malformed 207 body; carries the underlying
    /// parser diagnostic.
    #[error("incomplete multi-status response: {0}")]
    InvalidMultiStatus(String),

    /// 207 with a non-XML content type and a body that does not look like XML.
    #[error("207 response body is not XML ({0})")]
    NonXmlMultiStatus(String),

    /// A status outside what the operation accepts, e.g. a 200 where 207 is
    /// required, or a 207 on DELETE/COPY/MOVE (partial failure).
    #[error("unexpected HTTP status {status}, expected {expected}")]
    UnexpectedStatus { status: u16, expected: &'static str },

    #[error("received redirect from HTTPS to HTTP ({to})")]
    InsecureRedirect { to: url::Url },

    #[error("redirect response without a Location header")]
    RedirectMissingLocation,

    #[error("more than {0} redirects")]
    TooManyRedirects(usize),

    #[error("request timed out")]
    Timeout,

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("transport error: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),

    #[error("HTTP protocol error: {0}")]
    Protocol(#[from] hyper::http::Error),

    #[error("invalid header value: {0}")]
    Header(#[from] hyper::header::InvalidHeaderValue),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Extract the direct child names of a root `DAV:error` element. Anything
/// that is not such a document yields an empty set.
fn parse_error_conditions(body: &[u8]) -> Vec<QName> {
    let mut reader = NsReader::from_reader(body);
    let mut conditions = Vec::new();
    let mut saw_root = false;
    let mut depth = 0usize;
    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(_) => return conditions,
        };
        match event {
            Event::Start(ref start) | Event::Empty(ref start) => {
                let name = xml::resolve_name(&reader, start);
                if !saw_root {
                    if !name.is(NS_DAV, "error") {
                        return Vec::new();
                    }
                    saw_root = true;
                    if matches!(event, Event::Empty(_)) {
                        return conditions;
                    }
                } else {
                    if depth == 0 {
                        conditions.push(name);
                    }
                    if matches!(event, Event::Start(_)) {
                        depth += 1;
                    }
                }
            }
            Event::End(_) => {
                if depth == 0 {
                    return conditions;
                }
                depth -= 1;
            }
            Event::Eof => return conditions,
            _ => {}
        }
    }
}

/// Parse `Retry-After` as delta-seconds or an HTTP-date.
fn parse_retry_after(headers: &HeaderMap) -> Option<RetryAfter> {
    let value = headers.get("Retry-After")?.to_str().ok()?.trim();
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(RetryAfter::Delay(Duration::from_secs(seconds)));
    }
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|date| RetryAfter::At(date.with_timezone(&Utc)))
}
