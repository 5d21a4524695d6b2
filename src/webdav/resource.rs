//! The resource operation layer: one handle per remote URL, one method per
//! WebDAV verb.
//!
//! Every operation builds its request, submits it through the shared
//! [`Transport`], applies the redirect discipline, translates non-2xx
//! statuses into [`HttpError`], and for Multi-Status operations drives the
//! envelope parser over the body, invoking the caller's consumer per
//! response.
//!
//! A handle's `location` is updated in place while redirects are followed
//! (and by a successful MOVE), so a handle is meant for single-task use;
//! share the transport, not the handle.

use std::collections::HashSet;
use std::sync::Arc;

use bytes::Bytes;
use hyper::{HeaderMap, Method, Response, header};
use url::Url;

use crate::common::http::Transport;
use crate::webdav::error::{DavError, HttpError};
use crate::webdav::multistatus::{self, ResponseConsumer};
use crate::webdav::property::Property;
use crate::webdav::xml::{self, QName};

/// Maximum redirect hops before an operation fails.
const MAX_REDIRECTS: usize = 5;

const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";

/// Build one of the extended WebDAV methods.
fn extension_method(name: &'static [u8]) -> Result<Method, DavError> {
    Method::from_bytes(name)
        .map_err(hyper::http::Error::from)
        .map_err(DavError::from)
}

/// WebDAV `Depth` header value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    Zero,
    One,
    Infinity,
}

impl Depth {
    pub fn as_str(self) -> &'static str {
        match self {
            Depth::Zero => "0",
            Depth::One => "1",
            Depth::Infinity => "infinity",
        }
    }
}

/// Quote a value as an RFC 7230 quoted-string unless it already is one.
/// Embedded `"` and `\` are backslash-escaped.
pub(crate) fn quote_string(value: &str) -> String {
    if is_quoted_string(value) {
        return value.to_owned();
    }
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        if ch == '"' || ch == '\\' {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

/// Validate and resolve one redirect hop. The HTTPS→HTTP check runs before
/// any follow-up request can be emitted; a missing `Location` is fatal.
fn resolve_redirect(current: &Url, location: Option<&str>) -> Result<Url, DavError> {
    let target = match location {
        Some(location) => current.join(location)?,
        None => return Err(DavError::RedirectMissingLocation),
    };
    if current.scheme() == "https" && target.scheme() == "http" {
        return Err(DavError::InsecureRedirect { to: target });
    }
    Ok(target)
}

/// Whether `value` is already a syntactically valid quoted-string.
fn is_quoted_string(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'"' || bytes[bytes.len() - 1] != b'"' {
        return false;
    }
    let mut escaped = false;
    for &byte in &bytes[1..bytes.len() - 1] {
        if escaped {
            escaped = false;
        } else if byte == b'\\' {
            escaped = true;
        } else if byte == b'"' {
            return false;
        }
    }
    // A trailing backslash would escape the closing quote.
    !escaped
}

/// Handle to one remote resource.
pub struct DavResource {
    transport: Arc<Transport>,
    location: Url,
}

impl DavResource {
    /// The transport must not follow redirects itself; [`Transport`] never
    /// does, the resource layer owns that policy.
    pub fn new(transport: Arc<Transport>, location: Url) -> Self {
        Self {
            transport,
            location,
        }
    }

    /// Current URL of the resource. Updated in place by followed redirects
    /// and by a successful MOVE.
    pub fn location(&self) -> &Url {
        &self.location
    }

    pub fn transport(&self) -> &Arc<Transport> {
        &self.transport
    }

    // ----------- request plumbing -----------

    /// Submit a request, following up to [`MAX_REDIRECTS`] redirects by
    /// re-sending method, headers and body unchanged against the resolved
    /// target. A redirect without `Location` is fatal, as is any redirect
    /// from an `https` location to an `http` one (checked before any
    /// follow-up request is made).
    async fn send_following_redirects(
        &mut self,
        method: Method,
        headers: HeaderMap,
        body: Option<Bytes>,
    ) -> Result<Response<Bytes>, DavError> {
        let mut hops = 0usize;
        loop {
            let response = self
                .transport
                .send(method.clone(), &self.location, headers.clone(), body.clone())
                .await?;
            if !response.status().is_redirection() {
                return Ok(response);
            }

            hops += 1;
            if hops > MAX_REDIRECTS {
                return Err(DavError::TooManyRedirects(MAX_REDIRECTS));
            }
            let location = response
                .headers()
                .get(header::LOCATION)
                .and_then(|value| value.to_str().ok());
            let target = resolve_redirect(&self.location, location)?;
            tracing::debug!(from = %self.location, to = %target, "following redirect");
            self.location = target;
        }
    }

    /// Translate a non-2xx response into the typed error. The body has been
    /// fully aggregated already, satisfying read-then-release.
    fn ensure_success(response: &Response<Bytes>) -> Result<(), DavError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(HttpError::translate(
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            response.headers().clone(),
            response.body(),
        )
        .into())
    }

    /// DELETE, COPY and MOVE must not answer 207: that means some member
    /// failed (RFC 4918 §9.6.1).
    fn ensure_complete_success(response: &Response<Bytes>) -> Result<(), DavError> {
        Self::ensure_success(response)?;
        if response.status().as_u16() == 207 {
            return Err(DavError::UnexpectedStatus {
                status: 207,
                expected: "complete success, not Multi-Status",
            });
        }
        Ok(())
    }

    /// Run a Multi-Status operation: submit, validate the envelope
    /// preconditions, parse, dispatch to `sink`, return residual properties.
    async fn multistatus_request<S: ResponseConsumer>(
        &mut self,
        method: Method,
        headers: HeaderMap,
        body: Option<Bytes>,
        sink: &mut S,
    ) -> Result<Vec<Property>, DavError> {
        let response = self.send_following_redirects(method, headers, body).await?;
        Self::ensure_success(&response)?;
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok());
        multistatus::check_multistatus(
            response.status().as_u16(),
            content_type,
            response.body(),
        )?;
        multistatus::parse_multistatus(response.body(), &self.location, sink)
    }

    // ----------- verbs -----------

    /// `OPTIONS`: returns the DAV capability tokens advertised by the
    /// server. Content encoding is disabled because some servers mishandle
    /// compressed OPTIONS responses; redirects are not followed.
    pub async fn options(&mut self) -> Result<HashSet<String>, DavError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT_ENCODING,
            header::HeaderValue::from_static("identity"),
        );
        let response = self
            .transport
            .send(Method::OPTIONS, &self.location, headers, None)
            .await?;
        Self::ensure_success(&response)?;

        let mut capabilities = HashSet::new();
        for value in response.headers().get_all("DAV") {
            if let Ok(value) = value.to_str() {
                capabilities.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|token| !token.is_empty())
                        .map(str::to_owned),
                );
            }
        }
        Ok(capabilities)
    }

    /// `PROPFIND` with the given depth, requesting `props`. The consumer is
    /// invoked once per response in document order; the returned vector
    /// holds residual top-level properties.
    pub async fn propfind<S: ResponseConsumer>(
        &mut self,
        depth: Depth,
        props: &[QName],
        sink: &mut S,
    ) -> Result<Vec<Property>, DavError> {
        let mut headers = HeaderMap::new();
        headers.insert("Depth", header::HeaderValue::from_static(depth.as_str()));
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static(XML_CONTENT_TYPE),
        );
        let body = Bytes::from(xml::propfind_body(props));
        self.multistatus_request(
            extension_method(b"PROPFIND")?,
            headers,
            Some(body),
            sink,
        )
        .await
    }

    /// `PROPPATCH` setting and removing properties. Set values are escaped
    /// text content.
    pub async fn proppatch<S: ResponseConsumer>(
        &mut self,
        set: &[(QName, String)],
        remove: &[QName],
        sink: &mut S,
    ) -> Result<Vec<Property>, DavError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static(XML_CONTENT_TYPE),
        );
        let body = Bytes::from(xml::propertyupdate_body(set, remove));
        self.multistatus_request(
            extension_method(b"PROPPATCH")?,
            headers,
            Some(body),
            sink,
        )
        .await
    }

    /// `MKCOL`, optionally with an extended-MKCOL XML body (RFC 5689).
    pub async fn mkcol(&mut self, body: Option<&str>) -> Result<Response<Bytes>, DavError> {
        let mut headers = HeaderMap::new();
        let body = body.map(|xml| {
            headers.insert(
                header::CONTENT_TYPE,
                header::HeaderValue::from_static(XML_CONTENT_TYPE),
            );
            Bytes::from(xml.to_owned())
        });
        let response = self
            .send_following_redirects(extension_method(b"MKCOL")?, headers, body)
            .await?;
        Self::ensure_success(&response)?;
        Ok(response)
    }

    /// `HEAD`.
    pub async fn head(&mut self) -> Result<Response<Bytes>, DavError> {
        let response = self
            .send_following_redirects(Method::HEAD, HeaderMap::new(), None)
            .await?;
        Self::ensure_success(&response)?;
        Ok(response)
    }

    /// `GET` with an explicit `Accept`. Compression stays negotiated by the
    /// transport; pass `Accept-Encoding: identity` in `extra` when ETag
    /// stability across encodings matters.
    pub async fn get(
        &mut self,
        accept: &str,
        extra: HeaderMap,
    ) -> Result<Response<Bytes>, DavError> {
        let mut headers = extra;
        headers.insert(header::ACCEPT, header::HeaderValue::from_str(accept)?);
        let response = self
            .send_following_redirects(Method::GET, headers, None)
            .await?;
        Self::ensure_success(&response)?;
        Ok(response)
    }

    /// Ranged `GET` for `size` bytes starting at `offset`. Callers must
    /// inspect the status to tell full (200) from partial (206) content.
    pub async fn get_range(
        &mut self,
        accept: &str,
        offset: u64,
        size: u64,
        extra: HeaderMap,
    ) -> Result<Response<Bytes>, DavError> {
        let mut headers = extra;
        let range = format!("bytes={}-{}", offset, offset + size.saturating_sub(1));
        headers.insert(header::RANGE, header::HeaderValue::from_str(&range)?);
        self.get(accept, headers).await
    }

    /// `PUT` with optional conditional headers: `If-Match` / `If-Schedule-Tag-Match`
    /// (values quoted per RFC 7230) and `If-None-Match: *`.
    pub async fn put(
        &mut self,
        body: Bytes,
        content_type: &str,
        if_etag: Option<&str>,
        if_schedule_tag: Option<&str>,
        if_none_match: bool,
    ) -> Result<Response<Bytes>, DavError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_str(content_type)?,
        );
        if let Some(etag) = if_etag {
            headers.insert(
                header::IF_MATCH,
                header::HeaderValue::from_str(&quote_string(etag))?,
            );
        }
        if let Some(tag) = if_schedule_tag {
            headers.insert(
                "If-Schedule-Tag-Match",
                header::HeaderValue::from_str(&quote_string(tag))?,
            );
        }
        if if_none_match {
            headers.insert(header::IF_NONE_MATCH, header::HeaderValue::from_static("*"));
        }
        let response = self
            .send_following_redirects(Method::PUT, headers, Some(body))
            .await?;
        Self::ensure_success(&response)?;
        Ok(response)
    }

    /// `DELETE` with optional conditional headers. A 207 answer means some
    /// member resource failed and raises an error.
    pub async fn delete(
        &mut self,
        if_etag: Option<&str>,
        if_schedule_tag: Option<&str>,
    ) -> Result<Response<Bytes>, DavError> {
        let mut headers = HeaderMap::new();
        if let Some(etag) = if_etag {
            headers.insert(
                header::IF_MATCH,
                header::HeaderValue::from_str(&quote_string(etag))?,
            );
        }
        if let Some(tag) = if_schedule_tag {
            headers.insert(
                "If-Schedule-Tag-Match",
                header::HeaderValue::from_str(&quote_string(tag))?,
            );
        }
        let response = self
            .send_following_redirects(Method::DELETE, headers, None)
            .await?;
        Self::ensure_complete_success(&response)?;
        Ok(response)
    }

    fn destination_headers(dest: &Url, overwrite: bool) -> Result<HeaderMap, DavError> {
        let mut headers = HeaderMap::new();
        headers.insert("Destination", header::HeaderValue::from_str(dest.as_str())?);
        if !overwrite {
            // Absent header leaves the server default (overwrite) in effect.
            headers.insert("Overwrite", header::HeaderValue::from_static("F"));
        }
        Ok(headers)
    }

    /// `COPY` to an absolute destination. 207 means partial failure.
    pub async fn copy(
        &mut self,
        dest: &Url,
        overwrite: bool,
    ) -> Result<Response<Bytes>, DavError> {
        let headers = Self::destination_headers(dest, overwrite)?;
        let response = self
            .send_following_redirects(extension_method(b"COPY")?, headers, None)
            .await?;
        Self::ensure_complete_success(&response)?;
        Ok(response)
    }

    /// `MOVE` to an absolute destination. On success the handle's location
    /// becomes the `Location` response header when present, else `dest`.
    pub async fn move_to(
        &mut self,
        dest: &Url,
        overwrite: bool,
    ) -> Result<Response<Bytes>, DavError> {
        let headers = Self::destination_headers(dest, overwrite)?;
        let response = self
            .send_following_redirects(extension_method(b"MOVE")?, headers, None)
            .await?;
        Self::ensure_complete_success(&response)?;

        self.location = match response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
        {
            Some(location) => self.location.join(location)?,
            None => dest.clone(),
        };
        Ok(response)
    }

    /// `SEARCH` (RFC 5323) with a caller-supplied body; answers are
    /// Multi-Status.
    pub async fn search<S: ResponseConsumer>(
        &mut self,
        xml_body: &str,
        sink: &mut S,
    ) -> Result<Vec<Property>, DavError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static(XML_CONTENT_TYPE),
        );
        self.multistatus_request(
            extension_method(b"SEARCH")?,
            headers,
            Some(Bytes::from(xml_body.to_owned())),
            sink,
        )
        .await
    }

    /// Submit a `REPORT` body and parse the Multi-Status answer. Shared by
    /// the collection specializations.
    pub(crate) async fn report<S: ResponseConsumer>(
        &mut self,
        depth: Option<Depth>,
        xml_body: String,
        sink: &mut S,
    ) -> Result<Vec<Property>, DavError> {
        let mut headers = HeaderMap::new();
        if let Some(depth) = depth {
            headers.insert("Depth", header::HeaderValue::from_static(depth.as_str()));
        }
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static(XML_CONTENT_TYPE),
        );
        self.multistatus_request(
            extension_method(b"REPORT")?,
            headers,
            Some(Bytes::from(xml_body)),
            sink,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_bare_etags() {
        assert_eq!(quote_string("abc"), "\"abc\"");
        assert_eq!(quote_string("a\"b"), "\"a\\\"b\"");
        assert_eq!(quote_string("a\\b"), "\"a\\\\b\"");
    }

    #[test]
    fn keeps_valid_quoted_strings() {
        assert_eq!(quote_string("\"abc\""), "\"abc\"");
        assert_eq!(quote_string("\"a\\\"b\""), "\"a\\\"b\"");
    }

    #[test]
    fn requotes_invalid_quoting() {
        // Unescaped quote inside: not a valid quoted-string.
        assert_eq!(quote_string("\"a\"b\""), "\"\\\"a\\\"b\\\"\"");
        // Trailing backslash escapes the closing quote.
        assert_eq!(quote_string("\"a\\\""), "\"\\\"a\\\\\\\"\"");
    }

    #[test]
    fn resolves_relative_redirects() {
        let current = Url::parse("https://example.com/dav/cal/").unwrap();
        let target = resolve_redirect(&current, Some("/other/")).unwrap();
        assert_eq!(target.as_str(), "https://example.com/other/");
    }

    #[test]
    fn refuses_redirect_to_http() {
        let current = Url::parse("https://example.com/dav/").unwrap();
        let err = resolve_redirect(&current, Some("http://example.com/dav/")).unwrap_err();
        assert!(matches!(err, DavError::InsecureRedirect { .. }));
    }

    #[test]
    fn allows_http_to_https_upgrade() {
        let current = Url::parse("http://example.com/dav/").unwrap();
        let target = resolve_redirect(&current, Some("https://example.com/dav/")).unwrap();
        assert_eq!(target.scheme(), "https");
    }

    #[test]
    fn refuses_redirect_without_location() {
        let current = Url::parse("https://example.com/dav/").unwrap();
        let err = resolve_redirect(&current, None).unwrap_err();
        assert!(matches!(err, DavError::RedirectMissingLocation));
    }
}
