//! HTTP transport: a pooled hyper client with TLS, preemptive Basic auth,
//! per-request timeouts, and transparent response decompression.
//!
//! The hyper legacy client never follows redirects on its own; the resource
//! layer depends on that and applies its own redirect discipline.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{HeaderMap, Method, Request, Response, Uri, header};
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::TokioExecutor;
use tokio::time::{Duration, timeout};
use url::Url;

use crate::common::compression::{add_accept_encoding, decompress_body, detect_encodings};
use crate::webdav::error::DavError;

/// Type alias for the hyper client shared by all resources.
pub type HyperClient = Client<hyper_rustls::HttpsConnector<HttpConnector>, Full<Bytes>>;

/// Build a hyper client configured with HTTP/2, connection pooling, and a
/// TLS connector that prefers native roots but falls back to the bundled
/// WebPKI store.
pub fn build_hyper_client() -> HyperClient {
    let https_builder = HttpsConnectorBuilder::new()
        .with_native_roots()
        .unwrap_or_else(|_| HttpsConnectorBuilder::new().with_webpki_roots());

    let https = https_builder
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .build();

    Client::builder(TokioExecutor::new())
        .http2_adaptive_window(true)
        .pool_max_idle_per_host(128)
        .build::<_, Full<Bytes>>(https)
}

/// One network round trip: URL, method, headers, optional body in; status,
/// headers, aggregated decompressed body out.
#[derive(Clone)]
pub struct Transport {
    client: HyperClient,
    auth_header: Option<header::HeaderValue>,
    default_timeout: Duration,
}

impl Transport {
    /// Transport without credentials.
    pub fn new() -> Self {
        Self {
            client: build_hyper_client(),
            auth_header: None,
            default_timeout: Duration::from_secs(20),
        }
    }

    /// Transport sending preemptive Basic credentials on every request.
    pub fn with_basic_auth(user: &str, password: &str) -> Result<Self, DavError> {
        let token = format!("{}:{}", user, password);
        let value = header::HeaderValue::from_str(&format!("Basic {}", B64.encode(token)))?;
        let mut transport = Self::new();
        transport.auth_header = Some(value);
        Ok(transport)
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.default_timeout = timeout;
    }

    /// Send one request and aggregate the (decompressed) response body.
    /// Redirects are not followed here.
    pub async fn send(
        &self,
        method: Method,
        url: &Url,
        mut headers: HeaderMap,
        body: Option<Bytes>,
    ) -> Result<Response<Bytes>, DavError> {
        let uri: Uri = url
            .as_str()
            .parse()
            .map_err(hyper::http::Error::from)?;

        add_accept_encoding(&mut headers);
        if body.is_some() && !headers.contains_key(header::CONTENT_TYPE) {
            headers.insert(
                header::CONTENT_TYPE,
                header::HeaderValue::from_static("application/xml; charset=utf-8"),
            );
        }

        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = &self.auth_header {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        for (name, value) in headers.iter() {
            builder = builder.header(name, value);
        }

        let request = builder.body(Full::new(body.unwrap_or_default()))?;

        let response = timeout(self.default_timeout, self.client.request(request))
            .await
            .map_err(|_| DavError::Timeout)??;

        let encodings = detect_encodings(response.headers());
        let (mut parts, body) = response.into_parts();
        let decompressed = decompress_body(body, &encodings).await?;
        if !encodings.is_empty() {
            parts.headers.remove(header::CONTENT_ENCODING);
            match header::HeaderValue::from_str(&decompressed.len().to_string()) {
                Ok(value) => {
                    parts.headers.insert(header::CONTENT_LENGTH, value);
                }
                Err(_) => {
                    parts.headers.remove(header::CONTENT_LENGTH);
                }
            }
        }

        Ok(Response::from_parts(parts, decompressed))
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}
